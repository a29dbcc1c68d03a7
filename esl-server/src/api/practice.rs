//! Pronunciation practice endpoints

use axum::{extract::State, http::StatusCode, Extension, Json};
use esl_common::db::{CategorySummary, Difficulty, PracticeLog, Sentence};
use esl_common::text::{similarity_score, PERFECT_SCORE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::extract::ApiJson;
use super::identity::CurrentUser;
use crate::db::{practice_logs, sentences};
use crate::error::{ApiError, ApiResult};
use crate::services::recommendation::select_candidates;
use crate::AppState;

/// Sentence as presented to the practice screen
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedSentence {
    pub id: Uuid,
    pub english_text: String,
    pub chinese_text: String,
    pub difficulty: Difficulty,
    pub audio_url: Option<String>,
    pub category: CategorySummary,
}

impl From<Sentence> for RecommendedSentence {
    fn from(sentence: Sentence) -> Self {
        Self {
            id: sentence.id,
            english_text: sentence.english_text,
            chinese_text: sentence.chinese_text,
            difficulty: sentence.difficulty,
            audio_url: sentence.audio_url,
            category: sentence.category,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub sentences: Vec<RecommendedSentence>,
    pub total: usize,
}

/// GET /practice/recommendation
pub async fn get_recommendation(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<RecommendationResponse>> {
    let chosen = select_candidates(state.sentences.as_ref(), user.id(), &state.recommendation).await?;

    let sentences: Vec<RecommendedSentence> = chosen.into_iter().map(Into::into).collect();
    Ok(Json(RecommendationResponse {
        total: sentences.len(),
        sentences,
    }))
}

/// Score request
///
/// The reference comes either verbatim or from a stored sentence.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub sentence_id: Option<Uuid>,
    #[serde(default)]
    pub transcript: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ScoreResponse {
    pub score: u8,
    pub perfect: bool,
}

/// POST /practice/score
pub async fn score_transcript(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(request): ApiJson<ScoreRequest>,
) -> ApiResult<Json<ScoreResponse>> {
    let reference = match (request.sentence_id, request.reference) {
        (Some(id), _) => {
            sentences::get_visible_sentence(&state.db, user.id(), id)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("sentence {}", id)))?
                .english_text
        }
        (None, Some(reference)) if !reference.trim().is_empty() => reference,
        (None, _) => {
            return Err(ApiError::BadRequest(
                "reference or sentenceId is required".to_string(),
            ))
        }
    };

    let score = similarity_score(&reference, &request.transcript);
    debug!(user_id = %user.id(), score, "Scored transcript");

    Ok(Json(ScoreResponse {
        score,
        perfect: score == PERFECT_SCORE,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogPracticeRequest {
    pub sentence_id: Uuid,
}

/// POST /practice/logs
pub async fn log_practice(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(request): ApiJson<LogPracticeRequest>,
) -> ApiResult<(StatusCode, Json<PracticeLog>)> {
    if sentences::get_visible_sentence(&state.db, user.id(), request.sentence_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!("sentence {}", request.sentence_id)));
    }

    let log = practice_logs::append_practice_log(&state.db, user.id(), request.sentence_id).await?;
    info!(user_id = %user.id(), sentence_id = %log.sentence_id, "Practice logged");

    Ok((StatusCode::CREATED, Json(log)))
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PracticeStats {
    pub total_practices: i64,
    pub distinct_sentences: usize,
    /// Sentences currently in the reinforcement band
    pub reinforcement_due: usize,
}

/// GET /practice/stats
pub async fn get_practice_stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<PracticeStats>> {
    let counts = practice_logs::practice_counts(&state.db, user.id()).await?;

    Ok(Json(PracticeStats {
        total_practices: counts.values().sum(),
        distinct_sentences: counts.len(),
        reinforcement_due: counts
            .values()
            .filter(|&&count| state.recommendation.is_reinforcement(count))
            .count(),
    }))
}
