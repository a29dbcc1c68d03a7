//! Sentence browsing and authoring endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use esl_common::db::{Difficulty, Sentence};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::categories::require_owned_category;
use super::extract::{ApiJson, ApiQuery};
use super::identity::CurrentUser;
use crate::db::sentences::{self, NewSentence, SentenceChanges, SentenceFilter};
use crate::error::{ApiError, ApiResult};
use crate::pagination::{PageWindow, PAGE_SIZE};
use crate::AppState;

/// Parse a path id, rejecting malformed values with 400
pub(crate) fn parse_id(raw: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid {} id '{}'", what, raw)))
}

fn parse_difficulty(raw: &str) -> ApiResult<Difficulty> {
    Ok(raw.trim().parse()?)
}

fn required_text(value: Option<String>, field: &str) -> ApiResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("{} is required", field))),
    }
}

/// Blank audio URLs are stored as no audio
fn normalize_audio_url(value: Option<String>) -> Option<String> {
    value
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Query parameters for the sentence browser
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceListQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,
    pub category_id: Option<String>,
    pub difficulty: Option<String>,
    /// Substring search over English and Chinese text
    pub q: Option<String>,
}

fn default_page() -> i64 {
    1
}

impl SentenceListQuery {
    fn to_filter(&self) -> ApiResult<SentenceFilter> {
        let category_id = match self.category_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_id(raw, "category")?),
            _ => None,
        };
        let difficulty = match self.difficulty.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_difficulty(raw)?),
            _ => None,
        };
        let search = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        Ok(SentenceFilter {
            category_id,
            difficulty,
            search,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceListResponse {
    pub sentences: Vec<Sentence>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// GET /sentences
pub async fn list_sentences(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiQuery(query): ApiQuery<SentenceListQuery>,
) -> ApiResult<Json<SentenceListResponse>> {
    let filter = query.to_filter()?;

    let total = sentences::count_visible_sentences(&state.db, user.id(), &filter).await?;
    let window = PageWindow::resolve(total, query.page);
    let page = sentences::list_visible_sentences(&state.db, user.id(), &filter, window.offset).await?;

    Ok(Json(SentenceListResponse {
        sentences: page,
        total,
        page: window.page,
        page_size: PAGE_SIZE,
        total_pages: window.total_pages,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSentenceRequest {
    pub english_text: Option<String>,
    pub chinese_text: Option<String>,
    pub difficulty: Option<String>,
    pub audio_url: Option<String>,
    #[serde(default)]
    pub is_shared: bool,
    pub category_id: Option<String>,
}

/// POST /sentences
pub async fn create_sentence(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(request): ApiJson<CreateSentenceRequest>,
) -> ApiResult<(StatusCode, Json<Sentence>)> {
    let english_text = required_text(request.english_text, "englishText")?;
    let chinese_text = required_text(request.chinese_text, "chineseText")?;
    let difficulty = match request.difficulty.as_deref() {
        Some(raw) => parse_difficulty(raw)?,
        None => Difficulty::Medium,
    };
    let category_id = parse_id(&required_text(request.category_id, "categoryId")?, "category")?;
    require_owned_category(&state, user.id(), category_id).await?;

    let new = NewSentence {
        english_text,
        chinese_text,
        difficulty,
        audio_url: normalize_audio_url(request.audio_url),
        is_shared: request.is_shared,
        category_id,
    };
    let id = sentences::insert_sentence(&state.db, user.id(), &new).await?;
    info!(user_id = %user.id(), sentence_id = %id, "Sentence created");

    let sentence = sentences::get_visible_sentence(&state.db, user.id(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("sentence {}", id)))?;

    Ok((StatusCode::CREATED, Json(sentence)))
}

/// GET /sentences/:id
pub async fn get_sentence(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Sentence>> {
    let id = parse_id(&id, "sentence")?;

    sentences::get_visible_sentence(&state.db, user.id(), id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("sentence {}", id)))
}

/// Partial update body; absent fields are left unchanged
///
/// An empty `audioUrl` clears the audio reference.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSentenceRequest {
    pub english_text: Option<String>,
    pub chinese_text: Option<String>,
    pub difficulty: Option<String>,
    pub audio_url: Option<String>,
    pub is_shared: Option<bool>,
    pub category_id: Option<String>,
}

/// PUT /sentences/:id
pub async fn update_sentence(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateSentenceRequest>,
) -> ApiResult<Json<Sentence>> {
    let id = parse_id(&id, "sentence")?;
    let existing = sentences::get_owned_sentence(&state.db, user.id(), id).await?;

    let mut changes = SentenceChanges::default();
    if request.english_text.is_some() {
        changes.english_text = Some(required_text(request.english_text, "englishText")?);
    }
    if request.chinese_text.is_some() {
        changes.chinese_text = Some(required_text(request.chinese_text, "chineseText")?);
    }
    if let Some(raw) = request.difficulty.as_deref() {
        changes.difficulty = Some(parse_difficulty(raw)?);
    }
    if request.audio_url.is_some() {
        changes.audio_url = Some(normalize_audio_url(request.audio_url));
    }
    changes.is_shared = request.is_shared;
    if let Some(raw) = request.category_id.as_deref() {
        let category_id = parse_id(raw.trim(), "category")?;
        require_owned_category(&state, user.id(), category_id).await?;
        changes.category_id = Some(category_id);
    }

    sentences::update_sentence(&state.db, &existing, changes).await?;
    info!(user_id = %user.id(), sentence_id = %id, "Sentence updated");

    sentences::get_visible_sentence(&state.db, user.id(), id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("sentence {}", id)))
}

/// DELETE /sentences/:id
pub async fn delete_sentence(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "sentence")?;
    sentences::get_owned_sentence(&state.db, user.id(), id).await?;

    sentences::delete_sentence(&state.db, id).await?;
    info!(user_id = %user.id(), sentence_id = %id, "Sentence deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "sentence").unwrap(), id);
        assert!(matches!(
            parse_id("not-a-uuid", "sentence"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_required_text() {
        assert_eq!(required_text(Some("  hi ".into()), "x").unwrap(), "hi");
        assert!(required_text(Some("   ".into()), "x").is_err());
        assert!(required_text(None, "x").is_err());
    }

    #[test]
    fn test_normalize_audio_url() {
        assert_eq!(normalize_audio_url(None), None);
        assert_eq!(normalize_audio_url(Some(" ".into())), None);
        assert_eq!(
            normalize_audio_url(Some("https://cdn.example.com/a.mp3".into())),
            Some("https://cdn.example.com/a.mp3".to_string())
        );
    }

    #[test]
    fn test_list_query_filter() {
        let category = Uuid::new_v4();
        let query = SentenceListQuery {
            page: 1,
            category_id: Some(category.to_string()),
            difficulty: Some("hard".into()),
            q: Some("  coffee ".into()),
        };
        let filter = query.to_filter().unwrap();
        assert_eq!(filter.category_id, Some(category));
        assert_eq!(filter.difficulty, Some(Difficulty::Hard));
        assert_eq!(filter.search.as_deref(), Some("coffee"));
    }

    #[test]
    fn test_list_query_blank_filters_ignored() {
        let query = SentenceListQuery {
            page: 1,
            category_id: Some("".into()),
            difficulty: Some(" ".into()),
            q: Some("".into()),
        };
        let filter = query.to_filter().unwrap();
        assert!(filter.category_id.is_none());
        assert!(filter.difficulty.is_none());
        assert!(filter.search.is_none());
    }

    #[test]
    fn test_list_query_bad_difficulty() {
        let query = SentenceListQuery {
            difficulty: Some("extreme".into()),
            ..Default::default()
        };
        assert!(query.to_filter().is_err());
    }
}
