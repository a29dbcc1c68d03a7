//! Favorite endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use esl_common::db::Sentence;
use tracing::debug;

use super::identity::CurrentUser;
use super::sentences::parse_id;
use crate::db::{favorites, sentences};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /favorites
pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Sentence>>> {
    Ok(Json(favorites::list_favorites(&state.db, user.id()).await?))
}

/// PUT /favorites/:sentence_id
///
/// Idempotent; the sentence must be visible to the caller.
pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(sentence_id): Path<String>,
) -> ApiResult<StatusCode> {
    let sentence_id = parse_id(&sentence_id, "sentence")?;

    if sentences::get_visible_sentence(&state.db, user.id(), sentence_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound(format!("sentence {}", sentence_id)));
    }

    favorites::add_favorite(&state.db, user.id(), sentence_id).await?;
    debug!(user_id = %user.id(), sentence_id = %sentence_id, "Favorite added");

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /favorites/:sentence_id
///
/// Idempotent, like the PUT.
pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(sentence_id): Path<String>,
) -> ApiResult<StatusCode> {
    let sentence_id = parse_id(&sentence_id, "sentence")?;

    let removed = favorites::remove_favorite(&state.db, user.id(), sentence_id).await?;
    debug!(user_id = %user.id(), sentence_id = %sentence_id, removed, "Favorite removed");

    Ok(StatusCode::NO_CONTENT)
}
