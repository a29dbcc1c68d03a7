//! Category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use esl_common::db::Category;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::extract::ApiJson;
use super::identity::CurrentUser;
use super::sentences::parse_id;
use crate::db::categories::{self, CategoryWithCount};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Color assigned when none is given
pub const DEFAULT_CATEGORY_COLOR: &str = "#3b82f6";

/// `#rgb` or `#rrggbb`
fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Resolve the category a sentence is filed under
///
/// Unknown or deleted categories are reported as 400.
pub(crate) async fn require_owned_category(
    state: &AppState,
    user_id: &str,
    id: Uuid,
) -> ApiResult<Category> {
    match categories::get_owned_category(&state.db, user_id, id).await {
        Ok(category) => Ok(category),
        Err(esl_common::Error::NotFound(_)) => {
            Err(ApiError::BadRequest(format!("unknown category {}", id)))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /categories
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<CategoryWithCount>>> {
    Ok(Json(categories::list_categories(&state.db, user.id()).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// POST /categories
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(request): ApiJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;

    let color = match request.color.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_CATEGORY_COLOR,
        Some(color) if is_hex_color(color) => color,
        Some(color) => {
            return Err(ApiError::BadRequest(format!(
                "invalid color '{}' (expected #rgb or #rrggbb)",
                color
            )))
        }
    };

    let category = categories::insert_category(&state.db, user.id(), name, color).await?;
    info!(user_id = %user.id(), category_id = %category.id, "Category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// DELETE /categories/:id
///
/// Soft delete; the category's sentences disappear from every listing.
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id, "category")?;
    categories::get_owned_category(&state.db, user.id(), id).await?;

    categories::soft_delete_category(&state.db, id).await?;
    info!(user_id = %user.id(), category_id = %id, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}
