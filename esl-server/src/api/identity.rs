//! Caller identity resolution
//!
//! The fronting identity provider forwards the signed-in user as the
//! `X-User-Id` header. A `userId` query parameter is accepted as a fallback
//! for clients that cannot set headers.

use axum::{
    extract::{Query, Request},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Resolved caller identity, inserted as a request extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Deserialize)]
struct IdentityQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Resolve the caller from the header, falling back to the query string
pub fn resolve_user(request: &Request) -> Option<CurrentUser> {
    let from_header = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(non_blank);

    from_header
        .or_else(|| {
            Query::<IdentityQuery>::try_from_uri(request.uri())
                .ok()
                .and_then(|Query(query)| query.user_id)
                .and_then(|id| non_blank(&id))
        })
        .map(CurrentUser)
}

/// Identity middleware
///
/// Rejects with 401 before any handler (and so any query) runs.
pub async fn require_user(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let user = resolve_user(&request).ok_or_else(|| {
        debug!(path = %request.uri().path(), "Rejected request without identity");
        ApiError::Unauthenticated
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
