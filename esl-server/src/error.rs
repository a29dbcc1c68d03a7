//! Error types for esl-server
//!
//! Every failure reaches the client as `{ "error": "<message>" }`.
//! Storage failures are logged with their cause and reported generically.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::recommendation::RecommendationError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// No resolvable user identity (401)
    #[error("not authenticated")]
    Unauthenticated,

    /// Resource missing or not visible to the caller (404)
    #[error("{0}")]
    NotFound(String),

    /// Caller is not the owner (403)
    #[error("{0}")]
    Forbidden(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Request body failed to parse (400)
    #[error("invalid request body: {}", .0.body_text())]
    JsonBody(#[from] JsonRejection),

    /// Query string failed to parse (400)
    #[error("invalid query string: {}", .0.body_text())]
    QueryString(#[from] QueryRejection),

    /// Recommendation selection failed (500)
    #[error(transparent)]
    Recommendation(#[from] RecommendationError),

    /// esl-common error
    #[error(transparent)]
    Common(#[from] esl_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "not authenticated".to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::JsonBody(_) | ApiError::QueryString(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Recommendation(ref err) => {
                error!(error = ?err, "Recommendation request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Common(err) => match err {
                esl_common::Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
                esl_common::Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
                esl_common::Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
                other => {
                    error!(error = %other, "Request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal server error".to_string(),
                    )
                }
            },
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
