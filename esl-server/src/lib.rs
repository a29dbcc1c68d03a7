//! esl-server library - sentence learning HTTP service
//!
//! Serves sentence browsing, categories, favorites and pronunciation practice
//! (transcript scoring, practice logging and practice recommendations).

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use esl_common::config::RecommendationConfig;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod pagination;
pub mod services;

pub use error::{ApiError, ApiResult};

use db::repository::{SentenceRepository, SqliteSentenceRepository};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Eligible-sentence queries used by the recommendation selector
    pub sentences: Arc<dyn SentenceRepository>,
    /// Recommendation batch quotas
    pub recommendation: RecommendationConfig,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create application state backed by the SQLite repository
    pub fn new(db: SqlitePool, recommendation: RecommendationConfig) -> Self {
        let sentences = Arc::new(SqliteSentenceRepository::new(db.clone()));
        Self::with_repository(db, sentences, recommendation)
    }

    /// Create application state with an explicit repository
    pub fn with_repository(
        db: SqlitePool,
        sentences: Arc<dyn SentenceRepository>,
        recommendation: RecommendationConfig,
    ) -> Self {
        Self {
            db,
            sentences,
            recommendation,
            startup_time: esl_common::time::now(),
        }
    }
}

/// Build application router
///
/// Everything except `/health` requires a resolved user identity.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post, put};

    let protected = Router::new()
        .route("/practice/recommendation", get(api::get_recommendation))
        .route("/practice/score", post(api::score_transcript))
        .route("/practice/logs", post(api::log_practice))
        .route("/practice/stats", get(api::get_practice_stats))
        .route("/sentences", get(api::list_sentences).post(api::create_sentence))
        .route(
            "/sentences/:id",
            get(api::get_sentence)
                .put(api::update_sentence)
                .delete(api::delete_sentence),
        )
        .route("/categories", get(api::list_categories).post(api::create_category))
        .route("/categories/:id", delete(api::delete_category))
        .route("/favorites", get(api::list_favorites))
        .route(
            "/favorites/:sentence_id",
            put(api::add_favorite).delete(api::remove_favorite),
        )
        .layer(middleware::from_fn(api::require_user));

    let public = Router::new().merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
