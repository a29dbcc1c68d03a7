//! HTTP API handlers for esl-server

pub mod categories;
pub mod extract;
pub mod favorites;
pub mod health;
pub mod identity;
pub mod practice;
pub mod sentences;

pub use categories::{create_category, delete_category, list_categories};
pub use favorites::{add_favorite, list_favorites, remove_favorite};
pub use extract::{ApiJson, ApiQuery};
pub use health::health_routes;
pub use identity::{require_user, CurrentUser};
pub use practice::{get_practice_stats, get_recommendation, log_practice, score_transcript};
pub use sentences::{create_sentence, delete_sentence, get_sentence, list_sentences, update_sentence};
