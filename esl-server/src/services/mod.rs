//! Request-independent service logic

pub mod recommendation;

pub use recommendation::{select_candidates, RecommendationError};
