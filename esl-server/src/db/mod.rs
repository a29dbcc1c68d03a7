//! Database access layer for esl-server

pub mod categories;
pub mod favorites;
pub mod practice_logs;
pub mod repository;
pub mod sentences;

pub use repository::{EligibleQuery, IdFilter, SentenceRepository, SqliteSentenceRepository};
