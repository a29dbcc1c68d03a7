//! # ESL Common Library
//!
//! Shared code for the sentence-learning services:
//! - Database schema, models and initialization
//! - Bootstrap configuration and root folder resolution
//! - Transcript normalization and similarity scoring
//! - Time helpers

pub mod config;
pub mod db;
pub mod error;
pub mod text;
pub mod time;

pub use error::{Error, Result};
pub use text::{normalize, similarity_score};
