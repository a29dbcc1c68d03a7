//! Common error types for the ESL services

use thiserror::Error;

/// Common result type for ESL operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the library and database layers
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found (or not visible to the caller)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller does not own the resource it tried to modify
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored data could not be interpreted
    #[error("Internal error: {0}")]
    Internal(String),
}
