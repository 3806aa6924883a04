//! Error types for twok.

use std::time::Duration;

use thiserror::Error;

/// Common error type for twok.
#[derive(Error, Debug)]
pub enum TwokError {
    /// Database error.
    ///
    /// This is a generic database error that wraps errors from any database backend.
    /// Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// A unique key is already taken (e.g. board name).
    #[error("{0} already exists")]
    Conflict(String),

    /// The requester is posting faster than the configured interval.
    #[error("posting too fast, retry in {}ms", retry_after.as_millis())]
    RateLimited {
        /// Time left until the requester may post again.
        retry_after: Duration,
    },

    /// Stored data violates an invariant (e.g. a cycle in a reply chain).
    #[error("internal consistency error: {0}")]
    Consistency(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for TwokError {
    fn from(e: sqlx::Error) -> Self {
        TwokError::Database(e.to_string())
    }
}

/// Result type alias for twok operations.
pub type Result<T> = std::result::Result<T, TwokError>;
