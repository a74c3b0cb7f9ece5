//! Error types for gameshelf.

use thiserror::Error;

/// Common error type for gameshelf.
#[derive(Error, Debug)]
pub enum ShelfError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// A uniqueness constraint was violated (e.g. a duplicate email).
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for ShelfError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return ShelfError::UniqueViolation(db_err.message().to_string());
            }
        }
        ShelfError::Database(e.to_string())
    }
}

/// Result type alias for gameshelf operations.
pub type Result<T> = std::result::Result<T, ShelfError>;
