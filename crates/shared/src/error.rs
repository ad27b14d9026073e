//! Application-wide error types.

use serde_json::{Value, json};
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (rejected before anything is stored).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation is not allowed in the current lifecycle state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Conflict (e.g., duplicate bid or vote).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The target round no longer accepts changes.
    #[error("Round closed: {0}")]
    RoundClosed(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::InvalidState(_) | Self::Conflict(_) => 409,
            Self::RoundClosed(_) => 422,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Conflict(_) => "CONFLICT",
            Self::RoundClosed(_) => "ROUND_CLOSED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the JSON body sent to API clients.
    ///
    /// Database and internal errors never leak their details.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let message = match self {
            Self::Database(_) | Self::Internal(_) => "An error occurred".to_string(),
            other => other.to_string(),
        };
        json!({
            "error": self.error_code(),
            "message": message,
        })
    }
}
