//! Error Handling
//!
//! Unified error type for the validation engine.
//! Uses thiserror for ergonomic error definitions.
//!
//! Domain failures (a call that went unanswered, a missing transcript) are
//! never errors; they are encoded in result objects. `AppError` is reserved
//! for unexpected vendor client failures and for the engine's own I/O and
//! configuration problems.

use thiserror::Error;

use deep_validate_core::ClientError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Unexpected vendor client failures (transport, parse)
    #[error("Vendor client error: {0}")]
    Client(#[from] ClientError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
