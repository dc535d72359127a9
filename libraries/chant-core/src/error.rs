/// Core error types for Chant Player
use thiserror::Error;

use crate::locator::LocatorError;

/// Result type alias using `ChantError`
pub type Result<T> = std::result::Result<T, ChantError>;

/// Core error type for Chant Player
#[derive(Error, Debug)]
pub enum ChantError {
    /// Malformed storage locator
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// Share link could not be parsed
    #[error("Invalid share link: {0}")]
    InvalidLink(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl ChantError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<url::ParseError> for ChantError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidLink(err.to_string())
    }
}
