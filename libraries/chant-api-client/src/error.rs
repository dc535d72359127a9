//! Error types for the catalog client.

use thiserror::Error;

/// Errors that can occur when talking to the catalog API.
#[derive(Error, Debug)]
pub enum ApiClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned a structured error body (`{"error", "code"}`)
    #[error("{error} (Code: {code})")]
    Api {
        status: u16,
        error: String,
        code: String,
    },

    /// API returned an error without a structured body
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Invalid API endpoint
    #[error("Invalid API endpoint: {0}")]
    InvalidUrl(String),

    /// Failed to parse API response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Presigned URL response had no URL
    #[error("No URL in presigned URL response")]
    MissingUrl,
}

impl ApiClientError {
    /// HTTP status of an error response, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::ServerError { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Whether the server rejected a write because of a concurrent update
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

/// Result type for catalog client operations.
pub type Result<T> = std::result::Result<T, ApiClientError>;
