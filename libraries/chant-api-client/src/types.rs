//! Types for catalog API requests and responses.

use std::time::Duration;

use chant_core::Track;
use serde::{Deserialize, Serialize};

/// Configuration for connecting to the catalog API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the API (e.g., "https://api.example.com")
    pub endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// First backoff delay of `update_song_with_retry`; doubles per attempt
    pub retry_base_delay: Duration,
}

impl ApiConfig {
    /// Create a config with default timeouts.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(30),
            retry_base_delay: Duration::from_secs(1),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }
}

/// Song fields sent on create and update (everything but the id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SongInput {
    pub title: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineage: Option<String>,
    /// Storage locator (`s3://bucket/key`)
    pub s3_uri: String,
}

impl From<&Track> for SongInput {
    fn from(track: &Track) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            composer: track.composer.clone(),
            date: track.date.clone(),
            lineage: track.lineage.clone(),
            s3_uri: track.locator.clone(),
        }
    }
}

/// Request body for the presigned URL endpoint.
#[derive(Debug, Serialize)]
pub struct PresignedUrlRequest<'a> {
    pub bucket: &'a str,
    pub key: &'a str,
}

/// Time-limited download URL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrl {
    #[serde(default)]
    pub url: String,
    /// Validity in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Structured error body returned by the API.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: String,
    #[serde(default)]
    pub code: String,
}
