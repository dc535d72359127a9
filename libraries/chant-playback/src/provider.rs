//! Playback URL provider abstraction

use std::time::Duration;

use async_trait::async_trait;
use chant_core::Locator;

use crate::error::ProviderError;

/// Time-limited URL the engine can stream from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackUrl {
    /// Streamable URL
    pub url: String,

    /// Validity window, when the provider reports one
    pub expires_in: Option<Duration>,
}

impl PlaybackUrl {
    /// URL without a known expiry
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            expires_in: None,
        }
    }
}

/// Exchanges a parsed locator for a playback URL
///
/// Called at most once per playback session. Implementations are free to
/// perform network requests; the player runs them off its event loop.
#[async_trait]
pub trait PlaybackUrlProvider: Send + Sync {
    /// Resolve `locator` into a playable URL
    async fn resolve_playback_url(&self, locator: &Locator) -> Result<PlaybackUrl, ProviderError>;
}
