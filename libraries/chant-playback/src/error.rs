//! Error types for playback management

use std::time::Duration;

use chant_core::LocatorError;
use thiserror::Error;

/// Failures surfaced by the player state machine
///
/// Every variant ends up as an `Error` state plus a notification; none of
/// them escape the player as a `Result`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    /// The track's storage locator is malformed
    #[error(transparent)]
    InvalidLocator(#[from] LocatorError),

    /// The playback URL provider failed
    #[error("Access error: {0}")]
    ResolutionFailed(String),

    /// The engine refused to start (e.g. autoplay blocked)
    #[error("Playback could not start: {0}")]
    PlaybackStartFailed(String),

    /// Any other engine-reported failure
    #[error("Playback error: {0}")]
    EngineFault(String),
}

impl PlayerError {
    /// Whether the UI should ask the user to press play again
    ///
    /// Only a rejected start leaves the source attached; pressing play
    /// re-issues the start request.
    pub fn needs_user_gesture(&self) -> bool {
        matches!(self, Self::PlaybackStartFailed(_))
    }
}

/// Playback URL provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered without a URL
    #[error("No playback URL returned")]
    MissingUrl,

    /// Resolution took longer than the configured limit
    #[error("Playback URL request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport or server failure
    #[error("{0}")]
    Request(String),
}

impl ProviderError {
    /// Create a request error
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }
}

/// Playback engine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No source is attached to the engine
    #[error("No source attached")]
    NoSource,

    /// The host refused to start playback
    #[error("Playback blocked: {0}")]
    Blocked(String),

    /// Audio output failure
    #[error("Audio output error: {0}")]
    Output(String),
}

/// Errors returned by [`SelectionContext`](crate::SelectionContext) operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The player service loop is no longer running
    #[error("Player service has stopped")]
    ServiceStopped,
}

/// Result type for selection context operations
pub type Result<T> = std::result::Result<T, ContextError>;
