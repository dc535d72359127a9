//! Playback session bookkeeping

use std::time::Duration;

use crate::provider::PlaybackUrl;
use crate::types::SessionId;

/// One attempt to play one track
///
/// Created on selection, replaced on every re-selection or retry. Holds the
/// resolved URL so the same session never resolves twice.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub locator: String,
    pub url: Option<PlaybackUrl>,
    pub position: Duration,
    pub duration: Option<Duration>,
    /// Applied before the first play of the session
    pub pending_seek: Option<Duration>,
}

impl Session {
    pub fn new(id: SessionId, locator: impl Into<String>, pending_seek: Option<Duration>) -> Self {
        Self {
            id,
            locator: locator.into(),
            url: None,
            position: Duration::ZERO,
            duration: None,
            pending_seek,
        }
    }

    /// Whether a source was handed to the engine
    pub fn has_source(&self) -> bool {
        self.url.is_some()
    }
}
