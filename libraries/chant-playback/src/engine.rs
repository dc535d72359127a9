//! Playback engine abstraction
//!
//! The engine is the host's media element: it fetches the source, decodes,
//! and renders audio. The player drives it through [`PlaybackEngine`] and the
//! engine reports back through an [`EngineListener`] bound to one session.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::EngineError;
use crate::events::PlayerEvent;
use crate::types::SessionId;

/// Events an engine reports about its current source
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Playback position advanced
    TimeUpdate(Duration),

    /// Media duration became known
    DurationKnown(Duration),

    /// Enough data is buffered to start playback
    CanPlay,

    /// Reached the end of the media
    Ended,

    /// Fetch, decode or output failure
    Error(String),
}

/// Host media engine
///
/// Implementations must be cheap to call from the player loop; heavy work
/// (downloading, decoding) belongs on the engine's own tasks, reported back
/// through the listener.
#[async_trait]
pub trait PlaybackEngine: Send {
    /// Attach a new source, replacing any previous one
    ///
    /// Events for this source must be sent through `listener`.
    fn set_source(&mut self, url: &str, listener: EngineListener);

    /// Detach the current source and stop any output
    fn clear_source(&mut self);

    /// Start or continue playback
    ///
    /// Resolves once the engine confirms playback, or fails when the host
    /// refuses to start (e.g. autoplay policy).
    async fn play(&mut self) -> Result<(), EngineError>;

    /// Pause playback, keeping the position
    fn pause(&mut self);

    /// Move the playback position
    fn set_current_time(&mut self, position: Duration);

    /// Set output volume (0.0 to 1.0)
    fn set_volume(&mut self, volume: f32);
}

/// Delivers engine events to the player, tagged with their session
#[derive(Debug, Clone)]
pub struct EngineListener {
    session: SessionId,
    events: UnboundedSender<PlayerEvent>,
}

impl EngineListener {
    /// Create a listener for `session`
    pub fn new(session: SessionId, events: UnboundedSender<PlayerEvent>) -> Self {
        Self { session, events }
    }

    /// Session this listener reports for
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Report an event
    ///
    /// Returns `false` once the player has shut down.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.events
            .send(PlayerEvent::Engine {
                session: self.session,
                event,
            })
            .is_ok()
    }
}
