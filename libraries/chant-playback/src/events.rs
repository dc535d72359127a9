//! Player events and notifications
//!
//! [`PlayerEvent`] is the single input stream of the player: UI commands, URL
//! resolution completions and engine reports all arrive as events and are
//! handled one at a time. [`PlaybackNotification`] is what the player tells
//! subscribers in return.

use std::sync::Arc;
use std::time::Duration;

use chant_core::{Track, TrackId};

use crate::engine::EngineEvent;
use crate::error::{PlayerError, ProviderError};
use crate::provider::PlaybackUrl;
use crate::types::{LoopMode, PlaybackStatus, SeekTarget, SessionId};

/// Input to the player state machine
#[derive(Debug)]
pub enum PlayerEvent {
    /// Request from the UI
    Command(PlayerCommand),

    /// URL resolution finished for a session
    UrlResolved {
        session: SessionId,
        locator: String,
        result: Result<PlaybackUrl, ProviderError>,
    },

    /// Report from the engine for a session
    Engine {
        session: SessionId,
        event: EngineEvent,
    },
}

impl From<PlayerCommand> for PlayerEvent {
    fn from(command: PlayerCommand) -> Self {
        Self::Command(command)
    }
}

/// UI requests
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    /// Select a track, or clear the selection with `None`
    SelectTrack(Option<Arc<Track>>),

    /// Set play intent
    Play,

    /// Clear play intent
    Pause,

    /// Move the playback position
    Seek(SeekTarget),

    /// Set volume (0-100)
    SetVolume(u8),

    /// Toggle mute
    ToggleMute,

    /// Select `track` if needed, seek to `offset` and play
    Resume { track: Arc<Track>, offset: Duration },

    /// Replace the track list used for skipping
    SetCatalog(Vec<Arc<Track>>),

    /// Skip to the next catalog track
    Next,

    /// Skip to the previous catalog track
    Previous,

    /// Change the loop mode
    SetLoopMode(LoopMode),

    /// Retry the failed track
    Retry,

    /// Detach the source and stop the player loop
    Shutdown,
}

/// Notifications broadcast to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackNotification {
    /// Status changed
    StateChanged { status: PlaybackStatus },

    /// Selection changed
    TrackChanged { track_id: Option<TrackId> },

    /// Engine confirmed playback
    Playing { track_id: TrackId, position: Duration },

    /// Playback paused
    Paused { position: Duration },

    /// Position advanced
    PositionUpdate {
        position: Duration,
        duration: Option<Duration>,
    },

    /// Track reached its end
    Ended { track_id: TrackId },

    /// Volume changed
    VolumeChanged { level: u8, muted: bool },

    /// Loop mode changed
    LoopModeChanged { mode: LoopMode },

    /// A failure the user should see
    Error { message: String, error: Option<PlayerError> },
}
