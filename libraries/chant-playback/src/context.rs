//! Shared selection context
//!
//! The narrow, cloneable handle the rest of the application uses to select
//! tracks and express play intent. Commands are forwarded to the player
//! loop; reads come from the latest published [`PlayerSnapshot`].

use std::sync::Arc;
use std::time::Duration;

use chant_core::Track;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::engine::PlaybackEngine;
use crate::error::{ContextError, PlayerError, Result};
use crate::events::{PlaybackNotification, PlayerCommand};
use crate::player::Player;
use crate::provider::PlaybackUrlProvider;
use crate::types::{LoopMode, PlaybackStatus, PlayerConfig, SeekTarget};

/// Point-in-time view of the player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub selected: Option<Arc<Track>>,
    pub play_intent: bool,
    pub status: PlaybackStatus,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: u8,
    pub muted: bool,
    pub loop_mode: LoopMode,
    pub error: Option<PlayerError>,
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            selected: None,
            play_intent: false,
            status: PlaybackStatus::Idle,
            position: Duration::ZERO,
            duration: None,
            volume: 100,
            muted: false,
            loop_mode: LoopMode::Off,
            error: None,
        }
    }
}

/// Handle to a running player
#[derive(Debug, Clone)]
pub struct SelectionContext {
    commands: UnboundedSender<PlayerCommand>,
    snapshot: watch::Receiver<PlayerSnapshot>,
    notifications: broadcast::Sender<PlaybackNotification>,
}

impl SelectionContext {
    /// Currently selected track
    pub fn selected_track(&self) -> Option<Arc<Track>> {
        self.snapshot.borrow().selected.clone()
    }

    /// Whether audio should be playing
    pub fn play_intent(&self) -> bool {
        self.snapshot.borrow().play_intent
    }

    pub fn status(&self) -> PlaybackStatus {
        self.snapshot.borrow().status
    }

    /// Current playback position
    pub fn current_time(&self) -> Duration {
        self.snapshot.borrow().position
    }

    /// Media duration, once known
    pub fn duration(&self) -> Option<Duration> {
        self.snapshot.borrow().duration
    }

    /// Latest snapshot
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Select a track, or clear the selection with `None`
    ///
    /// Selecting the track that is already loading or playing keeps its
    /// session.
    pub fn select_track(&self, track: Option<Arc<Track>>) -> Result<()> {
        self.send(PlayerCommand::SelectTrack(track))
    }

    pub fn request_play(&self) -> Result<()> {
        self.send(PlayerCommand::Play)
    }

    pub fn request_pause(&self) -> Result<()> {
        self.send(PlayerCommand::Pause)
    }

    /// Pause when audio should be playing, play otherwise
    pub fn toggle_play_pause(&self) -> Result<()> {
        if self.play_intent() {
            self.request_pause()
        } else {
            self.request_play()
        }
    }

    /// Seek; ignored unless media is attached
    pub fn seek_to(&self, target: SeekTarget) -> Result<()> {
        self.send(PlayerCommand::Seek(target))
    }

    /// Play `track` from `offset`
    ///
    /// The seek lands before playback starts.
    pub fn resume(&self, track: Arc<Track>, offset: Duration) -> Result<()> {
        self.send(PlayerCommand::Resume { track, offset })
    }

    /// Set volume (0-100)
    pub fn set_volume(&self, level: u8) -> Result<()> {
        self.send(PlayerCommand::SetVolume(level))
    }

    pub fn toggle_mute(&self) -> Result<()> {
        self.send(PlayerCommand::ToggleMute)
    }

    /// Replace the track list used by skip and loop-all
    pub fn set_catalog(&self, tracks: Vec<Arc<Track>>) -> Result<()> {
        self.send(PlayerCommand::SetCatalog(tracks))
    }

    pub fn skip_next(&self) -> Result<()> {
        self.send(PlayerCommand::Next)
    }

    pub fn skip_previous(&self) -> Result<()> {
        self.send(PlayerCommand::Previous)
    }

    pub fn set_loop_mode(&self, mode: LoopMode) -> Result<()> {
        self.send(PlayerCommand::SetLoopMode(mode))
    }

    /// Retry the failed track, up to the configured limit
    pub fn retry(&self) -> Result<()> {
        self.send(PlayerCommand::Retry)
    }

    /// Detach the source and stop the player loop
    pub fn shutdown(&self) -> Result<()> {
        self.send(PlayerCommand::Shutdown)
    }

    /// Subscribe to notifications
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackNotification> {
        self.notifications.subscribe()
    }

    /// Watch snapshots
    pub fn watch(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshot.clone()
    }

    fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| ContextError::ServiceStopped)
    }
}

/// Runs a [`Player`] on the tokio runtime
pub struct PlayerService;

impl PlayerService {
    /// Spawn the player loop and return its context
    ///
    /// The loop stops on [`SelectionContext::shutdown`] or once every
    /// context clone is dropped.
    pub fn spawn<E>(
        engine: E,
        provider: Arc<dyn PlaybackUrlProvider>,
        config: PlayerConfig,
    ) -> (SelectionContext, JoinHandle<()>)
    where
        E: PlaybackEngine + 'static,
    {
        let (player, events) = Player::new(engine, provider, config);
        let (commands, command_rx) = mpsc::unbounded_channel();

        let context = SelectionContext {
            commands,
            snapshot: player.watch(),
            notifications: player.notification_sender(),
        };

        let handle = tokio::spawn(player.run(events, command_rx));
        (context, handle)
    }
}
