//! Player state machine
//!
//! Reconciles the selected track and the play intent against what the engine
//! is actually doing. Every input (UI command, URL resolution, engine report)
//! is a [`PlayerEvent`] handled to completion before the next one, so no
//! locking is needed; stale completions are recognized by their session id
//! and dropped.

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use chant_core::{catalog, LocatorResolver, Track, TrackId};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, trace, warn};

use crate::context::PlayerSnapshot;
use crate::engine::{EngineEvent, EngineListener, PlaybackEngine};
use crate::error::{PlayerError, ProviderError};
use crate::events::{PlaybackNotification, PlayerCommand, PlayerEvent};
use crate::provider::{PlaybackUrl, PlaybackUrlProvider};
use crate::session::Session;
use crate::types::{LoopMode, PlaybackStatus, PlayerConfig, SeekTarget, SessionId};
use crate::volume::Volume;

/// Message shown when manual retries are exhausted
pub const RETRIES_EXHAUSTED: &str = "Maximum retry attempts reached";

#[derive(Debug, Default)]
enum PlayerState {
    #[default]
    Idle,
    ResolvingUrl(Session),
    Ready(Session),
    Playing(Session),
    Paused(Session),
    Ended(Session),
    /// `session` is kept only when its source is still attached
    Error {
        session: Option<Session>,
        error: PlayerError,
    },
}

impl PlayerState {
    fn status(&self) -> PlaybackStatus {
        match self {
            Self::Idle => PlaybackStatus::Idle,
            Self::ResolvingUrl(_) => PlaybackStatus::ResolvingUrl,
            Self::Ready(_) => PlaybackStatus::Ready,
            Self::Playing(_) => PlaybackStatus::Playing,
            Self::Paused(_) => PlaybackStatus::Paused,
            Self::Ended(_) => PlaybackStatus::Ended,
            Self::Error { .. } => PlaybackStatus::Error,
        }
    }

    fn session(&self) -> Option<&Session> {
        match self {
            Self::Idle => None,
            Self::ResolvingUrl(session)
            | Self::Ready(session)
            | Self::Playing(session)
            | Self::Paused(session)
            | Self::Ended(session) => Some(session),
            Self::Error { session, .. } => session.as_ref(),
        }
    }

    fn session_mut(&mut self) -> Option<&mut Session> {
        match self {
            Self::Idle => None,
            Self::ResolvingUrl(session)
            | Self::Ready(session)
            | Self::Playing(session)
            | Self::Paused(session)
            | Self::Ended(session) => Some(session),
            Self::Error { session, .. } => session.as_mut(),
        }
    }

    /// Session with media the engine can seek and set volume on
    fn media_session_mut(&mut self) -> Option<&mut Session> {
        match self {
            Self::Ready(session) | Self::Playing(session) | Self::Paused(session) => Some(session),
            _ => None,
        }
    }

    /// Whether `locator` is already being resolved or played
    fn is_live_for(&self, locator: &str) -> bool {
        match self {
            Self::ResolvingUrl(session)
            | Self::Ready(session)
            | Self::Playing(session)
            | Self::Paused(session) => session.locator == locator,
            _ => false,
        }
    }

    fn error(&self) -> Option<&PlayerError> {
        match self {
            Self::Error { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Playback state machine driving one engine
pub struct Player<E: PlaybackEngine> {
    engine: E,
    provider: Arc<dyn PlaybackUrlProvider>,
    resolver: LocatorResolver,
    config: PlayerConfig,

    state: PlayerState,
    published_status: PlaybackStatus,
    last_session: SessionId,

    selected: Option<Arc<Track>>,
    play_intent: bool,
    catalog: Vec<Arc<Track>>,
    volume: Volume,
    loop_mode: LoopMode,
    retries: u32,

    events: UnboundedSender<PlayerEvent>,
    snapshot: watch::Sender<PlayerSnapshot>,
    notifications: broadcast::Sender<PlaybackNotification>,
    /// Notifications raised while handling the current event
    outbox: Vec<PlaybackNotification>,
}

impl<E: PlaybackEngine> Player<E> {
    /// Create a player
    ///
    /// Returns the receiver for URL resolutions and engine reports; feed its
    /// events back into [`Player::handle`] (or hand it to [`Player::run`]).
    pub fn new(
        engine: E,
        provider: Arc<dyn PlaybackUrlProvider>,
        config: PlayerConfig,
    ) -> (Self, UnboundedReceiver<PlayerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let (notifications, _) = broadcast::channel(config.notification_capacity.max(1));
        let volume = Volume::new(config.volume);
        let (snapshot, _) = watch::channel(PlayerSnapshot {
            volume: volume.level(),
            loop_mode: config.loop_mode,
            ..PlayerSnapshot::default()
        });

        let player = Self {
            engine,
            provider,
            resolver: LocatorResolver::new(config.locator_schemes.iter().cloned()),
            loop_mode: config.loop_mode,
            config,
            state: PlayerState::Idle,
            published_status: PlaybackStatus::Idle,
            last_session: SessionId::new(0),
            selected: None,
            play_intent: false,
            catalog: Vec::new(),
            volume,
            retries: 0,
            events,
            snapshot,
            notifications,
            outbox: Vec::new(),
        };

        (player, receiver)
    }

    /// Current status
    pub fn status(&self) -> PlaybackStatus {
        self.state.status()
    }

    /// Selected track
    pub fn selected(&self) -> Option<&Arc<Track>> {
        self.selected.as_ref()
    }

    /// Whether audio should be playing
    pub fn play_intent(&self) -> bool {
        self.play_intent
    }

    /// Last known position of the current session
    pub fn position(&self) -> Duration {
        self.state
            .session()
            .map_or(Duration::ZERO, |session| session.position)
    }

    /// Duration of the current session's media, once known
    pub fn duration(&self) -> Option<Duration> {
        self.state.session().and_then(|session| session.duration)
    }

    /// Error of the failed session
    pub fn error(&self) -> Option<&PlayerError> {
        self.state.error()
    }

    /// Current session id, if any session is active
    pub fn session_id(&self) -> Option<SessionId> {
        self.state.session().map(|session| session.id)
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Engine driven by this player
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Point-in-time view of the player
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            selected: self.selected.clone(),
            play_intent: self.play_intent,
            status: self.state.status(),
            position: self.position(),
            duration: self.duration(),
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            loop_mode: self.loop_mode,
            error: self.state.error().cloned(),
        }
    }

    /// Subscribe to notifications
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackNotification> {
        self.notifications.subscribe()
    }

    /// Watch snapshots, updated after every handled event
    pub fn watch(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshot.subscribe()
    }

    pub(crate) fn notification_sender(&self) -> broadcast::Sender<PlaybackNotification> {
        self.notifications.clone()
    }

    /// Drive the player until shutdown
    ///
    /// Stops on [`PlayerCommand::Shutdown`] or when every command sender is
    /// dropped; the engine source is detached before returning.
    pub async fn run(
        mut self,
        mut events: UnboundedReceiver<PlayerEvent>,
        mut commands: UnboundedReceiver<PlayerCommand>,
    ) {
        info!("Player started");

        loop {
            let event = tokio::select! {
                Some(event) = events.recv() => event,
                command = commands.recv() => match command {
                    Some(command) => PlayerEvent::Command(command),
                    None => break,
                },
            };

            let shutdown = matches!(event, PlayerEvent::Command(PlayerCommand::Shutdown));
            self.handle(event).await;
            if shutdown {
                break;
            }
        }

        self.teardown();
        self.publish();
        info!("Player stopped");
    }

    /// Handle one event to completion
    ///
    /// The snapshot is published before any notification raised by the
    /// event is sent, so subscribers always read the post-event state.
    pub async fn handle(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Command(command) => self.handle_command(command).await,
            PlayerEvent::UrlResolved {
                session,
                locator,
                result,
            } => self.handle_resolved(session, &locator, result),
            PlayerEvent::Engine { session, event } => {
                self.handle_engine_event(session, event).await;
            }
        }

        self.publish();
    }

    async fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::SelectTrack(track) => self.select_track(track, None),
            PlayerCommand::Play => self.request_play().await,
            PlayerCommand::Pause => self.request_pause(),
            PlayerCommand::Seek(target) => self.seek(target),
            PlayerCommand::SetVolume(level) => {
                self.volume.set_level(level);
                self.apply_volume();
            }
            PlayerCommand::ToggleMute => {
                self.volume.toggle_mute();
                self.apply_volume();
            }
            PlayerCommand::Resume { track, offset } => self.resume(track, offset).await,
            PlayerCommand::SetCatalog(tracks) => {
                debug!(tracks = tracks.len(), "Catalog updated");
                self.catalog = tracks;
            }
            PlayerCommand::Next => self.skip(true),
            PlayerCommand::Previous => self.skip(false),
            PlayerCommand::SetLoopMode(mode) => {
                self.loop_mode = mode;
                self.notify(PlaybackNotification::LoopModeChanged { mode });
            }
            PlayerCommand::Retry => self.retry(),
            PlayerCommand::Shutdown => self.teardown(),
        }
    }

    fn select_track(&mut self, track: Option<Arc<Track>>, pending_seek: Option<Duration>) {
        let Some(track) = track else {
            debug!("Selection cleared");
            self.detach();
            self.play_intent = false;
            self.enter(PlayerState::Idle);
            if self.selected.take().is_some() {
                self.notify(PlaybackNotification::TrackChanged { track_id: None });
            }
            return;
        };

        let changed = self
            .selected
            .as_ref()
            .map_or(true, |selected| selected.id != track.id);
        let locator = track.locator.clone();
        let track_id = track.id.clone();
        self.selected = Some(track);
        if changed {
            self.notify(PlaybackNotification::TrackChanged {
                track_id: Some(track_id),
            });
        }

        if self.state.is_live_for(&locator) {
            debug!(locator = %locator, "Track already active, keeping session");
            return;
        }

        self.retries = 0;
        self.start_session(&locator, pending_seek);
    }

    fn start_session(&mut self, locator: &str, pending_seek: Option<Duration>) {
        self.detach();

        self.last_session = self.last_session.next();
        let id = self.last_session;
        debug!(session = %id, locator = %locator, "Starting playback session");
        self.enter(PlayerState::ResolvingUrl(Session::new(id, locator, pending_seek)));

        let parsed = match self.resolver.resolve(locator) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(session = %id, error = %err, "Rejected track locator");
                self.fail(None, PlayerError::InvalidLocator(err));
                return;
            }
        };

        let provider = Arc::clone(&self.provider);
        let events = self.events.clone();
        let timeout = self.config.resolve_timeout;
        let locator = locator.to_string();

        tokio::spawn(async move {
            let request = provider.resolve_playback_url(&parsed);
            let result = match timeout {
                Some(limit) => tokio::time::timeout(limit, request)
                    .await
                    .unwrap_or(Err(ProviderError::Timeout(limit))),
                None => request.await,
            };

            if events
                .send(PlayerEvent::UrlResolved {
                    session: id,
                    locator,
                    result,
                })
                .is_err()
            {
                trace!(session = %id, "Player gone, dropping URL resolution");
            }
        });
    }

    fn handle_resolved(
        &mut self,
        session: SessionId,
        locator: &str,
        result: Result<PlaybackUrl, ProviderError>,
    ) {
        let current = match &mut self.state {
            PlayerState::ResolvingUrl(current)
                if current.id == session && current.locator == locator && current.url.is_none() =>
            {
                current
            }
            _ => {
                debug!(session = %session, locator = %locator, "Stale URL resolution, ignoring");
                return;
            }
        };

        match result {
            Ok(url) => {
                debug!(session = %session, "Playback URL resolved, attaching source");
                self.engine
                    .set_source(&url.url, EngineListener::new(session, self.events.clone()));
                current.url = Some(url);
            }
            Err(err) => {
                warn!(session = %session, error = %err, "Failed to resolve playback URL");
                self.fail(None, PlayerError::ResolutionFailed(err.to_string()));
            }
        }
    }

    async fn handle_engine_event(&mut self, session: SessionId, event: EngineEvent) {
        if self.state.session().map(|current| current.id) != Some(session) {
            trace!(session = %session, ?event, "Stale engine event, ignoring");
            return;
        }

        match event {
            EngineEvent::TimeUpdate(position) => {
                let Some(current) = self.state.session_mut() else {
                    return;
                };
                current.position = position;
                let duration = current.duration;
                self.notify(PlaybackNotification::PositionUpdate { position, duration });
            }
            EngineEvent::DurationKnown(duration) => {
                if let Some(current) = self.state.session_mut() {
                    current.duration = Some(duration);
                }
            }
            EngineEvent::CanPlay => self.handle_can_play().await,
            EngineEvent::Ended => self.handle_ended().await,
            EngineEvent::Error(message) => {
                warn!(session = %session, error = %message, "Engine reported playback failure");
                self.detach();
                self.play_intent = false;
                self.fail(None, PlayerError::EngineFault(message));
            }
        }
    }

    async fn handle_can_play(&mut self) {
        let mut session = match mem::take(&mut self.state) {
            PlayerState::ResolvingUrl(session) if session.has_source() => session,
            other => {
                // Re-buffering after a seek reports can-play again
                self.state = other;
                return;
            }
        };

        self.engine.set_volume(self.volume.fraction());
        if let Some(offset) = session.pending_seek.take() {
            let offset = session.duration.map_or(offset, |total| offset.min(total));
            debug!(session = %session.id, offset = ?offset, "Applying start offset");
            self.engine.set_current_time(offset);
            session.position = offset;
        }

        self.enter(PlayerState::Ready(session));

        if self.play_intent {
            self.start_playback().await;
        }
    }

    /// Issue one start request and enter `Playing` only once it succeeds
    async fn start_playback(&mut self) {
        let session = match mem::take(&mut self.state) {
            PlayerState::Ready(session)
            | PlayerState::Paused(session)
            | PlayerState::Ended(session)
            | PlayerState::Error {
                session: Some(session),
                error: PlayerError::PlaybackStartFailed(_),
            } => session,
            other => {
                self.state = other;
                return;
            }
        };

        match self.engine.play().await {
            Ok(()) => {
                info!(session = %session.id, position = ?session.position, "Playback started");
                let position = session.position;
                self.enter(PlayerState::Playing(session));
                if let Some(track_id) = self.selected_id() {
                    self.notify(PlaybackNotification::Playing { track_id, position });
                }
            }
            Err(err) => {
                warn!(session = %session.id, error = %err, "Engine refused to start playback");
                self.play_intent = false;
                self.fail(Some(session), PlayerError::PlaybackStartFailed(err.to_string()));
            }
        }
    }

    async fn request_play(&mut self) {
        self.play_intent = true;
        // Anywhere else the intent is picked up later (or already honored)
        self.start_playback().await;
    }

    fn request_pause(&mut self) {
        self.play_intent = false;

        match mem::take(&mut self.state) {
            PlayerState::Playing(session) => {
                self.engine.pause();
                let position = session.position;
                debug!(session = %session.id, position = ?position, "Playback paused");
                self.enter(PlayerState::Paused(session));
                self.notify(PlaybackNotification::Paused { position });
            }
            other => self.state = other,
        }
    }

    fn seek(&mut self, target: SeekTarget) {
        let Some(session) = self.state.media_session_mut() else {
            trace!(?target, "No media attached, ignoring seek");
            return;
        };
        let Some(position) = target.resolve(session.position, session.duration) else {
            trace!(?target, "Duration unknown, ignoring seek");
            return;
        };

        session.position = position;
        self.engine.set_current_time(position);
    }

    fn apply_volume(&mut self) {
        if self.state.status().has_media() {
            self.engine.set_volume(self.volume.fraction());
        }
        self.notify(PlaybackNotification::VolumeChanged {
            level: self.volume.level(),
            muted: self.volume.is_muted(),
        });
    }

    async fn resume(&mut self, track: Arc<Track>, offset: Duration) {
        self.play_intent = true;

        if !self.state.is_live_for(&track.locator) {
            self.select_track(Some(track), Some(offset));
            return;
        }

        debug!(track_id = %track.id, offset = ?offset, "Resuming active track");
        self.selected = Some(track);
        match &mut self.state {
            PlayerState::ResolvingUrl(session) => session.pending_seek = Some(offset),
            PlayerState::Ready(session)
            | PlayerState::Paused(session)
            | PlayerState::Playing(session) => {
                let offset = session.duration.map_or(offset, |total| offset.min(total));
                session.position = offset;
                self.engine.set_current_time(offset);
            }
            _ => {}
        }
        self.start_playback().await;
    }

    async fn handle_ended(&mut self) {
        let mut session = match mem::take(&mut self.state) {
            PlayerState::Playing(session)
            | PlayerState::Ready(session)
            | PlayerState::Paused(session) => session,
            other => {
                self.state = other;
                return;
            }
        };

        session.position = Duration::ZERO;
        self.engine.set_current_time(Duration::ZERO);
        info!(session = %session.id, loop_mode = ?self.loop_mode, "Track ended");

        if self.loop_mode != LoopMode::One {
            self.play_intent = false;
        }
        self.enter(PlayerState::Ended(session));
        if let Some(track_id) = self.selected_id() {
            self.notify(PlaybackNotification::Ended { track_id });
        }

        match self.loop_mode {
            LoopMode::Off => {}
            LoopMode::One => self.start_playback().await,
            LoopMode::All => self.skip(true),
        }
    }

    fn skip(&mut self, forward: bool) {
        if self.catalog.is_empty() {
            debug!("Catalog empty, nothing to skip to");
            return;
        }

        let index = match &self.selected {
            Some(current) if forward => catalog::next_index(&self.catalog, &current.id),
            Some(current) => catalog::previous_index(&self.catalog, &current.id),
            None if forward => Some(0),
            None => Some(self.catalog.len() - 1),
        };
        let Some(index) = index else {
            debug!("Current track not in catalog, not skipping");
            return;
        };

        let track = Arc::clone(&self.catalog[index]);
        debug!(track_id = %track.id, forward, "Skipping");
        self.play_intent = true;
        self.select_track(Some(track), None);
    }

    fn retry(&mut self) {
        if !matches!(self.state, PlayerState::Error { .. }) {
            debug!(status = ?self.state.status(), "Nothing to retry");
            return;
        }
        let Some(track) = self.selected.clone() else {
            return;
        };

        if self.retries >= self.config.max_retries {
            warn!(track_id = %track.id, retries = self.retries, "Retry limit reached");
            self.notify(PlaybackNotification::Error {
                message: RETRIES_EXHAUSTED.to_string(),
                error: None,
            });
            return;
        }

        self.retries += 1;
        info!(track_id = %track.id, attempt = self.retries, "Retrying playback");
        self.start_session(&track.locator, None);
    }

    /// Detach the engine source and go idle
    fn teardown(&mut self) {
        self.detach();
        self.play_intent = false;
        self.enter(PlayerState::Idle);
    }

    /// Clear the engine source if the current session attached one
    fn detach(&mut self) {
        if let Some(session) = self.state.session_mut() {
            if session.url.take().is_some() {
                debug!(session = %session.id, "Detaching engine source");
                self.engine.clear_source();
            }
        }
    }

    fn fail(&mut self, session: Option<Session>, error: PlayerError) {
        let message = error.to_string();
        self.enter(PlayerState::Error {
            session,
            error: error.clone(),
        });
        self.notify(PlaybackNotification::Error {
            message,
            error: Some(error),
        });
    }

    fn enter(&mut self, state: PlayerState) {
        self.state = state;

        let status = self.state.status();
        if status != self.published_status {
            trace!(from = ?self.published_status, to = ?status, "State transition");
            self.published_status = status;
            self.notify(PlaybackNotification::StateChanged { status });
        }
    }

    fn selected_id(&self) -> Option<TrackId> {
        self.selected.as_ref().map(|track| track.id.clone())
    }

    /// Queue a notification until the next [`Player::publish`]
    fn notify(&mut self, notification: PlaybackNotification) {
        self.outbox.push(notification);
    }

    /// Publish the snapshot, then send queued notifications
    fn publish(&mut self) {
        self.snapshot.send_replace(self.snapshot());
        for notification in self.outbox.drain(..) {
            // No subscribers is fine
            let _ = self.notifications.send(notification);
        }
    }
}
