//! Shared fakes for player tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chant_core::{Locator, Track};
use chant_playback::{
    EngineError, EngineEvent, EngineListener, PlaybackEngine, PlaybackNotification, PlaybackStatus,
    PlaybackUrl, PlaybackUrlProvider, Player, PlayerConfig, PlayerEvent, ProviderError,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::{broadcast, oneshot};

// ===== Fake engine =====

/// Calls the player made on the engine, in order
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    SetSource(String),
    ClearSource,
    Play,
    Pause,
    Seek(Duration),
    Volume(f32),
}

#[derive(Default)]
struct EngineState {
    calls: Vec<EngineCall>,
    listener: Option<EngineListener>,
    rejections: Vec<EngineError>,
}

/// Recording engine; clones share state so tests can inspect it after
/// handing one clone to the player
#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Arc<Mutex<EngineState>>,
}

impl FakeEngine {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than volume changes
    pub fn transport_calls(&self) -> Vec<EngineCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, EngineCall::Volume(_)))
            .collect()
    }

    pub fn count(&self, expected: &EngineCall) -> usize {
        self.calls().iter().filter(|call| *call == expected).count()
    }

    pub fn play_count(&self) -> usize {
        self.count(&EngineCall::Play)
    }

    pub fn sources(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::SetSource(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn listener(&self) -> Option<EngineListener> {
        self.state.lock().unwrap().listener.clone()
    }

    /// Report an event through the attached listener
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.listener().is_some_and(|listener| listener.emit(event))
    }

    /// Make the next `play()` fail
    pub fn reject_next_play(&self, error: EngineError) {
        self.state.lock().unwrap().rejections.push(error);
    }

    fn record(&self, call: EngineCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl PlaybackEngine for FakeEngine {
    fn set_source(&mut self, url: &str, listener: EngineListener) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(EngineCall::SetSource(url.to_string()));
        state.listener = Some(listener);
    }

    fn clear_source(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(EngineCall::ClearSource);
        state.listener = None;
    }

    async fn play(&mut self) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(EngineCall::Play);
        match state.rejections.pop() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn pause(&mut self) {
        self.record(EngineCall::Pause);
    }

    fn set_current_time(&mut self, position: Duration) {
        self.record(EngineCall::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.record(EngineCall::Volume(volume));
    }
}

// ===== Controlled provider =====

type Pending = oneshot::Sender<Result<PlaybackUrl, ProviderError>>;

#[derive(Default)]
struct ProviderState {
    calls: Vec<String>,
    pending: HashMap<String, Pending>,
}

/// Provider whose resolutions complete only when the test says so
///
/// Requests are keyed by `container/key`.
#[derive(Clone, Default)]
pub struct ControlledProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl ControlledProvider {
    /// Locators requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Complete the pending request for `key`
    pub async fn complete(&self, key: &str, result: Result<PlaybackUrl, ProviderError>) {
        for _ in 0..100 {
            let sender = self.state.lock().unwrap().pending.remove(key);
            if let Some(sender) = sender {
                let _ = sender.send(result);
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("no pending resolution for {key}");
    }

    pub async fn succeed(&self, key: &str, url: &str) {
        self.complete(key, Ok(PlaybackUrl::new(url))).await;
    }

    pub async fn fail(&self, key: &str, message: &str) {
        self.complete(key, Err(ProviderError::request(message))).await;
    }
}

#[async_trait]
impl PlaybackUrlProvider for ControlledProvider {
    async fn resolve_playback_url(&self, locator: &Locator) -> Result<PlaybackUrl, ProviderError> {
        let key = locator.to_string();
        let (sender, receiver) = oneshot::channel();
        {
            let mut state = self.state.lock().unwrap();
            state.calls.push(key.clone());
            state.pending.insert(key, sender);
        }

        receiver
            .await
            .unwrap_or_else(|_| Err(ProviderError::request("request abandoned")))
    }
}

/// Provider that answers immediately with `https://cdn.test/<container>/<key>`
#[derive(Clone, Default)]
pub struct InstantProvider;

#[async_trait]
impl PlaybackUrlProvider for InstantProvider {
    async fn resolve_playback_url(&self, locator: &Locator) -> Result<PlaybackUrl, ProviderError> {
        Ok(PlaybackUrl::new(format!("https://cdn.test/{locator}")))
    }
}

// ===== Helpers =====

pub type TestPlayer = Player<FakeEngine>;

pub struct Harness {
    pub player: TestPlayer,
    pub events: UnboundedReceiver<PlayerEvent>,
    pub engine: FakeEngine,
    pub provider: ControlledProvider,
    pub notifications: broadcast::Receiver<PlaybackNotification>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(PlayerConfig::default())
    }

    pub fn with_config(config: PlayerConfig) -> Self {
        let engine = FakeEngine::default();
        let provider = ControlledProvider::default();
        let (player, events) = Player::new(engine.clone(), Arc::new(provider.clone()), config);
        let notifications = player.subscribe();

        Self {
            player,
            events,
            engine,
            provider,
            notifications,
        }
    }

    /// Let spawned resolutions run and feed every queued event to the player
    pub async fn settle(&mut self) {
        for _ in 0..10 {
            tokio::task::yield_now().await;
            while let Ok(event) = self.events.try_recv() {
                self.player.handle(event).await;
            }
        }
    }

    pub async fn command(&mut self, command: chant_playback::PlayerCommand) {
        self.player.handle(command.into()).await;
    }

    /// Emit an engine event and process it
    pub async fn engine_event(&mut self, event: EngineEvent) {
        assert!(self.engine.emit(event), "no listener attached");
        self.settle().await;
    }

    /// Select `track`, resolve it to `url` and signal can-play
    pub async fn load(&mut self, track: &Arc<Track>, url: &str) {
        self.command(chant_playback::PlayerCommand::SelectTrack(Some(Arc::clone(track))))
            .await;
        let key = track.locator.split_once("://").map_or("", |(_, path)| path);
        self.provider.succeed(key, url).await;
        self.settle().await;
        self.engine_event(EngineEvent::CanPlay).await;
    }

    /// Status changes broadcast since the last call
    pub fn statuses(&mut self) -> Vec<PlaybackStatus> {
        self.drain()
            .into_iter()
            .filter_map(|notification| match notification {
                PlaybackNotification::StateChanged { status } => Some(status),
                _ => None,
            })
            .collect()
    }

    /// Every notification since the last call
    pub fn drain(&mut self) -> Vec<PlaybackNotification> {
        let mut drained = Vec::new();
        while let Ok(notification) = self.notifications.try_recv() {
            drained.push(notification);
        }
        drained
    }
}

pub fn track(id: &str, locator: &str) -> Arc<Track> {
    Arc::new(Track::new(id, format!("Chant {id}"), "Schola", locator))
}

pub fn store_config() -> PlayerConfig {
    PlayerConfig {
        locator_schemes: vec!["store".to_string()],
        ..PlayerConfig::default()
    }
}
