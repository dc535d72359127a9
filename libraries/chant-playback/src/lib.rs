//! Chant Player - Playback Management
//!
//! Platform-agnostic playback state machine for Chant Player.
//!
//! This crate provides:
//! - An explicit player state machine (`Idle`, `ResolvingUrl`, `Ready`,
//!   `Playing`, `Paused`, `Ended`, `Error`)
//! - Session-tagged URL resolution so late completions never touch a newer
//!   selection
//! - Play intent coalescing while a track is still loading
//! - Resume from an offset, with the seek applied before the first start
//! - Volume (0-100%, mute), loop modes and catalog skipping
//! - A cloneable [`SelectionContext`] for the rest of the application
//!
//! # Architecture
//!
//! `chant-playback` knows nothing about audio devices or HTTP:
//! - The media engine is injected through [`PlaybackEngine`]
//! - Signed URLs come from a [`PlaybackUrlProvider`]
//!
//! Everything runs on one event loop; the engine and the provider report
//! back through [`PlayerEvent`]s.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chant_core::Track;
//! use chant_playback::{PlaybackEngine, PlaybackUrlProvider, PlayerConfig, PlayerService};
//!
//! async fn play<E: PlaybackEngine + 'static>(engine: E, provider: Arc<dyn PlaybackUrlProvider>) {
//!     let (context, _handle) = PlayerService::spawn(engine, provider, PlayerConfig::default());
//!
//!     let track = Arc::new(Track::new("1", "Kyrie", "Schola", "s3://chants/kyrie.mp3"));
//!     context.request_play().unwrap();
//!     context.select_track(Some(track)).unwrap();
//! }
//! ```

#![forbid(unsafe_code)]

pub mod context;
pub mod engine;
pub mod error;
pub mod events;
pub mod player;
pub mod provider;
pub mod session;
pub mod types;
pub mod volume;

// Re-export commonly used types
pub use context::{PlayerService, PlayerSnapshot, SelectionContext};
pub use engine::{EngineEvent, EngineListener, PlaybackEngine};
pub use error::{ContextError, EngineError, PlayerError, ProviderError};
pub use events::{PlaybackNotification, PlayerCommand, PlayerEvent};
pub use player::{Player, RETRIES_EXHAUSTED};
pub use provider::{PlaybackUrl, PlaybackUrlProvider};
pub use types::{LoopMode, PlaybackStatus, PlayerConfig, SeekTarget, SessionId};
pub use volume::Volume;
