//! Desktop playback engine for Chant Player
//!
//! Implements `chant_playback::PlaybackEngine` on top of rodio:
//!
//! - Signed URLs are downloaded with reqwest on the caller's tokio runtime
//! - Decoding and output happen on a dedicated audio thread that owns the
//!   output stream
//! - Duration, can-play, position, end-of-media and failures are reported
//!   through the session's `EngineListener`
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chant_audio_desktop::DesktopEngine;
//! use chant_playback::{PlaybackUrlProvider, PlayerConfig, PlayerService};
//!
//! # async fn run(provider: Arc<dyn PlaybackUrlProvider>) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DesktopEngine::new()?;
//! let (context, _handle) = PlayerService::spawn(engine, provider, PlayerConfig::default());
//! context.request_play()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod audio_thread;
mod download;
mod engine;
mod error;

pub use download::fetch_source;
pub use engine::DesktopEngine;
pub use error::{DesktopAudioError, Result};
