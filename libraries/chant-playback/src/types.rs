//! Core types for playback management

use std::fmt;
use std::time::Duration;

use chant_core::DEFAULT_SCHEME;
use serde::{Deserialize, Serialize};

/// Identity of one playback session
///
/// Issued in increasing order; completions tagged with an older id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Wrap a raw session number
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw session number
    pub fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Observable player status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No track selected
    Idle,
    /// Waiting for the playback URL or for the engine to buffer
    ResolvingUrl,
    /// Source attached and playable, not started
    Ready,
    /// Engine confirmed playback
    Playing,
    /// Stopped mid-track
    Paused,
    /// Reached the end of the media
    Ended,
    /// Failed; see the snapshot's error
    Error,
}

impl PlaybackStatus {
    /// Whether transport operations (seek, volume) reach the engine
    pub fn has_media(self) -> bool {
        matches!(self, Self::Ready | Self::Playing | Self::Paused)
    }
}

/// What happens when a track reaches its end
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// Stop at the end of the track
    #[default]
    Off,
    /// Continue with the next catalog track
    All,
    /// Repeat the current track
    One,
}

impl LoopMode {
    /// Cycle Off -> All -> One -> Off
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }
}

/// Seek request from the UI
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    /// Jump to an absolute position
    Absolute(Duration),
    /// Move forward from the current position
    Forward(Duration),
    /// Move backward from the current position (clamped at zero)
    Backward(Duration),
    /// Jump to a fraction (0.0-1.0) of the known duration
    Fraction(f64),
}

impl SeekTarget {
    /// Resolve to an absolute position
    ///
    /// Returns `None` for a fraction when the duration is unknown. The result
    /// never exceeds a known duration.
    pub fn resolve(self, position: Duration, duration: Option<Duration>) -> Option<Duration> {
        let target = match self {
            Self::Absolute(target) => target,
            Self::Forward(delta) => position.saturating_add(delta),
            Self::Backward(delta) => position.saturating_sub(delta),
            Self::Fraction(fraction) => {
                let total = duration?;
                let fraction = if fraction.is_finite() {
                    fraction.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                total.mul_f64(fraction)
            }
        };

        Some(match duration {
            Some(total) => target.min(total),
            None => target,
        })
    }
}

/// Configuration for the player
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Locator schemes accepted by the resolver (default: `["s3"]`)
    pub locator_schemes: Vec<String>,

    /// Initial volume (0-100, default: 100)
    pub volume: u8,

    /// Initial loop mode (default: Off)
    pub loop_mode: LoopMode,

    /// Manual retries allowed per selection (default: 3)
    pub max_retries: u32,

    /// Give up on URL resolution after this long (default: wait forever)
    pub resolve_timeout: Option<Duration>,

    /// Buffered notifications per subscriber (default: 64)
    pub notification_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            locator_schemes: vec![DEFAULT_SCHEME.to_string()],
            volume: 100,
            loop_mode: LoopMode::Off,
            max_retries: 3,
            resolve_timeout: None,
            notification_capacity: 64,
        }
    }
}
