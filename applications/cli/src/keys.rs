//! Interactive key bindings
//!
//! Input is line based: type a key and press enter. An empty line toggles
//! play/pause.

use std::time::Duration;

use chant_playback::SeekTarget;

/// Seconds skipped by `f` / `b`
const SEEK_STEP: Duration = Duration::from_secs(10);

/// Volume change per `+` / `-`
pub const VOLUME_STEP: u8 = 10;

/// A parsed interactive command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Key {
    TogglePlay,
    Seek(SeekTarget),
    VolumeUp,
    VolumeDown,
    ToggleMute,
    Next,
    Previous,
    CycleLoop,
    Retry,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
  <enter>/t  play/pause      f/b   seek +/-10s     s <secs>  seek to
  +/-        volume          m     mute            n/p       next/previous
  l          cycle loop      r     retry           i         status
  h          help            q     quit";

/// Parse one line of input
///
/// Returns `None` for anything unrecognised.
pub fn parse_key(line: &str) -> Option<Key> {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    let head = parts.next().unwrap_or("");

    let key = match head {
        "" | "t" => Key::TogglePlay,
        "f" => Key::Seek(SeekTarget::Forward(SEEK_STEP)),
        "b" => Key::Seek(SeekTarget::Backward(SEEK_STEP)),
        "s" => {
            let seconds: f64 = parts.next()?.parse().ok()?;
            if !seconds.is_finite() || seconds < 0.0 {
                return None;
            }
            Key::Seek(SeekTarget::Absolute(Duration::from_secs_f64(seconds)))
        }
        "+" => Key::VolumeUp,
        "-" => Key::VolumeDown,
        "m" => Key::ToggleMute,
        "n" => Key::Next,
        "p" => Key::Previous,
        "l" => Key::CycleLoop,
        "r" => Key::Retry,
        "i" => Key::Status,
        "h" | "?" => Key::Help,
        "q" => Key::Quit,
        _ => return None,
    };

    if parts.next().is_some() {
        return None;
    }
    Some(key)
}

/// Apply a volume key to the current level
pub fn step_volume(level: u8, key: Key) -> u8 {
    match key {
        Key::VolumeUp => level.saturating_add(VOLUME_STEP).min(100),
        Key::VolumeDown => level.saturating_sub(VOLUME_STEP),
        _ => level,
    }
}
