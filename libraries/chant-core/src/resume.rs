//! Resume state persistence
//!
//! Remembers which song was playing and where, so the next session can offer
//! to continue listening. Stored as a small JSON document:
//!
//! ```json
//! {"songId":"42","timestamp":73.5,"lastUpdated":1718000000000}
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::types::TrackId;

/// Last listened position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeState {
    /// Song that was playing
    pub song_id: TrackId,

    /// Position in seconds
    pub timestamp: f64,

    /// When the state was written
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
}

impl ResumeState {
    /// Create a state stamped with the current time
    pub fn new(song_id: TrackId, position: Duration) -> Self {
        Self {
            song_id,
            timestamp: position.as_secs_f64(),
            last_updated: Utc::now(),
        }
    }

    /// Stored position as a `Duration`
    ///
    /// Negative or non-finite values written by other clients read as zero.
    pub fn position(&self) -> Duration {
        if self.timestamp.is_finite() && self.timestamp > 0.0 {
            Duration::from_secs_f64(self.timestamp)
        } else {
            Duration::ZERO
        }
    }
}

/// File-backed store for a single [`ResumeState`]
#[derive(Debug, Clone)]
pub struct ResumeStore {
    path: PathBuf,
}

impl ResumeStore {
    /// Create a store writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist the position of `song_id`, replacing any previous state
    pub fn save(&self, song_id: &TrackId, position: Duration) -> Result<ResumeState> {
        let state = ResumeState::new(song_id.clone(), position);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec(&state)?)?;

        debug!(path = %self.path.display(), song_id = %song_id, timestamp = state.timestamp, "Saved resume state");
        Ok(state)
    }

    /// Load the saved state, `None` if nothing was saved
    pub fn load(&self) -> Result<Option<ResumeState>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Forget the saved state
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
