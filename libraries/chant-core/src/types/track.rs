/// Track domain type
use serde::{Deserialize, Serialize};

use crate::types::TrackId;

/// Audio track as listed by the catalog API
///
/// Tracks are immutable once fetched. The playback side shares them as
/// `Arc<Track>` instead of copying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    #[serde(rename = "song_id")]
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Performing artist
    pub artist: String,

    /// Album name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    /// Composer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer: Option<String>,

    /// Recording or release date, free-form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Transmission lineage of the chant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineage: Option<String>,

    /// Storage locator of the audio object (e.g. `s3://bucket/key.mp3`)
    #[serde(rename = "s3_uri")]
    pub locator: String,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            composer: None,
            date: None,
            lineage: None,
            locator: locator.into(),
        }
    }

    /// Set the album name
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Set the composer
    pub fn with_composer(mut self, composer: impl Into<String>) -> Self {
        self.composer = Some(composer.into());
        self
    }

    /// Whether two tracks point at the same stored audio object
    pub fn same_audio(&self, other: &Track) -> bool {
        self.locator == other.locator
    }
}
