/// CLI error types
use chant_core::TrackId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Song not found: {0}")]
    SongNotFound(TrackId),

    #[error("Link does not reference a song: {0}")]
    NotASongLink(String),

    #[error(transparent)]
    Core(#[from] chant_core::ChantError),

    #[error(transparent)]
    Api(#[from] chant_api_client::ApiClientError),

    #[error(transparent)]
    Audio(#[from] chant_audio_desktop::DesktopAudioError),

    #[error("Player stopped: {0}")]
    Player(#[from] chant_playback::ContextError),

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
