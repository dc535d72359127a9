//! Desktop engine errors

use thiserror::Error;

use chant_playback::EngineError;

/// Result type for desktop audio operations
pub type Result<T> = std::result::Result<T, DesktopAudioError>;

/// Desktop audio errors
#[derive(Debug, Error)]
pub enum DesktopAudioError {
    /// No output device could be opened
    #[error("Failed to open audio output: {0}")]
    Output(String),

    /// The engine was created outside a tokio runtime
    #[error("Desktop engine requires a tokio runtime")]
    NoRuntime,

    /// Source download failed
    #[error("Download failed: {0}")]
    Download(#[from] reqwest::Error),

    /// Source server answered with an error status
    #[error("Download failed with status {0}")]
    DownloadStatus(u16),

    /// Source could not be decoded
    #[error("Unsupported or corrupt audio: {0}")]
    Decode(String),

    /// The audio thread is gone
    #[error("Audio thread stopped")]
    ThreadStopped,
}

impl From<rodio::decoder::DecoderError> for DesktopAudioError {
    fn from(err: rodio::decoder::DecoderError) -> Self {
        DesktopAudioError::Decode(err.to_string())
    }
}

impl From<DesktopAudioError> for EngineError {
    fn from(err: DesktopAudioError) -> Self {
        EngineError::Output(err.to_string())
    }
}
