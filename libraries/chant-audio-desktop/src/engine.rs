//! Desktop playback engine

use std::time::Duration;

use async_trait::async_trait;
use chant_playback::{EngineError, EngineListener, PlaybackEngine};
use crossbeam_channel::Sender;
use reqwest::Client;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::audio_thread::{self, AudioCommand};
use crate::download::fetch_source;
use crate::error::{DesktopAudioError, Result};

/// Engine playing HTTP sources on the default output device
///
/// Sources are downloaded on the tokio runtime the engine was created on,
/// then decoded and played on a dedicated audio thread. Every source gets a
/// generation number; a download finishing after its source was replaced is
/// discarded by the audio thread.
///
/// Dropping the engine asks the audio thread to stop without waiting for it,
/// so it is safe to drop on a runtime worker.
pub struct DesktopEngine {
    commands: Sender<AudioCommand>,
    http: Client,
    runtime: Handle,
    generation: u64,
    download: Option<JoinHandle<()>>,
}

impl DesktopEngine {
    /// Open the default output device
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> Result<Self> {
        Self::with_client(Client::new())
    }

    /// Open the default output device, downloading with `http`
    pub fn with_client(http: Client) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| DesktopAudioError::NoRuntime)?;
        // Detached: the thread exits on `Shutdown` or when the sender is gone
        let (commands, _thread) = audio_thread::spawn(1.0)?;

        Ok(Self::from_parts(commands, http, runtime))
    }

    fn from_parts(commands: Sender<AudioCommand>, http: Client, runtime: Handle) -> Self {
        Self {
            commands,
            http,
            runtime,
            generation: 0,
            download: None,
        }
    }

    fn send(&self, command: AudioCommand) {
        if self.commands.send(command).is_err() {
            warn!("Audio thread stopped, dropping command");
        }
    }

    fn abort_download(&mut self) {
        if let Some(task) = self.download.take() {
            task.abort();
        }
    }
}

#[async_trait]
impl PlaybackEngine for DesktopEngine {
    fn set_source(&mut self, url: &str, listener: EngineListener) {
        self.abort_download();
        self.generation += 1;
        let generation = self.generation;
        debug!(generation, session = %listener.session(), "Attaching source");
        self.send(AudioCommand::Attach {
            generation,
            listener,
        });

        let http = self.http.clone();
        let commands = self.commands.clone();
        let url = url.to_string();
        self.download = Some(self.runtime.spawn(async move {
            let command = match fetch_source(&http, &url).await {
                Ok(source) => AudioCommand::Load { generation, source },
                Err(err) => {
                    warn!(generation, error = %err, "Source download failed");
                    AudioCommand::Fail {
                        generation,
                        message: err.to_string(),
                    }
                }
            };
            let _ = commands.send(command);
        }));
    }

    fn clear_source(&mut self) {
        self.abort_download();
        self.generation += 1;
        self.send(AudioCommand::Clear {
            generation: self.generation,
        });
    }

    async fn play(&mut self) -> std::result::Result<(), EngineError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(AudioCommand::Play { reply })
            .map_err(|_| EngineError::from(DesktopAudioError::ThreadStopped))?;

        response
            .await
            .map_err(|_| EngineError::from(DesktopAudioError::ThreadStopped))?
    }

    fn pause(&mut self) {
        self.send(AudioCommand::Pause);
    }

    fn set_current_time(&mut self, position: Duration) {
        self.send(AudioCommand::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.send(AudioCommand::Volume(volume.clamp(0.0, 1.0)));
    }
}

impl Drop for DesktopEngine {
    fn drop(&mut self) {
        self.abort_download();
        let _ = self.commands.send(AudioCommand::Shutdown);
    }
}
