//! Audio thread
//!
//! Owns the rodio output stream for the whole engine lifetime. The stream
//! never leaves this thread; everything else talks to it through
//! [`AudioCommand`]s.

use std::io::Cursor;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chant_playback::{EngineError, EngineEvent, EngineListener};
use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};

use crate::error::{DesktopAudioError, Result};

/// Interval between position reports while playing
const TICK: Duration = Duration::from_millis(250);

type SourceBytes = Arc<[u8]>;

pub(crate) enum AudioCommand {
    /// New source requested; its bytes follow in `Load` or `Fail`
    Attach {
        generation: u64,
        listener: EngineListener,
    },
    Load {
        generation: u64,
        source: SourceBytes,
    },
    Fail {
        generation: u64,
        message: String,
    },
    Clear {
        generation: u64,
    },
    Play {
        reply: oneshot::Sender<std::result::Result<(), EngineError>>,
    },
    Pause,
    Seek(Duration),
    Volume(f32),
    Shutdown,
}

/// Start the audio thread and wait until the output device is open
pub(crate) fn spawn(volume: f32) -> Result<(Sender<AudioCommand>, JoinHandle<()>)> {
    let (commands_tx, commands_rx) = unbounded();
    let (ready_tx, ready_rx) = bounded(1);

    let handle = thread::Builder::new()
        .name("chant-audio".into())
        .spawn(move || {
            let mut stream = match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => stream,
                Err(err) => {
                    let _ = ready_tx.send(Err(DesktopAudioError::Output(err.to_string())));
                    return;
                }
            };
            // rodio logs to stderr when the stream is dropped
            stream.log_on_drop(false);
            let _ = ready_tx.send(Ok(()));

            AudioThread::new(stream, volume).run(&commands_rx);
        })
        .map_err(|e| DesktopAudioError::Output(e.to_string()))?;

    ready_rx
        .recv()
        .map_err(|_| DesktopAudioError::ThreadStopped)??;

    info!("Audio output opened");
    Ok((commands_tx, handle))
}

/// Open a decoder over in-memory source bytes
pub(crate) fn decode(source: &SourceBytes) -> Result<Decoder<Cursor<SourceBytes>>> {
    Ok(Decoder::new(Cursor::new(Arc::clone(source)))?)
}

struct AudioThread {
    stream: OutputStream,
    sink: Option<Sink>,
    source: Option<SourceBytes>,
    listener: Option<EngineListener>,
    generation: u64,
    /// Position the current sink started from
    offset: Duration,
    playing: bool,
    volume: f32,
}

impl AudioThread {
    fn new(stream: OutputStream, volume: f32) -> Self {
        Self {
            stream,
            sink: None,
            source: None,
            listener: None,
            generation: 0,
            offset: Duration::ZERO,
            playing: false,
            volume,
        }
    }

    fn run(mut self, commands: &Receiver<AudioCommand>) {
        loop {
            match commands.recv_timeout(TICK) {
                Ok(AudioCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Ok(command) => self.handle(command),
                Err(RecvTimeoutError::Timeout) => self.tick(),
            }
        }

        self.stop();
        debug!("Audio thread stopped");
    }

    fn handle(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::Attach {
                generation,
                listener,
            } => {
                self.stop();
                self.generation = generation;
                self.listener = Some(listener);
            }
            AudioCommand::Clear { generation } => {
                self.stop();
                self.generation = generation;
                self.listener = None;
            }
            AudioCommand::Load { generation, source } => {
                if generation == self.generation {
                    self.load(source);
                } else {
                    trace!(generation, current = self.generation, "Dropping superseded source");
                }
            }
            AudioCommand::Fail {
                generation,
                message,
            } => {
                if generation == self.generation {
                    self.emit(EngineEvent::Error(message));
                }
            }
            AudioCommand::Play { reply } => {
                let _ = reply.send(self.play());
            }
            AudioCommand::Pause => self.pause(),
            AudioCommand::Seek(position) => self.seek(position),
            AudioCommand::Volume(volume) => {
                self.volume = volume;
                if let Some(sink) = &self.sink {
                    sink.set_volume(volume);
                }
            }
            AudioCommand::Shutdown => {}
        }
    }

    fn load(&mut self, source: SourceBytes) {
        match self.build_sink(&source, Duration::ZERO) {
            Ok((sink, duration)) => {
                debug!(bytes = source.len(), duration = ?duration, "Source ready");
                self.sink = Some(sink);
                self.source = Some(source);
                self.offset = Duration::ZERO;
                if let Some(duration) = duration {
                    self.emit(EngineEvent::DurationKnown(duration));
                }
                self.emit(EngineEvent::CanPlay);
            }
            Err(err) => {
                warn!(error = %err, "Failed to decode source");
                self.emit(EngineEvent::Error(err.to_string()));
            }
        }
    }

    fn play(&mut self) -> std::result::Result<(), EngineError> {
        if self.source.is_none() {
            return Err(EngineError::NoSource);
        }
        if self.sink.as_ref().map_or(true, Sink::empty) {
            // Drained sink (end of media): start over
            self.rebuild(Duration::ZERO)?;
        }

        if let Some(sink) = &self.sink {
            sink.play();
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
        self.playing = false;
        let position = self.position();
        self.emit(EngineEvent::TimeUpdate(position));
    }

    /// Rebuild the sink at `position` (rodio sources only skip forward)
    fn seek(&mut self, position: Duration) {
        if self.source.is_none() {
            return;
        }

        match self.rebuild(position) {
            Ok(()) => {
                if self.playing {
                    if let Some(sink) = &self.sink {
                        sink.play();
                    }
                }
                self.emit(EngineEvent::TimeUpdate(position));
            }
            Err(err) => {
                warn!(error = %err, "Seek failed");
                self.emit(EngineEvent::Error(err.to_string()));
            }
        }
    }

    fn rebuild(&mut self, position: Duration) -> std::result::Result<(), EngineError> {
        let source = self.source.clone().ok_or(EngineError::NoSource)?;
        if let Some(old) = self.sink.take() {
            old.stop();
        }

        let (sink, _) = self.build_sink(&source, position)?;
        self.sink = Some(sink);
        self.offset = position;
        Ok(())
    }

    fn build_sink(&self, source: &SourceBytes, start: Duration) -> Result<(Sink, Option<Duration>)> {
        let decoder = decode(source)?;
        let duration = decoder.total_duration();

        let sink = Sink::connect_new(self.stream.mixer());
        sink.pause();
        sink.set_volume(self.volume);
        sink.append(decoder.skip_duration(start));
        Ok((sink, duration))
    }

    fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let Some(sink) = &self.sink else {
            return;
        };

        if sink.empty() {
            self.playing = false;
            self.emit(EngineEvent::Ended);
        } else {
            let position = self.position();
            self.emit(EngineEvent::TimeUpdate(position));
        }
    }

    fn position(&self) -> Duration {
        self.offset + self.sink.as_ref().map_or(Duration::ZERO, Sink::get_pos)
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.source = None;
        self.offset = Duration::ZERO;
        self.playing = false;
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(listener) = &self.listener {
            if !listener.emit(event) {
                trace!("Player gone, dropping engine event");
            }
        }
    }
}
