//! Interactive playback session on the default audio device

use std::sync::Arc;
use std::time::Duration;

use chant_api_client::CatalogClient;
use chant_audio_desktop::DesktopEngine;
use chant_core::{ResumeStore, Track};
use chant_playback::{
    PlaybackNotification, PlaybackUrlProvider, PlayerService, PlayerSnapshot, SelectionContext,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::config::CliConfig;
use crate::error::Result;
use crate::keys::{parse_key, step_volume, Key, HELP};

/// What to start playing
pub struct Start {
    pub track: Arc<Track>,
    /// Resume from this position instead of the beginning
    pub offset: Option<Duration>,
}

/// Play `start` and hand control to the keyboard until the user quits
pub async fn run(
    config: &CliConfig,
    client: CatalogClient,
    catalog: Vec<Arc<Track>>,
    start: Start,
) -> Result<()> {
    let engine = DesktopEngine::new()?;
    let provider: Arc<dyn PlaybackUrlProvider> = Arc::new(client);
    let (context, handle) = PlayerService::spawn(engine, provider, config.player_config());
    let store = ResumeStore::new(&config.resume.path);

    context.set_catalog(catalog)?;
    match start.offset {
        Some(offset) => {
            info!(song_id = %start.track.id, offset = ?offset, "Resuming");
            context.resume(start.track, offset)?;
        }
        None => {
            context.select_track(Some(start.track))?;
            context.request_play()?;
        }
    }

    println!("{HELP}");
    let outcome = interact(&context, &store).await;

    let snapshot = context.snapshot();
    save_position(&store, snapshot.selected.as_deref(), snapshot.position);
    let _ = context.shutdown();
    let _ = handle.await;
    outcome
}

async fn interact(context: &SelectionContext, store: &ResumeStore) -> Result<()> {
    let mut notifications = context.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                match parse_key(&line) {
                    Some(Key::Quit) => break,
                    Some(key) => apply(context, key)?,
                    None => println!("Unknown key (h for help)"),
                }
            }
            notification = notifications.recv() => match notification {
                Ok(notification) => report(&notification, context, store),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "Notifications lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}

fn apply(context: &SelectionContext, key: Key) -> Result<()> {
    match key {
        Key::TogglePlay => context.toggle_play_pause()?,
        Key::Seek(target) => context.seek_to(target)?,
        Key::VolumeUp | Key::VolumeDown => {
            let level = step_volume(context.snapshot().volume, key);
            context.set_volume(level)?;
        }
        Key::ToggleMute => context.toggle_mute()?,
        Key::Next => context.skip_next()?,
        Key::Previous => context.skip_previous()?,
        Key::CycleLoop => context.set_loop_mode(context.snapshot().loop_mode.next())?,
        Key::Retry => context.retry()?,
        Key::Status => println!("{}", format_status(&context.snapshot())),
        Key::Help => println!("{HELP}"),
        Key::Quit => {}
    }
    Ok(())
}

fn report(notification: &PlaybackNotification, context: &SelectionContext, store: &ResumeStore) {
    match notification {
        PlaybackNotification::TrackChanged { track_id: Some(_) } => {
            if let Some(track) = context.selected_track() {
                println!("Selected: {}", format_track(&track));
            }
        }
        PlaybackNotification::Playing { position, .. } => {
            println!("Playing from {}", format_time(*position));
        }
        PlaybackNotification::Paused { position } => {
            println!("Paused at {}", format_time(*position));
            save_position(store, context.selected_track().as_deref(), *position);
        }
        PlaybackNotification::Ended { track_id } => println!("Finished {track_id}"),
        PlaybackNotification::VolumeChanged { level, muted } => {
            println!("Volume {level}%{}", if *muted { " (muted)" } else { "" });
        }
        PlaybackNotification::LoopModeChanged { mode } => println!("Loop: {mode:?}"),
        PlaybackNotification::Error { message, error } => {
            let hint = if error.as_ref().is_some_and(|e| e.needs_user_gesture()) {
                " (press enter to start)"
            } else {
                " (r to retry)"
            };
            println!("Error: {message}{hint}");
        }
        PlaybackNotification::TrackChanged { track_id: None }
        | PlaybackNotification::StateChanged { .. }
        | PlaybackNotification::PositionUpdate { .. } => {}
    }
}

fn save_position(store: &ResumeStore, track: Option<&Track>, position: Duration) {
    let Some(track) = track else {
        return;
    };
    match store.save(&track.id, position) {
        Ok(_) => debug!(song_id = %track.id, position = ?position, "Resume state saved"),
        Err(err) => warn!(error = %err, "Failed to save resume state"),
    }
}

/// One-line listing of a track
pub fn format_track(track: &Track) -> String {
    let mut line = format!("[{}] {} - {}", track.id, track.title, track.artist);
    if let Some(album) = &track.album {
        line.push_str(&format!(" ({album})"));
    }
    line
}

/// `m:ss`
pub fn format_time(position: Duration) -> String {
    let seconds = position.as_secs();
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_status(snapshot: &PlayerSnapshot) -> String {
    let title = snapshot
        .selected
        .as_ref()
        .map_or_else(|| "nothing selected".to_string(), |t| t.title.clone());
    let duration = snapshot
        .duration
        .map_or_else(|| "--:--".to_string(), format_time);

    format!(
        "{title} | {:?} | {} / {duration} | vol {}%{} | loop {:?}",
        snapshot.status,
        format_time(snapshot.position),
        snapshot.volume,
        if snapshot.muted { " muted" } else { "" },
        snapshot.loop_mode,
    )
}
