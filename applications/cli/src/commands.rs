//! Subcommand implementations

use std::sync::Arc;
use std::time::Duration;

use chant_api_client::CatalogClient;
use chant_core::{catalog, parse_song_link, song_link, ResumeStore, Track, TrackId};
use tracing::info;

use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::session::{self, format_track, Start};

/// Print the catalog, optionally filtered
pub async fn list(config: &CliConfig, search: Option<&str>) -> Result<()> {
    let client = CatalogClient::new(config.api_config())?;
    let songs = client.list_songs().await?;

    let matches = catalog::search(&songs, search.unwrap_or(""));
    if matches.is_empty() {
        println!("No songs found");
    }
    for track in matches {
        println!("{}", format_track(track));
    }
    Ok(())
}

/// Play a song from the catalog
pub async fn play(config: &CliConfig, song_id: &TrackId, at: Option<Duration>) -> Result<()> {
    let client = CatalogClient::new(config.api_config())?;
    let songs = load_catalog(&client).await?;
    let track = lookup(&songs, song_id)?;

    session::run(config, client, songs, Start { track, offset: at }).await
}

/// Continue where the last session stopped
pub async fn resume(config: &CliConfig) -> Result<()> {
    let store = ResumeStore::new(&config.resume.path);
    let Some(state) = store.load()? else {
        println!("Nothing to resume");
        return Ok(());
    };
    info!(song_id = %state.song_id, timestamp = state.timestamp, "Found resume state");

    let client = CatalogClient::new(config.api_config())?;
    let songs = load_catalog(&client).await?;
    let track = match lookup(&songs, &state.song_id) {
        Ok(track) => track,
        Err(err) => {
            // The song is gone from the catalog; forget it
            store.clear()?;
            return Err(err);
        }
    };

    let start = Start {
        track,
        offset: Some(state.position()),
    };
    session::run(config, client, songs, start).await
}

/// Print a share link
pub fn share(config: &CliConfig, song_id: &TrackId, at: Option<Duration>) -> Result<()> {
    let link = song_link(&config.share.base_url, song_id, at)?;
    println!("{link}");
    Ok(())
}

/// Play the song a share link points at
pub async fn open(config: &CliConfig, link: &str) -> Result<()> {
    let song = parse_song_link(link)?.ok_or_else(|| CliError::NotASongLink(link.to_string()))?;
    play(config, &song.song_id, song.timestamp).await
}

async fn load_catalog(client: &CatalogClient) -> Result<Vec<Arc<Track>>> {
    let songs = client.list_songs().await?;
    info!(count = songs.len(), "Catalog loaded");
    Ok(songs.into_iter().map(Arc::new).collect())
}

fn lookup(songs: &[Arc<Track>], song_id: &TrackId) -> Result<Arc<Track>> {
    catalog::find(songs, song_id)
        .cloned()
        .ok_or_else(|| CliError::SongNotFound(song_id.clone()))
}
