//! Catalog API client.

use std::time::Duration;

use chant_core::{Track, TrackId};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::error::{ApiClientError, Result};
use crate::types::{ApiConfig, ApiErrorBody, PresignedUrl, PresignedUrlRequest, SongInput};

/// Attempts made by `update_song_with_retry` by default.
pub const DEFAULT_UPDATE_ATTEMPTS: u32 = 3;

/// Client for the catalog REST API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    endpoint: String,
    retry_base_delay: Duration,
}

impl CatalogClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(ApiClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let endpoint = config.endpoint.trim().trim_end_matches('/').to_string();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ApiClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&endpoint).map_err(|e| ApiClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("ChantPlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            retry_base_delay: config.retry_base_delay,
        })
    }

    /// Normalized API endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// List every song in the catalog, in API order.
    pub async fn list_songs(&self) -> Result<Vec<Track>> {
        let url = format!("{}/songs", self.endpoint);
        debug!(url = %url, "Fetching songs");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let songs: Vec<Track> = handle_response(response, "song list").await?;

        debug!(songs = songs.len(), "Fetched songs");
        Ok(songs)
    }

    /// Get a single song by ID.
    pub async fn get_song(&self, song_id: &TrackId) -> Result<Track> {
        let url = format!("{}/songs/{}", self.endpoint, song_id);
        debug!(url = %url, song_id = %song_id, "Fetching song");

        let response = self.http.get(&url).send().await?;
        handle_response(response, "song").await
    }

    /// Create a song; the API assigns the ID.
    pub async fn create_song(&self, song: &SongInput) -> Result<Track> {
        let url = format!("{}/songs", self.endpoint);
        debug!(url = %url, title = %song.title, "Creating song");

        let response = self.http.post(&url).json(song).send().await?;
        let created: Track = handle_response(response, "created song").await?;

        info!(song_id = %created.id, "Created song");
        Ok(created)
    }

    /// Replace a song's fields.
    pub async fn update_song(&self, song_id: &TrackId, song: &SongInput) -> Result<Track> {
        let url = format!("{}/songs/{}", self.endpoint, song_id);
        debug!(url = %url, song_id = %song_id, "Updating song");

        let response = self.http.put(&url).json(song).send().await?;
        handle_response(response, "updated song").await
    }

    /// Delete a song.
    pub async fn delete_song(&self, song_id: &TrackId) -> Result<()> {
        let url = format!("{}/songs/{}", self.endpoint, song_id);
        debug!(url = %url, song_id = %song_id, "Deleting song");

        let response = self.http.delete(&url).send().await?;
        if response.status().is_success() {
            info!(song_id = %song_id, "Deleted song");
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Update a song, retrying on concurrent-modification conflicts (409).
    ///
    /// Makes at most `max_attempts` requests. Before attempt `n + 1` it
    /// waits `retry_base_delay * 2^n`. Any other error is returned at once.
    pub async fn update_song_with_retry(
        &self,
        song_id: &TrackId,
        song: &SongInput,
        max_attempts: u32,
    ) -> Result<Track> {
        let mut retries = 0;

        loop {
            match self.update_song(song_id, song).await {
                Ok(track) => return Ok(track),
                Err(err) if err.is_conflict() && retries + 1 < max_attempts => {
                    retries += 1;
                    let delay = backoff_delay(self.retry_base_delay, retries);
                    warn!(
                        song_id = %song_id,
                        attempt = retries,
                        delay_ms = delay.as_millis() as u64,
                        "Update conflicted, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Request a time-limited download URL for a stored object.
    pub async fn presigned_url(&self, bucket: &str, key: &str) -> Result<PresignedUrl> {
        let url = format!("{}/presigned-url", self.endpoint);
        debug!(url = %url, bucket = %bucket, key = %key, "Requesting presigned URL");

        let response = self
            .http
            .post(&url)
            .json(&PresignedUrlRequest { bucket, key })
            .send()
            .await?;
        let presigned: PresignedUrl = handle_response(response, "presigned URL").await?;

        if presigned.url.is_empty() {
            return Err(ApiClientError::MissingUrl);
        }
        Ok(presigned)
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    response
        .json()
        .await
        .map_err(|e| ApiClientError::ParseError(format!("Failed to parse {what} response: {e}")))
}

async fn error_from_response(response: Response) -> ApiClientError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) => ApiClientError::Api {
            status,
            error: body.error,
            code: body.code,
        },
        Err(_) => ApiClientError::ServerError {
            status,
            message: text,
        },
    }
}

/// `base * 2^retry`, saturating instead of overflowing
fn backoff_delay(base: Duration, retry: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(retry))
}
