//! Chant Player API Client
//!
//! HTTP client library for the Chant Player catalog API.
//!
//! # Features
//!
//! - **Catalog**: list, fetch, create, update and delete songs
//! - **Conflict retry**: `update_song_with_retry` backs off on HTTP 409
//! - **Playback URLs**: presigned download URLs, also exposed as a
//!   `chant_playback::PlaybackUrlProvider`
//!
//! # Example
//!
//! ```ignore
//! use chant_api_client::{ApiConfig, CatalogClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CatalogClient::new(ApiConfig::new("https://api.example.com"))?;
//!
//!     let songs = client.list_songs().await?;
//!     println!("Found {} songs", songs.len());
//!
//!     let url = client.presigned_url("chants", "kyrie.mp3").await?;
//!     println!("Stream from {}", url.url);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod provider;
mod types;

pub use client::{CatalogClient, DEFAULT_UPDATE_ATTEMPTS};
pub use error::{ApiClientError, Result};
pub use types::{ApiConfig, PresignedUrl, PresignedUrlRequest, SongInput};
