//! Playback URL provider backed by the presigned URL endpoint.

use std::time::Duration;

use async_trait::async_trait;
use chant_core::Locator;
use chant_playback::{PlaybackUrl, PlaybackUrlProvider, ProviderError};

use crate::client::CatalogClient;
use crate::error::ApiClientError;

#[async_trait]
impl PlaybackUrlProvider for CatalogClient {
    async fn resolve_playback_url(&self, locator: &Locator) -> Result<PlaybackUrl, ProviderError> {
        match self.presigned_url(locator.container(), locator.key()).await {
            Ok(presigned) => Ok(PlaybackUrl {
                url: presigned.url,
                expires_in: presigned.expires_in.map(Duration::from_secs),
            }),
            Err(ApiClientError::MissingUrl) => Err(ProviderError::MissingUrl),
            Err(err) => Err(ProviderError::request(err.to_string())),
        }
    }
}
