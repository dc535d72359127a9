//! Source download

use std::sync::Arc;

use reqwest::Client;
use tracing::debug;

use crate::error::{DesktopAudioError, Result};

/// Fetch the whole source into memory
///
/// Signed URLs expire, so the body is fetched once and seeking works on the
/// in-memory copy.
pub async fn fetch_source(http: &Client, url: &str) -> Result<Arc<[u8]>> {
    debug!(url = %url, "Downloading source");

    let response = http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DesktopAudioError::DownloadStatus(status.as_u16()));
    }

    let bytes = response.bytes().await?;
    debug!(url = %url, bytes = bytes.len(), "Source downloaded");
    Ok(Arc::from(bytes.as_ref()))
}
