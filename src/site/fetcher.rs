//! Album and track page fetching

use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

use super::client::HttpFetch;
use super::extract;
use super::models::AlbumInfo;
use crate::error::{Error, Result};

/// Fetches album and track pages and extracts their contents
#[derive(Clone)]
pub struct AlbumFetcher {
    http: Arc<dyn HttpFetch>,
    origin: String,
}

impl AlbumFetcher {
    /// Create a fetcher resolving relative links against `origin`
    pub fn new(http: Arc<dyn HttpFetch>, origin: &str) -> Self {
        Self {
            http,
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch an album page and extract its metadata, art candidates and tracks
    pub async fn fetch_album(&self, album_url: &str) -> Result<AlbumInfo> {
        Url::parse(album_url).map_err(|source| Error::Url {
            url: album_url.to_string(),
            source,
        })?;

        let html = self.http.get_text(album_url).await?;
        let info = extract::parse_album_page(&html, album_url, &self.origin)?;

        info!(
            "Found album \"{}\" with {} tracks and {} art candidates",
            info.title,
            info.tracks.len(),
            info.art_urls.len()
        );
        Ok(info)
    }

    /// Resolve the direct download link for a track page, `None` when the page
    /// offers no link in `format` on a known host
    pub async fn fetch_track_download_link(
        &self,
        track_page_url: &str,
        format: &str,
    ) -> Result<Option<String>> {
        let html = self.http.get_text(track_page_url).await?;
        let link = extract::find_download_link(&html, format, &self.origin);
        debug!("Download link for {}: {:?}", track_page_url, link);
        Ok(link)
    }
}
