//! Cover art resolution

use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::downloader::{download_to_file, Timeouts};
use crate::error::Error;
use crate::site::HttpFetch;

/// Download the first candidate that succeeds to `dest_dir/album_art_{index}.jpg`
///
/// Candidates are tried in order, each request bounded by `timeout`. Failed
/// candidates are logged and skipped; `None` means no cover could be fetched.
pub async fn resolve_cover_art(
    http: &dyn HttpFetch,
    candidates: &[String],
    dest_dir: &Path,
    timeout: Duration,
) -> Option<PathBuf> {
    let timeouts = Timeouts {
        request: Some(timeout),
        stall: None,
    };

    for (index, url) in candidates.iter().enumerate() {
        let path = dest_dir.join(format!("album_art_{index}.jpg"));

        match download_to_file(http, url, &path, timeouts, &ProgressBar::hidden()).await {
            Ok(bytes) => {
                info!("Cover art: {} ({} bytes)", url, bytes);
                return Some(path);
            }
            Err(e) => {
                let failure = Error::ArtDownload {
                    url: url.clone(),
                    reason: e.to_string(),
                };
                debug!("{}", failure);
            }
        }
    }

    warn!("No cover art could be downloaded, tracks will not have embedded art");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::mock::{MockFile, MockHttp};

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn candidates() -> Vec<String> {
        vec![
            "https://vgmtreasurechest.com/soundtracks/x/Cover.jpg".to_string(),
            "https://vgmtreasurechest.com/soundtracks/x/Cover.png".to_string(),
            "https://vgmsite.com/soundtracks/x/0%20-%20cover.png".to_string(),
            "https://downloads.khinsider.com/images/albums/x/a.jpg".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_third_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let urls = candidates();
        let http = MockHttp::new()
            .file(&urls[0], MockFile::Status(404))
            .file(&urls[1], MockFile::ConnectionRefused)
            .file(&urls[2], MockFile::Body(b"png bytes".to_vec()))
            .file(&urls[3], MockFile::Body(b"never fetched".to_vec()));

        let path = resolve_cover_art(&http, &urls, dir.path(), TIMEOUT).await;

        assert_eq!(path, Some(dir.path().join("album_art_2.jpg")));
        assert_eq!(std::fs::read(dir.path().join("album_art_2.jpg")).unwrap(), b"png bytes");
        let written: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(written.len(), 1);
        assert_eq!(http.requested_streams(), urls[..3].to_vec());
    }

    #[tokio::test]
    async fn test_all_candidates_fail() {
        let dir = tempfile::tempdir().unwrap();
        let urls = candidates();
        let http = MockHttp::new().file(&urls[3], MockFile::Truncated(vec![0; 8]));

        let path = resolve_cover_art(&http, &urls, dir.path(), TIMEOUT).await;

        assert_eq!(path, None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let http = MockHttp::new();
        assert_eq!(resolve_cover_art(&http, &[], dir.path(), TIMEOUT).await, None);
    }
}
