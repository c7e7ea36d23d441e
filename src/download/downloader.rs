//! Streaming file downloads

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::progress::ProgressSink;
use crate::error::{Error, Result};
use crate::site::HttpFetch;

/// Limits applied to a single download
#[derive(Debug, Clone, Copy, Default)]
pub struct Timeouts {
    /// Bound on the whole request, body included
    pub request: Option<Duration>,
    /// Bound on the wait for each body chunk
    pub stall: Option<Duration>,
}

/// Stream `url` into `path`, reporting bytes to `sink`
///
/// Anything but HTTP 200 is an error and leaves no file behind. A stream that
/// fails part way has its partial file removed. Returns the bytes written.
pub async fn download_to_file(
    http: &dyn HttpFetch,
    url: &str,
    path: &Path,
    timeouts: Timeouts,
    sink: &dyn ProgressSink,
) -> Result<u64> {
    let body = http.get_stream(url, timeouts.request).await?;
    if body.status != 200 {
        return Err(Error::Status {
            url: url.to_string(),
            status: body.status,
        });
    }

    if let Some(total) = body.content_length {
        sink.set_total(total);
    }

    let result = write_stream(body.stream, url, path, timeouts.stall, sink).await;
    match &result {
        Ok(written) => debug!("Wrote {} bytes to {}", written, path.display()),
        Err(_) => {
            let _ = fs::remove_file(path).await;
        }
    }
    result
}

async fn write_stream(
    mut stream: BoxStream<'static, Result<Bytes>>,
    url: &str,
    path: &Path,
    stall: Option<Duration>,
    sink: &dyn ProgressSink,
) -> Result<u64> {
    let mut file = fs::File::create(path).await?;
    let mut written = 0u64;

    while let Some(chunk) = next_chunk(&mut stream, url, stall).await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        sink.advance(chunk.len() as u64);
    }

    file.flush().await?;
    Ok(written)
}

async fn next_chunk(
    stream: &mut BoxStream<'static, Result<Bytes>>,
    url: &str,
    stall: Option<Duration>,
) -> Result<Option<Bytes>> {
    let next = match stall {
        Some(timeout) => tokio::time::timeout(timeout, stream.next())
            .await
            .map_err(|_| Error::Stalled {
                url: url.to_string(),
                timeout,
            })?,
        None => stream.next().await,
    };
    next.transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::mock::{MockFile, MockHttp};
    use indicatif::ProgressBar;

    #[tokio::test]
    async fn test_download_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("01. Prelude.mp3");
        let http = MockHttp::new().file("https://h/a.mp3", MockFile::Body(b"0123456789".to_vec()));
        let bar = ProgressBar::hidden();

        let written = download_to_file(&http, "https://h/a.mp3", &path, Timeouts::default(), &bar)
            .await
            .unwrap();

        assert_eq!(written, 10);
        assert_eq!(bar.position(), 10);
        assert_eq!(bar.length(), Some(10));
        assert_eq!(std::fs::read(&path).unwrap(), b"0123456789");
    }

    #[tokio::test]
    async fn test_non_200_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.mp3");
        let http = MockHttp::new().file("https://h/a.mp3", MockFile::Status(403));

        let err = download_to_file(
            &http,
            "https://h/a.mp3",
            &path,
            Timeouts::default(),
            &ProgressBar::hidden(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Status { status: 403, .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_truncated_stream_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.mp3");
        let http = MockHttp::new().file("https://h/a.mp3", MockFile::Truncated(vec![1; 64]));

        let result = download_to_file(
            &http,
            "https://h/a.mp3",
            &path,
            Timeouts::default(),
            &ProgressBar::hidden(),
        )
        .await;

        assert!(matches!(result, Err(Error::Io(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_stalled_stream_times_out_and_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stalled.mp3");
        let http = MockHttp::new().file("https://h/a.mp3", MockFile::Stalled(vec![1; 16]));
        let timeouts = Timeouts {
            request: None,
            stall: Some(Duration::from_millis(100)),
        };
        let bar = ProgressBar::hidden();

        let result = download_to_file(&http, "https://h/a.mp3", &path, timeouts, &bar).await;

        match result {
            Err(Error::Stalled { url, timeout }) => {
                assert_eq!(url, "https://h/a.mp3");
                assert_eq!(timeout, Duration::from_millis(100));
            }
            other => panic!("expected stall, got {other:?}"),
        }
        assert_eq!(bar.position(), 16);
        assert!(!path.exists());
    }
}
