//! Album download orchestration
//!
//! Tracks are downloaded through a bounded window of concurrent tasks. Each
//! task resolves its direct link, streams the file to disk and tags MP3s.
//! Failures stay inside their task, and every task advances the aggregate
//! counter exactly once so the run always drains to the track count.

use futures::stream::{self, StreamExt};
use indicatif::MultiProgress;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use super::downloader::{download_to_file, Timeouts};
use super::progress::{AggregateProgress, TaskProgress};
use crate::error::{Error, Result};
use crate::site::{AlbumFetcher, HttpFetch, Track};
use crate::utils::{embed_metadata, strip_leading_number, track_filename, TrackMetadata};

/// Options for an album download run
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Number of tracks downloading at once
    pub concurrency: usize,
    /// Format token looked for in track download links
    pub format: String,
    /// Longest wait for the next chunk of a track before giving up on it
    pub stall_timeout: Option<Duration>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            format: "MP3".to_string(),
            stall_timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// How a single track task ended
#[derive(Debug)]
pub enum TaskOutcome {
    /// File written; `tagged` when metadata and art were embedded
    Completed { path: PathBuf, tagged: bool },
    /// Track page had no usable download link
    Skipped,
    Failed(Error),
    /// Cancellation was requested before the task started
    Cancelled,
}

/// Summary of an album download run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub total: usize,
    pub completed: usize,
    pub tagged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled_tasks: usize,
    /// Final value of the aggregate progress counter
    pub processed: usize,
    /// Whether cancellation was requested during the run
    pub cancelled: bool,
}

impl DownloadReport {
    fn record(&mut self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Completed { tagged, .. } => {
                self.completed += 1;
                if *tagged {
                    self.tagged += 1;
                }
            }
            TaskOutcome::Skipped => self.skipped += 1,
            TaskOutcome::Failed(_) => self.failed += 1,
            TaskOutcome::Cancelled => self.cancelled_tasks += 1,
        }
    }
}

/// A dispatched track with its resolved link, destination and progress
pub struct DownloadTask<'a> {
    pub index: usize,
    pub track: &'a Track,
    pub url: String,
    pub path: PathBuf,
    pub progress: TaskProgress,
}

/// Album-wide values every task shares
struct AlbumContext<'a> {
    dest_dir: &'a Path,
    art_path: Option<&'a Path>,
    artist: &'a str,
    album: &'a str,
}

/// Downloads an album's tracks with bounded concurrency
pub struct AlbumDownloader {
    fetcher: AlbumFetcher,
    http: Arc<dyn HttpFetch>,
    options: DownloadOptions,
    cancel: CancellationToken,
    progress: MultiProgress,
}

impl AlbumDownloader {
    pub fn new(
        fetcher: AlbumFetcher,
        http: Arc<dyn HttpFetch>,
        options: DownloadOptions,
        cancel: CancellationToken,
        progress: MultiProgress,
    ) -> Self {
        Self {
            fetcher,
            http,
            options,
            cancel,
            progress,
        }
    }

    /// Download every track into `dest_dir`
    ///
    /// Tracks are dispatched in order, at most `concurrency` at a time, and
    /// may finish in any order. Cancellation stops tasks that have not started
    /// yet; tasks already downloading run to completion.
    pub async fn download_album(
        &self,
        tracks: &[Track],
        dest_dir: &Path,
        art_path: Option<&Path>,
        artist: &str,
        album: &str,
    ) -> DownloadReport {
        let aggregate = AggregateProgress::new(&self.progress, tracks.len());
        let context = AlbumContext {
            dest_dir,
            art_path,
            artist,
            album,
        };

        let outcomes: Vec<TaskOutcome> = stream::iter(tracks.iter().enumerate())
            .map(|(index, track)| {
                let aggregate = &aggregate;
                let context = &context;
                async move {
                    let outcome = self.run_task(index, track, context).await;
                    match &outcome {
                        TaskOutcome::Completed { path, .. } => {
                            debug!("Finished: {}", path.display());
                        }
                        TaskOutcome::Failed(e) => {
                            error!("Error downloading track: {} ({})", track.title, e);
                        }
                        TaskOutcome::Skipped | TaskOutcome::Cancelled => {}
                    }
                    aggregate.advance();
                    outcome
                }
            })
            .buffer_unordered(self.options.concurrency.max(1))
            .collect()
            .await;

        let mut report = DownloadReport {
            total: tracks.len(),
            processed: aggregate.processed(),
            cancelled: self.cancel.is_cancelled(),
            ..Default::default()
        };
        for outcome in &outcomes {
            report.record(outcome);
        }

        aggregate.finish(if report.cancelled { "cancelled" } else { "done" });
        info!(
            "Album finished: {} downloaded, {} skipped, {} failed, {} cancelled",
            report.completed, report.skipped, report.failed, report.cancelled_tasks
        );
        report
    }

    async fn run_task(
        &self,
        index: usize,
        track: &Track,
        context: &AlbumContext<'_>,
    ) -> TaskOutcome {
        if self.cancel.is_cancelled() {
            debug!("Cancelled before start: {}", track.title);
            return TaskOutcome::Cancelled;
        }

        let url = match self
            .fetcher
            .fetch_track_download_link(&track.page_url, &self.options.format)
            .await
        {
            Ok(Some(url)) => url,
            Ok(None) => {
                let skip = Error::LinkResolution {
                    track: track.title.clone(),
                    format: self.options.format.clone(),
                };
                warn!("Skipping track: {}", skip);
                return TaskOutcome::Skipped;
            }
            Err(e) => return TaskOutcome::Failed(e),
        };

        let extension =
            link_extension(&url).unwrap_or_else(|| self.options.format.to_lowercase());
        let filename = track_filename(index, &track.title, &extension);
        let task = DownloadTask {
            index,
            track,
            url,
            path: context.dest_dir.join(&filename),
            progress: TaskProgress::new(&self.progress, &filename),
        };

        if let Err(e) = self.fetch_file(&task).await {
            task.progress.abandon("failed");
            return TaskOutcome::Failed(e);
        }
        task.progress.finish();

        let tagged = match context.art_path {
            Some(art_path) if extension.eq_ignore_ascii_case("mp3") => {
                match embed_task_metadata(&task, art_path, context).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Could not tag {}: {}", task.path.display(), e);
                        false
                    }
                }
            }
            _ => false,
        };

        TaskOutcome::Completed {
            path: task.path,
            tagged,
        }
    }

    async fn fetch_file(&self, task: &DownloadTask<'_>) -> Result<u64> {
        let timeouts = Timeouts {
            request: None,
            stall: self.options.stall_timeout,
        };
        download_to_file(
            self.http.as_ref(),
            &task.url,
            &task.path,
            timeouts,
            &task.progress,
        )
        .await
        .map_err(|source| Error::Download {
            track: task.track.title.clone(),
            source: Box::new(source),
        })
    }
}

/// Embed tags on a blocking thread; lofty does synchronous file I/O
async fn embed_task_metadata(
    task: &DownloadTask<'_>,
    art_path: &Path,
    context: &AlbumContext<'_>,
) -> Result<()> {
    let audio_path = task.path.clone();
    let art_path = art_path.to_path_buf();
    let title = strip_leading_number(&task.track.title);
    let artist = context.artist.to_string();
    let album = context.album.to_string();
    let track_number = Track::number(task.index);

    tokio::task::spawn_blocking(move || {
        let metadata = TrackMetadata {
            title: Some(&title),
            artist: Some(&artist),
            album: Some(&album),
            track_number: Some(track_number),
        };
        embed_metadata(&audio_path, &art_path, &metadata)
    })
    .await?
}

/// Extension of the file a download URL points at
fn link_extension(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let (_, extension) = parsed.path().rsplit_once('.')?;
    (!extension.is_empty() && !extension.contains('/')).then(|| extension.to_string())
}
