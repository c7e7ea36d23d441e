//! Per-track and aggregate progress state

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Maximum characters of a filename shown next to its progress bar
const BAR_LABEL_WIDTH: usize = 36;

/// Receives byte progress from a streaming download
pub trait ProgressSink: Send + Sync {
    /// Total size, when the server announced one
    fn set_total(&self, total: u64);
    /// `bytes` more were written
    fn advance(&self, bytes: u64);
}

impl ProgressSink for ProgressBar {
    fn set_total(&self, total: u64) {
        self.set_length(total);
    }

    fn advance(&self, bytes: u64) {
        self.inc(bytes);
    }
}

/// Byte progress owned by a single download task
pub struct TaskProgress {
    downloaded: AtomicU64,
    total: AtomicU64,
    bar: ProgressBar,
}

impl TaskProgress {
    /// Attach a byte progress bar for `filename` to the display
    pub fn new(multi: &MultiProgress, filename: &str) -> Self {
        let bar = multi.add(ProgressBar::new(0));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg:<36} [{bar:30.cyan/blue}] {bytes}/{total_bytes} {bytes_per_sec}")
                .expect("progress template is valid")
                .progress_chars("#>-"),
        );
        bar.set_message(filename.chars().take(BAR_LABEL_WIDTH).collect::<String>());

        Self {
            downloaded: AtomicU64::new(0),
            total: AtomicU64::new(0),
            bar,
        }
    }

    pub fn downloaded(&self) -> u64 {
        self.downloaded.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Mark the bar complete, filling it when no length was announced
    pub fn finish(&self) {
        let downloaded = self.downloaded();
        if self.total() == 0 {
            self.bar.set_length(downloaded);
        }
        self.bar.set_position(downloaded);
        self.bar.finish();
    }

    pub fn abandon(&self, reason: &str) {
        self.bar.abandon_with_message(reason.to_string());
    }
}

impl ProgressSink for TaskProgress {
    fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.bar.set_length(total);
    }

    fn advance(&self, bytes: u64) {
        self.downloaded.fetch_add(bytes, Ordering::Relaxed);
        self.bar.inc(bytes);
    }
}

/// Count of finished tasks across the whole album
///
/// Every task advances it exactly once, whether it completed, was skipped,
/// failed or was cancelled, so it always ends at the track count.
pub struct AggregateProgress {
    processed: AtomicUsize,
    bar: ProgressBar,
}

impl AggregateProgress {
    pub fn new(multi: &MultiProgress, total: usize) -> Self {
        let bar = multi.add(ProgressBar::new(total as u64));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} Downloaded [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("progress template is valid")
                .progress_chars("#>-"),
        );

        Self {
            processed: AtomicUsize::new(0),
            bar,
        }
    }

    /// Record one finished task and return the new count
    pub fn advance(&self) -> usize {
        self.bar.inc(1);
        self.processed.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}
