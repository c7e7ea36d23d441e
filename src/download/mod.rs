//! Track downloading, cover art resolution and progress reporting

pub mod art;
pub mod downloader;
pub mod engine;
pub mod progress;

pub use art::resolve_cover_art;
pub use engine::{AlbumDownloader, DownloadOptions, DownloadReport};
