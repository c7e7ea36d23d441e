//! Utility functions

mod sanitize;
pub mod tagging;
pub mod term_log;

pub use sanitize::{clean_album_title, safe_foldername, strip_leading_number, track_filename};
pub use tagging::{embed_metadata, TrackMetadata};
pub use term_log::{set_progress_target, ProgressAwareWriter};
