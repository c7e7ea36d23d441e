//! Error types for album fetching, downloading and tagging

use std::path::PathBuf;
use std::time::Duration;

/// Errors raised while fetching, downloading or tagging an album
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The album page has no recognizable tracklist table
    #[error("could not find tracklist table; tables found: {tables:?}")]
    Parse { tables: Vec<Vec<String>> },

    /// A track page has no usable direct download link
    #[error("no {format} download link found for \"{track}\"")]
    LinkResolution { track: String, format: String },

    /// A single cover art candidate could not be downloaded
    #[error("cover art candidate {url} failed: {reason}")]
    ArtDownload { url: String, reason: String },

    /// A track download failed mid-flight
    #[error("download of \"{track}\" failed: {source}")]
    Download {
        track: String,
        #[source]
        source: Box<Error>,
    },

    /// Metadata or cover art could not be written to a downloaded file
    #[error("tagging {} failed: {reason}", path.display())]
    Tagging { path: PathBuf, reason: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} stalled for more than {timeout:?}")]
    Stalled { url: String, timeout: Duration },

    #[error("invalid URL {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub fn tagging(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Tagging {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_lists_table_headers() {
        let err = Error::Parse {
            tables: vec![vec!["Name".to_string()], vec![]],
        };
        assert_eq!(
            err.to_string(),
            "could not find tracklist table; tables found: [[\"Name\"], []]"
        );
    }

    #[test]
    fn test_download_error_names_track() {
        let err = Error::Download {
            track: "Prelude".to_string(),
            source: Box::new(Error::Status {
                url: "https://example.com/a.mp3".to_string(),
                status: 404,
            }),
        };
        assert!(err.to_string().contains("\"Prelude\""));
        assert!(err.to_string().contains("HTTP 404"));
    }
}
