//! User configuration persistence
//!
//! Optional defaults live in ~/.config/vgmdl/config.json. Every field can be
//! omitted, and command line flags take precedence over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::download::DownloadOptions;
use crate::site::DEFAULT_SITE_ORIGIN;

/// Persistent download defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of tracks downloaded at once
    pub parallel: usize,
    /// Format token matched in track download links
    pub format: String,
    /// User-agent sent with every request
    pub user_agent: String,
    /// Origin used to absolutize relative links
    pub site_origin: String,
    /// Per-candidate cover art request timeout
    pub art_timeout_secs: u64,
    /// Longest wait for the next chunk of a track, 0 to wait forever
    pub stall_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parallel: 4,
            format: "MP3".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            art_timeout_secs: 10,
            stall_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Load the config from the user's config directory, defaults if absent
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("Could not determine config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load the config from `path`, defaults if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let config: Self =
            serde_json::from_str(&contents).with_context(|| "Failed to parse config")?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vgmdl").join("config.json"))
    }

    pub fn art_timeout(&self) -> Duration {
        Duration::from_secs(self.art_timeout_secs)
    }

    /// Options for the album downloader
    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            concurrency: self.parallel.max(1),
            format: self.format.clone(),
            stall_timeout: (self.stall_timeout_secs > 0)
                .then(|| Duration::from_secs(self.stall_timeout_secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "parallel": 8, "stall_timeout_secs": 0 }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.parallel, 8);
        assert_eq!(config.format, "MP3");

        let options = config.download_options();
        assert_eq!(options.concurrency, 8);
        assert_eq!(options.stall_timeout, None);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_zero_parallel_is_clamped() {
        let config = Config {
            parallel: 0,
            ..Config::default()
        };
        assert_eq!(config.download_options().concurrency, 1);
    }
}
