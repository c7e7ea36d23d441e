//! Interactive prompts for values missing from flags and environment

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input};
use std::path::PathBuf;

/// Album URL from the flag, or asked for; `None` when left empty
pub fn album_url(url: Option<String>) -> Result<Option<String>> {
    let url = match url {
        Some(url) => url,
        None => Input::<String>::new()
            .with_prompt("Album URL")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read album URL")?,
    };
    Ok(non_empty(url))
}

/// Destination folder from the flag, or asked for
///
/// An empty answer falls back to the current directory after confirmation.
/// `None` means the user declined.
pub fn destination_folder(folder: Option<String>) -> Result<Option<PathBuf>> {
    let folder = match folder {
        Some(folder) => folder,
        None => Input::<String>::new()
            .with_prompt("Download folder (empty for current directory)")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read download folder")?,
    };

    if let Some(folder) = non_empty(folder) {
        return Ok(Some(PathBuf::from(folder)));
    }

    let current = std::env::current_dir().context("Failed to read current directory")?;
    let confirmed = Confirm::new()
        .with_prompt(format!("Download into {}?", current.display()))
        .default(true)
        .interact()
        .context("Failed to read confirmation")?;

    Ok(confirmed.then_some(current))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_value_skips_prompt() {
        let url = album_url(Some(" https://h/album/x ".to_string())).unwrap();
        assert_eq!(url.as_deref(), Some("https://h/album/x"));

        let folder = destination_folder(Some("/music".to_string())).unwrap();
        assert_eq!(folder, Some(PathBuf::from("/music")));
    }

    #[test]
    fn test_blank_flag_value_is_empty() {
        assert_eq!(album_url(Some("   ".to_string())).unwrap(), None);
    }
}
