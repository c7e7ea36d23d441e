//! Filename and title cleanup utilities

use regex::Regex;
use std::sync::LazyLock;

/// Characters that are unsafe in filenames on at least one major platform
const UNSAFE_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

static YEAR_SUFFIXED_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?\(\d{4}\))").expect("static regex is valid"));

static LEADING_TRACK_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*[.\-]?\s*").expect("static regex is valid"));

/// Sanitize a track title for use as a filename
///
/// Strips unsafe characters and turns literal `%20` and `_` into spaces.
pub fn safe_filename(name: &str) -> String {
    strip_unsafe(name)
        .replace("%20", " ")
        .replace('_', " ")
        .trim()
        .to_string()
}

/// Sanitize an album title for use as a folder name
pub fn safe_foldername(name: &str) -> String {
    strip_unsafe(name).trim().to_string()
}

/// Shorten a page title to the album name
///
/// Keeps everything up to and including the first `(YYYY)` group, otherwise
/// the part before the first dash.
pub fn clean_album_title(title: &str) -> String {
    if let Some(captures) = YEAR_SUFFIXED_TITLE.captures(title) {
        return captures[1].to_string();
    }
    title.split('-').next().unwrap_or_default().trim().to_string()
}

/// Remove a leading track number such as `01 `, `1. ` or `12 - `
pub fn strip_leading_number(title: &str) -> String {
    LEADING_TRACK_NUMBER.replace(title, "").trim().to_string()
}

/// Destination filename for the track at 0-based `index`
pub fn track_filename(index: usize, title: &str, extension: &str) -> String {
    format!("{:02}. {}.{}", index + 1, safe_filename(title), extension)
}

fn strip_unsafe(name: &str) -> String {
    name.chars().filter(|c| !UNSAFE_CHARS.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filename_strips_unsafe_chars() {
        assert_eq!(safe_filename(r#"What? <A> "B" C:D|E*F/G\H"#), "What A B CDEFGH");
    }

    #[test]
    fn test_safe_filename_spaces() {
        assert_eq!(safe_filename("Boss_Battle%20Theme"), "Boss Battle Theme");
        assert_eq!(safe_filename("  Title  "), "Title");
    }

    #[test]
    fn test_safe_foldername_keeps_underscores() {
        assert_eq!(safe_foldername("Mega_Man: X "), "Mega_Man X");
    }

    #[test]
    fn test_track_filename_prefix() {
        assert_eq!(track_filename(0, "Opening", "mp3"), "01. Opening.mp3");
        assert_eq!(track_filename(9, "Ending", "ogg"), "10. Ending.ogg");
        assert_eq!(track_filename(99, "Extra", "mp3"), "100. Extra.mp3");
    }

    #[test]
    fn test_clean_album_title_with_year() {
        assert_eq!(
            clean_album_title("Chrono Trigger (1995) - Download Soundtrack"),
            "Chrono Trigger (1995)"
        );
    }

    #[test]
    fn test_clean_album_title_without_year() {
        assert_eq!(
            clean_album_title("Undertale Soundtrack - Download"),
            "Undertale Soundtrack"
        );
        assert_eq!(clean_album_title("Plain"), "Plain");
    }

    #[test]
    fn test_strip_leading_number() {
        assert_eq!(strip_leading_number("01 Prelude"), "Prelude");
        assert_eq!(strip_leading_number("1. Prelude"), "Prelude");
        assert_eq!(strip_leading_number(" 12 - Finale"), "Finale");
        assert_eq!(strip_leading_number("Prelude 2"), "Prelude 2");
    }
}
