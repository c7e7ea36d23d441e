//! Album page models

/// Everything extracted from an album page
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumInfo {
    /// Page title
    pub title: String,
    /// Publisher or composer, when the page names one
    pub artist: Option<String>,
    /// Album name
    pub album: String,
    /// Cover art candidates, highest priority first
    pub art_urls: Vec<String>,
    /// Tracks in page order
    pub tracks: Vec<Track>,
}

/// A track listed on an album page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    /// Track detail page holding the direct download links
    pub page_url: String,
}

impl Track {
    /// 1-based track number for the track at `index`
    pub fn number(index: usize) -> u32 {
        u32::try_from(index + 1).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_number_is_one_based() {
        assert_eq!(Track::number(0), 1);
        assert_eq!(Track::number(9), 10);
    }
}
