//! Soundtrack catalog site access: HTTP plumbing, page extraction and album models

pub mod client;
pub mod extract;
pub mod fetcher;
pub mod models;

#[cfg(test)]
pub mod mock;

pub use client::{HttpFetch, SiteClient};
pub use fetcher::AlbumFetcher;
pub use models::{AlbumInfo, Track};

/// Origin used to absolutize relative links found on catalog pages
pub const DEFAULT_SITE_ORIGIN: &str = "https://downloads.khinsider.com";

/// Path segment every album and track page link contains
pub const ALBUM_PATH_SEGMENT: &str = "/game-soundtracks/album/";

/// Hosts direct audio links may point to, subdomains included
pub const ALLOWED_AUDIO_HOSTS: [&str; 3] = [
    "downloads.khinsider.com",
    "vgmtreasurechest.com",
    "vgmsite.com",
];
