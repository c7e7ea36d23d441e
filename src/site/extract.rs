//! HTML extraction for album and track pages
//!
//! Album pages are not marked up consistently, so most lookups are ordered
//! lists of strategies where the first one producing a result wins.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

use super::models::{AlbumInfo, Track};
use super::{ALBUM_PATH_SEGMENT, ALLOWED_AUDIO_HOSTS};
use crate::error::{Error, Result};

/// Extensions accepted for direct audio links
const AUDIO_EXTENSIONS: [&str; 2] = [".mp3", ".ogg"];

/// Header text identifying the tracklist table
const SONG_NAME_HEADER: &str = "Song Name";

/// Column holding the track link when the header lookup finds no exact match
const DEFAULT_SONG_COLUMN: usize = 1;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static TABLE_ROW: LazyLock<Selector> = LazyLock::new(|| selector("table tr"));
static ROW: LazyLock<Selector> = LazyLock::new(|| selector("tr"));
static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| selector("th"));
static DATA_CELL: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static LINK_WITH_HREF: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static ALBUM_IMAGE_BLOCK: LazyLock<Selector> = LazyLock::new(|| selector("div.albumImage img"));
static ALBUM_IMAGE_CLASS: LazyLock<Selector> = LazyLock::new(|| selector("img.albumImage"));
static ALBUM_HEADER: LazyLock<Selector> = LazyLock::new(|| selector("div.albumHeader"));

type ArtistStrategy = fn(&Html) -> Option<String>;
type ArtStrategy = fn(&Html) -> Vec<String>;

const ARTIST_STRATEGIES: [ArtistStrategy; 2] = [artist_from_published_row, artist_from_album_header];

const SCRAPED_ART_STRATEGIES: [ArtStrategy; 3] = [
    images_in_album_image_block,
    images_with_album_image_class,
    images_under_albums_path,
];

/// Parse an album page into [`AlbumInfo`]
///
/// Fails with [`Error::Parse`] when no table has a "Song Name" header; the
/// error lists the headers of every table on the page.
pub fn parse_album_page(html: &str, album_url: &str, origin: &str) -> Result<AlbumInfo> {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let artist = ARTIST_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(&document));

    // An "Album type" row only ever confirms the page title as album name,
    // and pages without one have no better candidate.
    let album = title.clone();

    let mut art_urls = templated_art_urls(album_url);
    art_urls.extend(
        SCRAPED_ART_STRATEGIES
            .iter()
            .map(|strategy| strategy(&document))
            .find(|urls| !urls.is_empty())
            .unwrap_or_default()
            .into_iter()
            .map(|src| absolutize(&src, origin)),
    );
    dedup_preserving_order(&mut art_urls);

    let tracks = parse_tracklist(&document, origin)?;

    Ok(AlbumInfo {
        title,
        artist,
        album,
        art_urls,
        tracks,
    })
}

/// Final path segment of an album URL
pub fn album_slug(album_url: &str) -> &str {
    album_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// High quality cover candidates derived from the album slug, in priority order
pub fn templated_art_urls(album_url: &str) -> Vec<String> {
    let slug = album_slug(album_url);
    vec![
        format!("https://vgmtreasurechest.com/soundtracks/{slug}/Cover.jpg"),
        format!("https://vgmtreasurechest.com/soundtracks/{slug}/Cover.png"),
        format!("https://vgmsite.com/soundtracks/{slug}/0%20-%20cover.png"),
    ]
}

/// Find the first direct audio link on a track page
///
/// The href must contain `format` (case-insensitive), end in a known audio
/// extension and point at one of [`ALLOWED_AUDIO_HOSTS`].
pub fn find_download_link(html: &str, format: &str, origin: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let format = format.to_lowercase();

    document
        .select(&LINK_WITH_HREF)
        .filter_map(|link| link.value().attr("href"))
        .find_map(|href| {
            let lower = href.to_lowercase();
            if href.is_empty()
                || !lower.contains(&format)
                || !AUDIO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
            {
                return None;
            }

            let absolute = absolutize(href, origin);
            let parsed = Url::parse(&absolute).ok()?;
            let host = parsed.host_str()?;
            is_allowed_host(host).then_some(absolute)
        })
}

/// Turn a page-relative reference into an absolute URL on `origin`
///
/// Protocol-relative references get `https:`; anything with a scheme is kept.
pub fn absolutize(href: &str, origin: &str) -> String {
    let origin = origin.trim_end_matches('/');
    if href.starts_with("//") {
        format!("https:{href}")
    } else if has_scheme(href) {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        format!("{origin}/{href}")
    }
}

fn has_scheme(href: &str) -> bool {
    match href.split_once(':') {
        Some((scheme, _)) => {
            scheme
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Whether `host` is an allowed audio host or one of its subdomains
fn is_allowed_host(host: &str) -> bool {
    ALLOWED_AUDIO_HOSTS.iter().any(|allowed| {
        host == *allowed
            || host
                .strip_suffix(allowed)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

fn parse_tracklist(document: &Html, origin: &str) -> Result<Vec<Track>> {
    let tables: Vec<(ElementRef<'_>, Vec<String>)> = document
        .select(&TABLE)
        .map(|table| (table, header_texts(table)))
        .collect();

    let Some((table, headers)) = tables
        .iter()
        .find(|(_, headers)| headers.iter().any(|h| h.contains(SONG_NAME_HEADER)))
    else {
        return Err(Error::Parse {
            tables: tables.iter().map(|(_, headers)| headers.clone()).collect(),
        });
    };

    let column = headers
        .iter()
        .position(|h| h == SONG_NAME_HEADER)
        .unwrap_or(DEFAULT_SONG_COLUMN);

    let tracks = table
        .select(&ROW)
        .skip(1)
        .filter_map(|row| {
            let cell = row.select(&DATA_CELL).nth(column)?;
            let link = cell.select(&LINK).next()?;
            let href = link.value().attr("href")?;
            if !href.contains(ALBUM_PATH_SEGMENT) {
                return None;
            }
            Some(Track {
                title: element_text(link),
                page_url: absolutize(href, origin),
            })
        })
        .collect();

    Ok(tracks)
}

fn header_texts(table: ElementRef<'_>) -> Vec<String> {
    table.select(&HEADER_CELL).map(element_text).collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Value cell of the last table row whose header cell contains `label`
fn labelled_value(document: &Html, label: &str) -> Option<String> {
    document
        .select(&TABLE_ROW)
        .filter_map(|row| {
            let header = row.select(&HEADER_CELL).next()?;
            let value = row.select(&DATA_CELL).next()?;
            element_text(header)
                .contains(label)
                .then(|| element_text(value))
        })
        .last()
}

fn artist_from_published_row(document: &Html) -> Option<String> {
    let value = labelled_value(document, "Published by")?;
    non_empty(value.split(',').next().unwrap_or_default())
}

/// "... by ARTIST (...)" in the album header block
fn artist_from_album_header(document: &Html) -> Option<String> {
    let text: String = document.select(&ALBUM_HEADER).next()?.text().collect();
    let (_, after) = text.rsplit_once("by")?;
    non_empty(after.split('(').next().unwrap_or_default())
}

fn images_in_album_image_block(document: &Html) -> Vec<String> {
    image_sources(document, &ALBUM_IMAGE_BLOCK, |_| true)
}

fn images_with_album_image_class(document: &Html) -> Vec<String> {
    image_sources(document, &ALBUM_IMAGE_CLASS, |_| true)
}

fn images_under_albums_path(document: &Html) -> Vec<String> {
    image_sources(document, &IMAGE, |src| src.contains("/albums/"))
}

fn image_sources(document: &Html, selector: &Selector, keep: fn(&str) -> bool) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| !src.is_empty() && keep(src))
        .map(str::to_string)
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn dedup_preserving_order(urls: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    urls.retain(|url| seen.insert(url.clone()));
}
