//! Metadata and cover art embedding for downloaded tracks

use image::ImageFormat;
use lofty::config::WriteOptions;
use lofty::picture::{MimeType, Picture, PictureType};
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::Tag;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

/// Tag fields written alongside the cover; empty or missing fields are skipped
#[derive(Debug, Clone, Default)]
pub struct TrackMetadata<'a> {
    pub title: Option<&'a str>,
    pub artist: Option<&'a str>,
    pub album: Option<&'a str>,
    pub track_number: Option<u32>,
}

/// MIME type for cover image bytes, JPEG unless the data is recognizably PNG
pub fn cover_mime_type(data: &[u8]) -> MimeType {
    match image::guess_format(data) {
        Ok(ImageFormat::Png) => MimeType::Png,
        _ => MimeType::Jpeg,
    }
}

/// Write metadata and a front cover into an audio file in place
///
/// Creates the file's primary tag (ID3v2 for MP3) when it has none.
pub fn embed_metadata(
    audio_path: &Path,
    image_path: &Path,
    metadata: &TrackMetadata<'_>,
) -> Result<()> {
    let cover = std::fs::read(image_path)?;

    let mut tagged_file = Probe::open(audio_path)
        .and_then(|probe| probe.read())
        .map_err(|e| Error::tagging(audio_path, e))?;

    if tagged_file.primary_tag().is_none() {
        let tag_type = tagged_file.primary_tag_type();
        tagged_file.insert_tag(Tag::new(tag_type));
    }
    let tag = tagged_file
        .primary_tag_mut()
        .ok_or_else(|| Error::tagging(audio_path, "file format does not support tags"))?;

    if let Some(title) = metadata.title.filter(|s| !s.is_empty()) {
        tag.set_title(title.to_string());
    }
    if let Some(artist) = metadata.artist.filter(|s| !s.is_empty()) {
        tag.set_artist(artist.to_string());
    }
    if let Some(album) = metadata.album.filter(|s| !s.is_empty()) {
        tag.set_album(album.to_string());
    }
    if let Some(track) = metadata.track_number {
        tag.set_track(track);
    }

    let picture = Picture::new_unchecked(
        PictureType::CoverFront,
        Some(cover_mime_type(&cover)),
        Some("Cover".to_string()),
        cover,
    );
    tag.remove_picture_type(PictureType::CoverFront);
    tag.push_picture(picture);

    tagged_file
        .save_to_path(audio_path, WriteOptions::default())
        .map_err(|e| Error::tagging(audio_path, e))?;

    debug!("Embedded metadata in: {}", audio_path.display());
    Ok(())
}

/// A few silent MPEG-1 Layer III frames (128 kbps, 44.1 kHz)
#[cfg(test)]
pub fn silent_mp3() -> Vec<u8> {
    const FRAME_LEN: usize = 417;
    let mut data = Vec::with_capacity(FRAME_LEN * 8);
    for _ in 0..8 {
        let mut frame = vec![0u8; FRAME_LEN];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
        data.extend_from_slice(&frame);
    }
    data
}
