use anyhow::{Context, Result};
use img_parts::png::Png;
use img_parts::Bytes;
use nom_exif::*;
use std::path::Path;

use super::png_text;
use super::writer::{PNG_KEY_DESCRIPTION, PNG_KEY_TITLE};

// XP* tag IDs (IFD0) — Windows Explorer fallbacks
const TAG_XP_TITLE: u16 = 0x9C9B;
const TAG_XP_COMMENT: u16 = 0x9C9C;
const TAG_XP_KEYWORDS: u16 = 0x9C9E;

/// Descriptive metadata already present in an image.
#[derive(Debug, Clone, Default)]
pub struct ExistingMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

impl ExistingMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.keywords.is_none()
    }
}

/// Read any existing title/description/keywords from an image file.
///
/// JPEG is read through its EXIF block, PNG through its text entries. Other
/// formats — and images with no metadata at all — yield an empty result, not
/// an error.
pub fn read_metadata(path: &Path) -> Result<ExistingMetadata> {
    let bytes = std::fs::read(path).context("Failed to open image file")?;
    match image::guess_format(&bytes) {
        Ok(image::ImageFormat::Jpeg) => Ok(read_exif(path)),
        Ok(image::ImageFormat::Png) => Ok(read_png_text(&bytes)),
        _ => Ok(ExistingMetadata::default()),
    }
}

/// Read EXIF descriptive fields, falling back to the XP* variants.
fn read_exif(path: &Path) -> ExistingMetadata {
    let mut parser = MediaParser::new();
    let ms = match MediaSource::file_path(path) {
        Ok(ms) => ms,
        Err(e) => {
            log::debug!("Could not open {} for EXIF read: {e}", path.display());
            return ExistingMetadata::default();
        }
    };

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found in {}", path.display());
            return ExistingMetadata::default();
        }
    };
    let exif: Exif = iter.into();

    let mut data = ExistingMetadata::default();

    // Title / ImageDescription
    if let Some(val) = exif.get(ExifTag::ImageDescription) {
        data.title = entry_to_string(val);
    }

    // XPTitle fallback
    if data.title.is_none() {
        if let Some(val) = exif.get_by_ifd_tag_code(0, TAG_XP_TITLE) {
            data.title = entry_to_string(val);
        }
    }

    // Description / UserComment
    if let Some(val) = exif.get(ExifTag::UserComment) {
        data.description = entry_to_string(val);
    }

    // XPComment fallback
    if data.description.is_none() {
        if let Some(val) = exif.get_by_ifd_tag_code(0, TAG_XP_COMMENT) {
            data.description = entry_to_string(val);
        }
    }

    // XPKeywords
    if let Some(val) = exif.get_by_ifd_tag_code(0, TAG_XP_KEYWORDS) {
        data.keywords = entry_to_string(val);
    }

    data
}

/// Read PNG text entries keyed `title`/`description`/`keywords`.
fn read_png_text(bytes: &[u8]) -> ExistingMetadata {
    let png = match Png::from_bytes(Bytes::copy_from_slice(bytes)) {
        Ok(png) => png,
        Err(e) => {
            log::debug!("Could not parse PNG chunks: {e}");
            return ExistingMetadata::default();
        }
    };

    let mut data = ExistingMetadata::default();
    for entry in png.chunks().iter().filter_map(png_text::decode) {
        match entry.keyword.as_str() {
            PNG_KEY_TITLE => data.title = non_empty(entry.text),
            PNG_KEY_DESCRIPTION => data.description = non_empty(entry.text),
            "keywords" => data.keywords = non_empty(entry.text),
            _ => {}
        }
    }
    data
}

/// Convert an EntryValue to an Option<String>.
fn entry_to_string(val: &EntryValue) -> Option<String> {
    let s = val.to_string();
    let s = s.trim().trim_matches('"').to_string();
    non_empty(s)
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
