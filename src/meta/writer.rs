use anyhow::{Context, Result};
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::{Bytes, ImageEXIF};
use little_exif::exif_tag::ExifTag;
use little_exif::filetype::FileExtension;
use little_exif::metadata::Metadata;

use super::png_text;
use crate::packet::MetadataPacket;
use crate::request::{ContainerFormat, ImageHandle};

// little_exif as_u8_vec(JPEG) returns: [APP1 marker 2B][length 2B][Exif\0\0 6B][TIFF data]
// img-parts set_exif() expects just the TIFF data (after Exif\0\0)
const JPEG_EXIF_OVERHEAD: usize = 10; // 2 + 2 + 6

// EXIF UserComment payloads start with an 8-byte character-code marker.
const USER_COMMENT_PREFIX: &[u8] = b"ASCII\0\0\0";

/// PNG text-entry keyword carrying the title.
pub const PNG_KEY_TITLE: &str = "title";
/// PNG text-entry keyword carrying the description.
pub const PNG_KEY_DESCRIPTION: &str = "description";

/// Result of applying a metadata packet to an image.
#[derive(Debug)]
pub struct WriteOutput {
    /// The re-encoded image, positioned at its start.
    pub bytes: Vec<u8>,
    /// User-facing notes collected while writing (keyword limitation,
    /// unsupported-format warning).
    pub notes: Vec<String>,
}

/// Write a metadata packet into an opened image, routing by container format.
///
/// - **JPEG** — title goes to the EXIF ImageDescription slot, description to
///   UserComment (UTF-8 payload behind the character-code marker). Existing
///   EXIF tags are preserved where parseable. Keywords are not persisted —
///   the EXIF field set used here has no keyword-list slot — and a note says so.
/// - **PNG** — title and description go to `title`/`description` text entries;
///   every other chunk, including unrelated text entries, is preserved.
/// - **Anything else** — the original bytes pass through unchanged and a
///   warning names the format.
///
/// Pixel data is never re-encoded; only metadata segments/chunks change.
pub fn write_metadata(handle: &ImageHandle, packet: &MetadataPacket) -> Result<WriteOutput> {
    let mut notes = Vec::new();

    let bytes = match handle.container() {
        ContainerFormat::Jpeg => {
            let out = write_jpeg(handle.bytes(), packet)
                .context("Failed to write EXIF metadata")?;
            log::info!("Wrote JPEG EXIF metadata (ImageDescription, UserComment)");
            notes.push(format!(
                "JPEG saved with EXIF metadata. Keywords are not embedded — EXIF defines \
                 no keyword-list slot ({} kept in the packet).",
                packet.keywords().len()
            ));
            out
        }
        ContainerFormat::Png => {
            let out = write_png(handle.bytes(), packet)
                .context("Failed to write PNG text metadata")?;
            log::info!("Wrote PNG text metadata (title, description)");
            notes.push("PNG saved with title and description text entries.".to_string());
            out
        }
        ContainerFormat::Other => {
            let label = handle.format_label();
            log::warn!("No metadata strategy for {label}; returning the image unchanged");
            notes.push(format!(
                "Writing metadata is not supported for {label} files — the image was \
                 saved back unchanged."
            ));
            handle.bytes().to_vec()
        }
    };

    Ok(WriteOutput { bytes, notes })
}

/// Load existing EXIF metadata from JPEG bytes using little_exif.
/// Returns None if it can't parse (the caller then starts a fresh block).
fn load_existing_metadata(bytes: &[u8]) -> Option<Metadata> {
    let owned = bytes.to_vec();
    // Suppress panics from little_exif
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));
    let result = std::panic::catch_unwind(move || {
        Metadata::new_from_vec(&owned, FileExtension::JPEG)
    });
    std::panic::set_hook(prev_hook);

    match result {
        Ok(Ok(m)) => {
            if m.data().is_empty() {
                log::debug!("little_exif loaded empty metadata");
                None
            } else {
                log::debug!("little_exif loaded {} existing EXIF tags", m.data().len());
                Some(m)
            }
        }
        Ok(Err(e)) => {
            log::debug!("little_exif could not parse EXIF: {e}");
            None
        }
        Err(_) => {
            log::debug!("little_exif panicked parsing EXIF");
            None
        }
    }
}

/// Write title/description EXIF tags into a JPEG, preserving the rest of the
/// container byte-for-byte.
///
/// Strategy:
/// 1. Parse the JPEG with img-parts (all segments kept)
/// 2. Merge the two tags into whatever EXIF little_exif can load, or a fresh block
/// 3. Swap in the new APP1 EXIF segment via img-parts
fn write_jpeg(bytes: &[u8], packet: &MetadataPacket) -> Result<Vec<u8>> {
    let mut jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(bytes))
        .map_err(|e| anyhow::anyhow!("Failed to parse JPEG: {e}"))?;

    let mut metadata = load_existing_metadata(bytes).unwrap_or_else(Metadata::new);

    metadata.set_tag(ExifTag::ImageDescription(packet.title().to_string()));

    let mut comment = USER_COMMENT_PREFIX.to_vec();
    comment.extend_from_slice(packet.description().as_bytes());
    metadata.set_tag(ExifTag::UserComment(comment));

    let exif_bytes = metadata.as_u8_vec(FileExtension::JPEG);
    if exif_bytes.len() > JPEG_EXIF_OVERHEAD {
        jpeg.set_exif(Some(Bytes::from(exif_bytes[JPEG_EXIF_OVERHEAD..].to_vec())));
    }

    Ok(jpeg.encoder().bytes().to_vec())
}

/// Write title/description text entries into a PNG.
///
/// Existing `title`/`description` entries (any text-chunk kind) are replaced;
/// all other chunks are carried over untouched.
fn write_png(bytes: &[u8], packet: &MetadataPacket) -> Result<Vec<u8>> {
    let mut png = Png::from_bytes(Bytes::copy_from_slice(bytes))
        .map_err(|e| anyhow::anyhow!("Failed to parse PNG: {e}"))?;

    let chunks = png.chunks_mut();
    chunks.retain(|c| {
        png_text::keyword(c)
            .is_none_or(|k| k != PNG_KEY_TITLE && k != PNG_KEY_DESCRIPTION)
    });

    // Text entries must sit before IEND when img-parts keeps it in the list.
    let at = chunks
        .iter()
        .position(|c| &c.kind() == b"IEND")
        .unwrap_or(chunks.len());
    chunks.insert(at, png_text::encode(PNG_KEY_TITLE, packet.title()));
    chunks.insert(at + 1, png_text::encode(PNG_KEY_DESCRIPTION, packet.description()));

    Ok(png.encoder().bytes().to_vec())
}
