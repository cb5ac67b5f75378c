use anyhow::{Context, Result};
use image::{DynamicImage, ImageFormat};

use crate::meta::{self, WriteOutput};
use crate::packet::{split_keywords, MetadataPacket, PacketBuild, MAX_KEYWORDS};

/// Prefix prepended to the original filename for the download.
pub const DOWNLOAD_PREFIX: &str = "seo-meta-";

/// The metadata strategy for an image, determined by its container format.
///
/// Detection is content-based: the uploaded bytes are sniffed, so a mislabeled
/// file still lands on the right strategy.
///
/// # Example
///
/// ```rust
/// use seo_meta::request::{ContainerFormat, ImageHandle};
///
/// # fn main() -> anyhow::Result<()> {
/// # let png_bytes: Vec<u8> = {
/// #     let img = image::DynamicImage::new_rgb8(1, 1);
/// #     let mut buf = std::io::Cursor::new(Vec::new());
/// #     img.write_to(&mut buf, image::ImageFormat::Png)?;
/// #     buf.into_inner()
/// # };
/// let handle = ImageHandle::open(png_bytes)?;
/// assert_eq!(handle.container(), ContainerFormat::Png);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// JPEG — metadata goes into the EXIF APP1 segment
    Jpeg,
    /// PNG — metadata goes into text chunks
    Png,
    /// Every other detected format — no metadata written, bytes pass through
    Other,
}

impl ContainerFormat {
    pub fn from_image_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => Self::Jpeg,
            ImageFormat::Png => Self::Png,
            _ => Self::Other,
        }
    }
}

/// An uploaded image opened for a single write operation.
///
/// Owns the original container bytes, the sniffed format, and the decoded
/// pixels. Decoding up front is the malformed-input check; the pixels are also
/// what a front-end renders as the preview. A handle lives for one request and
/// is never retained.
pub struct ImageHandle {
    bytes: Vec<u8>,
    format: ImageFormat,
    image: DynamicImage,
}

impl ImageHandle {
    /// Sniff the container format and decode the image.
    ///
    /// Fails on unrecognized or malformed data — the fatal error class for a
    /// request.
    pub fn open(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes).context("Unrecognized image data")?;
        let image = image::load_from_memory(&bytes).context("Failed to decode image")?;
        log::debug!(
            "Opened {} image, {}x{}",
            format.to_mime_type(),
            image.width(),
            image.height()
        );
        Ok(Self { bytes, format, image })
    }

    pub fn container(&self) -> ContainerFormat {
        ContainerFormat::from_image_format(self.format)
    }

    /// MIME type of the detected container.
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Human-readable name of the detected format, for messages.
    pub fn format_label(&self) -> String {
        format!("{:?}", self.format).to_uppercase()
    }

    /// The original, un-reencoded container bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The decoded pixels.
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// One form submission: the uploaded file plus the three SEO fields.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Original filename, used for the download name.
    pub file_name: String,
    /// Raw uploaded bytes.
    pub bytes: Vec<u8>,
    pub title: String,
    pub description: String,
    /// Raw keyword text, comma- or newline-delimited.
    pub keywords: String,
}

/// The outcome of processing a single submission.
///
/// Failures land in `error` instead of propagating: a submission either yields
/// output bytes plus any warnings, or a user-visible error message and no
/// output — never a panic and never both.
#[derive(Debug)]
pub struct ProcessResult {
    pub file_name: String,
    /// The packet that was (or would have been) embedded.
    pub packet: Option<MetadataPacket>,
    pub format: Option<ContainerFormat>,
    /// Re-encoded image bytes, positioned at the start. Absent on failure.
    pub output: Option<Vec<u8>>,
    /// `seo-meta-` + the original filename.
    pub download_name: String,
    /// MIME type of the detected container.
    pub mime: Option<&'static str>,
    /// Non-fatal notes to show the user (truncation, keyword limitation,
    /// unsupported format).
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

/// Process one submission: validate, build the packet, open the image, write
/// the metadata, and name the download.
///
/// The whole pass is synchronous and owns its buffers exclusively; nothing is
/// shared or retained across calls.
pub fn process(submission: Submission) -> ProcessResult {
    let mut result = ProcessResult {
        download_name: format!("{DOWNLOAD_PREFIX}{}", submission.file_name),
        file_name: submission.file_name,
        packet: None,
        format: None,
        output: None,
        mime: None,
        warnings: Vec::new(),
        error: None,
    };

    // Required fields — reject before any processing happens.
    if submission.title.trim().is_empty()
        || submission.description.trim().is_empty()
        || submission.keywords.trim().is_empty()
    {
        result.error = Some("Title, description, and keywords are all required".to_string());
        return result;
    }

    log::info!("Processing submission: {}", result.file_name);

    let PacketBuild { packet, dropped } = MetadataPacket::build(
        submission.title,
        submission.description,
        split_keywords(&submission.keywords),
    );
    if dropped > 0 {
        result.warnings.push(format!(
            "More than {MAX_KEYWORDS} keywords supplied; only the first {MAX_KEYWORDS} were kept"
        ));
    }

    let handle = match ImageHandle::open(submission.bytes) {
        Ok(handle) => handle,
        Err(e) => {
            log::warn!("Could not open {}: {e:#}", result.file_name);
            result.error = Some(format!("Metadata update failed: {e:#}"));
            result.packet = Some(packet);
            return result;
        }
    };
    result.format = Some(handle.container());
    result.mime = Some(handle.mime_type());

    match meta::write_metadata(&handle, &packet) {
        Ok(WriteOutput { bytes, notes }) => {
            log::info!("Done: {} ({} bytes)", result.download_name, bytes.len());
            result.warnings.extend(notes);
            result.output = Some(bytes);
        }
        Err(e) => {
            log::warn!("Metadata write failed for {}: {e:#}", result.file_name);
            result.error = Some(format!("Metadata update failed: {e:#}"));
        }
    }

    result.packet = Some(packet);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::io::Cursor;

    fn sample_bytes(format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([64, 128, 32])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    fn submission(file_name: &str, bytes: Vec<u8>) -> Submission {
        Submission {
            file_name: file_name.to_string(),
            bytes,
            title: "Sunset".to_string(),
            description: "A red sky".to_string(),
            keywords: "sea, sea, , sky".to_string(),
        }
    }

    // ── ContainerFormat / ImageHandle ────────────────────────────────

    #[test]
    fn container_format_mapping() {
        assert_eq!(
            ContainerFormat::from_image_format(ImageFormat::Jpeg),
            ContainerFormat::Jpeg
        );
        assert_eq!(
            ContainerFormat::from_image_format(ImageFormat::Png),
            ContainerFormat::Png
        );
        assert_eq!(
            ContainerFormat::from_image_format(ImageFormat::Bmp),
            ContainerFormat::Other
        );
    }

    #[test]
    fn handle_detects_by_content_not_name() {
        let handle = ImageHandle::open(sample_bytes(ImageFormat::Png)).unwrap();
        assert_eq!(handle.container(), ContainerFormat::Png);
        assert_eq!(handle.mime_type(), "image/png");
        assert_eq!(handle.image().width(), 4);
    }

    #[test]
    fn handle_rejects_garbage() {
        assert!(ImageHandle::open(b"definitely not an image".to_vec()).is_err());
    }

    // ── process ──────────────────────────────────────────────────────

    #[test]
    fn jpeg_submission_round_trip() {
        let result = process(submission("photo.jpg", sample_bytes(ImageFormat::Jpeg)));

        assert!(result.error.is_none(), "unexpected error: {:?}", result.error);
        assert_eq!(result.download_name, "seo-meta-photo.jpg");
        assert_eq!(result.mime, Some("image/jpeg"));
        assert_eq!(result.format, Some(ContainerFormat::Jpeg));

        let packet = result.packet.unwrap();
        assert_eq!(packet.keywords(), ["sea", "sea", "sky"]);

        // Output is still a decodable JPEG after the EXIF swap.
        let output = result.output.unwrap();
        assert!(image::load_from_memory(&output).is_ok());
    }

    #[test]
    fn png_submission_round_trip() {
        let result = process(submission("pic.png", sample_bytes(ImageFormat::Png)));
        assert!(result.error.is_none());
        assert_eq!(result.download_name, "seo-meta-pic.png");
        assert_eq!(result.mime, Some("image/png"));
        assert!(result.output.is_some());
    }

    #[test]
    fn missing_field_rejected_before_any_work() {
        let mut sub = submission("photo.jpg", sample_bytes(ImageFormat::Jpeg));
        sub.title = "   ".to_string();
        let result = process(sub);

        assert!(result.error.as_ref().is_some_and(|e| e.contains("required")));
        assert!(result.output.is_none());
        assert!(result.packet.is_none());
        assert!(result.format.is_none());
    }

    #[test]
    fn truncation_surfaces_a_warning() {
        let mut sub = submission("photo.jpg", sample_bytes(ImageFormat::Jpeg));
        sub.keywords = (0..60).map(|i| format!("kw{i}")).collect::<Vec<_>>().join(", ");
        let result = process(sub);

        assert!(result.error.is_none());
        assert!(result.warnings.iter().any(|w| w.contains("first 50")));
        assert_eq!(result.packet.unwrap().keywords().len(), 50);
    }

    #[test]
    fn unsupported_format_passes_bytes_through() {
        let bytes = sample_bytes(ImageFormat::Bmp);
        let result = process(submission("scan.bmp", bytes.clone()));

        assert!(result.error.is_none());
        assert_eq!(result.format, Some(ContainerFormat::Other));
        assert_eq!(result.mime, Some("image/bmp"));
        assert_eq!(result.output.as_deref(), Some(bytes.as_slice()));
        assert!(result.warnings.iter().any(|w| w.contains("not supported")));
    }

    #[test]
    fn undecodable_bytes_fail_the_request() {
        let result = process(submission("broken.jpg", b"\xff\xd8\xff junk".to_vec()));

        assert!(result
            .error
            .as_ref()
            .is_some_and(|e| e.starts_with("Metadata update failed")));
        assert!(result.output.is_none());
        // The packet was still built — validation and parsing happen first.
        assert!(result.packet.is_some());
    }
}
