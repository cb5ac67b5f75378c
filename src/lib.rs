//! # seo-meta
//!
//! Embed SEO metadata — a title, a description, and a bounded keyword list —
//! into image files, without touching the pixel data. JPEG containers get EXIF
//! tags, PNG containers get named text entries, and anything else passes
//! through unchanged with a warning.
//!
//! ## Quick Start
//!
//! The simplest way to use the library is through the request module, which
//! handles the full validate → build packet → write metadata flow for one
//! submission:
//!
//! ```rust,no_run
//! use seo_meta::request::{process, Submission};
//!
//! let bytes = std::fs::read("photo.jpg")?;
//!
//! let result = process(Submission {
//!     file_name: "photo.jpg".into(),
//!     bytes,
//!     title: "Sunset over the bay".into(),
//!     description: "A red sky fading over calm water at dusk".into(),
//!     keywords: "sunset, bay, red sky, dusk".into(),
//! });
//!
//! if let Some(ref err) = result.error {
//!     eprintln!("{err}");
//! } else if let Some(ref output) = result.output {
//!     std::fs::write(&result.download_name, output)?;
//!     for note in &result.warnings {
//!         println!("{note}");
//!     }
//! }
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! ## Lower-Level Usage
//!
//! For more control, build the packet and drive the container writer yourself:
//!
//! ```rust,no_run
//! use seo_meta::meta::write_metadata;
//! use seo_meta::packet::{split_keywords, MetadataPacket};
//! use seo_meta::request::ImageHandle;
//!
//! # fn main() -> anyhow::Result<()> {
//! let build = MetadataPacket::build(
//!     "Sunset over the bay",
//!     "A red sky fading over calm water at dusk",
//!     split_keywords("sunset, bay, red sky"),
//! );
//! if build.dropped > 0 {
//!     println!("{} keywords over the cap were dropped", build.dropped);
//! }
//!
//! let handle = ImageHandle::open(std::fs::read("photo.jpg")?)?;
//! let output = write_metadata(&handle, &build.packet)?;
//! std::fs::write("seo-meta-photo.jpg", &output.bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Supported Formats
//!
//! | Container | Write Strategy |
//! |-----------|---------------|
//! | JPEG (`.jpg`, `.jpeg`) | EXIF — ImageDescription (title) + UserComment (description) |
//! | PNG (`.png`) | `title` / `description` text entries (tEXt, or iTXt for non-Latin-1) |
//! | any other decodable format | bytes returned unchanged, warning surfaced |
//!
//! Keywords are carried in the packet and shown to the user, but neither
//! target field set defines a keyword-list slot; for JPEG this limitation is
//! surfaced as an informational note.
//!
//! ## Modules
//!
//! - [`packet`] — metadata packet construction (trim, blank-drop, 50-keyword cap)
//! - [`meta`] — container metadata reading and writing
//! - [`request`] — per-submission orchestration, format detection, error capture

pub mod meta;
pub mod packet;
pub mod request;
