//! Container metadata reading and writing.
//!
//! This module provides two main functions:
//!
//! - [`read_metadata`] — Read any existing title/description/keywords from an image file
//! - [`write_metadata`] — Write a metadata packet into an opened image (format-aware)
//!
//! The writer routes to the correct strategy based on
//! [`ContainerFormat`](crate::request::ContainerFormat): JPEG gets EXIF
//! (ImageDescription + UserComment), PNG gets `title`/`description` text
//! entries, and any other container passes through unchanged with a warning.

mod png_text;
mod reader;
mod writer;

pub use reader::{read_metadata, ExistingMetadata};
pub use writer::{write_metadata, WriteOutput, PNG_KEY_DESCRIPTION, PNG_KEY_TITLE};
