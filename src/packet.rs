//! Metadata packet construction.
//!
//! Raw form input (title, description, keyword text) is normalized here into an
//! immutable [`MetadataPacket`] before anything touches the image. Keyword text
//! is comma- or newline-delimited; entries are trimmed, blanks dropped, and the
//! list capped at [`MAX_KEYWORDS`] — by truncation, never rejection.

/// Hard cap on the number of keywords carried by a packet.
pub const MAX_KEYWORDS: usize = 50;

/// The three SEO fields destined for the image's metadata container.
///
/// Immutable once built — [`MetadataPacket::build`] is the only way to create
/// one, and it enforces the keyword cap. Empty title/description are the
/// caller's problem (the request layer rejects them before building a packet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataPacket {
    title: String,
    description: String,
    keywords: Vec<String>,
}

/// Outcome of building a packet.
///
/// `dropped` is the number of keyword entries cut by the cap; non-zero means
/// the caller should surface a truncation warning.
#[derive(Debug)]
pub struct PacketBuild {
    pub packet: MetadataPacket,
    pub dropped: usize,
}

impl MetadataPacket {
    /// Build a packet from raw field values.
    ///
    /// Keyword entries are trimmed and blank entries discarded; whatever
    /// remains is truncated to the first [`MAX_KEYWORDS`] entries in input
    /// order. Duplicates are kept as supplied.
    pub fn build(
        title: impl Into<String>,
        description: impl Into<String>,
        keywords: Vec<String>,
    ) -> PacketBuild {
        let mut keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        let dropped = keywords.len().saturating_sub(MAX_KEYWORDS);
        if dropped > 0 {
            keywords.truncate(MAX_KEYWORDS);
            log::warn!("Keyword list exceeded {MAX_KEYWORDS} entries; dropped {dropped}");
        }

        PacketBuild {
            packet: MetadataPacket {
                title: title.into(),
                description: description.into(),
                keywords,
            },
            dropped,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Split raw keyword text on commas and newlines.
///
/// Pieces are returned as-is — possibly blank or whitespace-only — and are
/// cleaned up by [`MetadataPacket::build`].
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split([',', '\n']).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(raw: &str) -> PacketBuild {
        MetadataPacket::build("t", "d", split_keywords(raw))
    }

    #[test]
    fn keywords_trimmed_and_blanks_dropped() {
        let out = build("sea, sea, , sky");
        assert_eq!(out.packet.keywords(), ["sea", "sea", "sky"]);
        assert_eq!(out.dropped, 0);
    }

    #[test]
    fn newlines_delimit_like_commas() {
        let out = build("sunset\nbeach, waves\n\n  palm tree ");
        assert_eq!(out.packet.keywords(), ["sunset", "beach", "waves", "palm tree"]);
    }

    #[test]
    fn order_and_duplicates_preserved() {
        let out = build("b,a,b,a");
        assert_eq!(out.packet.keywords(), ["b", "a", "b", "a"]);
    }

    #[test]
    fn under_cap_passes_through() {
        let raw: Vec<String> = (0..50).map(|i| format!("kw{i}")).collect();
        let out = MetadataPacket::build("t", "d", raw);
        assert_eq!(out.packet.keywords().len(), 50);
        assert_eq!(out.dropped, 0);
    }

    #[test]
    fn over_cap_keeps_first_fifty() {
        let raw: Vec<String> = (0..60).map(|i| format!("kw{i}")).collect();
        let out = MetadataPacket::build("t", "d", raw);
        assert_eq!(out.packet.keywords().len(), MAX_KEYWORDS);
        assert_eq!(out.packet.keywords()[0], "kw0");
        assert_eq!(out.packet.keywords()[49], "kw49");
        assert_eq!(out.dropped, 10);
    }

    #[test]
    fn blanks_do_not_count_toward_cap() {
        // 55 real entries interleaved with blanks — the blanks must be gone
        // before the cap applies.
        let mut raw = Vec::new();
        for i in 0..55 {
            raw.push(format!("kw{i}"));
            raw.push("   ".to_string());
        }
        let out = MetadataPacket::build("t", "d", raw);
        assert_eq!(out.packet.keywords().len(), MAX_KEYWORDS);
        assert_eq!(out.dropped, 5);
    }

    #[test]
    fn empty_input_yields_empty_list() {
        let out = build("");
        assert!(out.packet.keywords().is_empty());
        assert_eq!(out.dropped, 0);
    }

    #[test]
    fn title_and_description_kept_verbatim() {
        let out = MetadataPacket::build("Sunset", "A red sky", vec!["sea".into()]);
        assert_eq!(out.packet.title(), "Sunset");
        assert_eq!(out.packet.description(), "A red sky");
    }
}
