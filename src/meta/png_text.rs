//! PNG text-chunk codec.
//!
//! Encodes and decodes the keyword/value text entries a PNG can carry:
//! `tEXt` (Latin-1) and uncompressed `iTXt` (UTF-8). `zTXt` is recognized far
//! enough to extract its keyword so replacement never leaves a duplicate key,
//! but its deflated payload is not expanded.

use img_parts::png::PngChunk;
use img_parts::Bytes;

const KIND_TEXT: [u8; 4] = *b"tEXt";
const KIND_ITXT: [u8; 4] = *b"iTXt";
const KIND_ZTXT: [u8; 4] = *b"zTXt";

/// A decoded PNG text entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub keyword: String,
    pub text: String,
}

/// Extract the keyword of any text-type chunk (`tEXt`, `iTXt`, `zTXt`).
///
/// Returns `None` for non-text chunks or malformed contents.
pub fn keyword(chunk: &PngChunk) -> Option<String> {
    match chunk.kind() {
        KIND_TEXT | KIND_ITXT | KIND_ZTXT => {
            let contents = chunk.contents();
            let nul = contents.iter().position(|&b| b == 0)?;
            Some(latin1_decode(&contents[..nul]))
        }
        _ => None,
    }
}

/// Decode a `tEXt` or uncompressed `iTXt` chunk into keyword + text.
///
/// Compressed entries and non-text chunks return `None`.
pub fn decode(chunk: &PngChunk) -> Option<TextEntry> {
    let contents = chunk.contents();
    match chunk.kind() {
        KIND_TEXT => {
            // keyword \0 text, both Latin-1
            let nul = contents.iter().position(|&b| b == 0)?;
            Some(TextEntry {
                keyword: latin1_decode(&contents[..nul]),
                text: latin1_decode(&contents[nul + 1..]),
            })
        }
        KIND_ITXT => {
            // keyword \0 compression-flag compression-method language \0
            // translated-keyword \0 text (UTF-8)
            let nul = contents.iter().position(|&b| b == 0)?;
            let keyword = latin1_decode(&contents[..nul]);
            let rest = &contents[nul + 1..];
            let (&compression_flag, rest) = rest.split_first()?;
            if compression_flag != 0 {
                return None;
            }
            let (_method, rest) = rest.split_first()?;
            let lang_nul = rest.iter().position(|&b| b == 0)?;
            let rest = &rest[lang_nul + 1..];
            let trans_nul = rest.iter().position(|&b| b == 0)?;
            let text = String::from_utf8(rest[trans_nul + 1..].to_vec()).ok()?;
            Some(TextEntry { keyword, text })
        }
        _ => None,
    }
}

/// Build a text chunk for a keyword/value pair.
///
/// Latin-1-encodable values become `tEXt`; anything else becomes an
/// uncompressed `iTXt` with UTF-8 text, the same selection PNG-writing
/// libraries make.
pub fn encode(keyword: &str, text: &str) -> PngChunk {
    let key_bytes = latin1_encode(keyword)
        .unwrap_or_else(|| keyword.bytes().filter(|b| b.is_ascii()).collect());

    if let Some(text_bytes) = latin1_encode(text) {
        let mut contents = Vec::with_capacity(key_bytes.len() + 1 + text_bytes.len());
        contents.extend_from_slice(&key_bytes);
        contents.push(0);
        contents.extend_from_slice(&text_bytes);
        PngChunk::new(KIND_TEXT, Bytes::from(contents))
    } else {
        let mut contents = Vec::with_capacity(key_bytes.len() + 5 + text.len());
        contents.extend_from_slice(&key_bytes);
        contents.push(0); // keyword terminator
        contents.push(0); // compression flag: uncompressed
        contents.push(0); // compression method
        contents.push(0); // empty language tag
        contents.push(0); // empty translated keyword
        contents.extend_from_slice(text.as_bytes());
        PngChunk::new(KIND_ITXT, Bytes::from(contents))
    }
}

/// Encode a string as Latin-1, or `None` if any character is outside it.
fn latin1_encode(s: &str) -> Option<Vec<u8>> {
    s.chars()
        .map(|c| {
            let cp = c as u32;
            (cp <= 0xFF).then_some(cp as u8)
        })
        .collect()
}

fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_value_becomes_text_chunk() {
        let chunk = encode("title", "Sunset");
        assert_eq!(chunk.kind(), KIND_TEXT);
        let entry = decode(&chunk).unwrap();
        assert_eq!(entry.keyword, "title");
        assert_eq!(entry.text, "Sunset");
    }

    #[test]
    fn latin1_value_stays_text_chunk() {
        let chunk = encode("description", "Café au Crépuscule");
        assert_eq!(chunk.kind(), KIND_TEXT);
        let entry = decode(&chunk).unwrap();
        assert_eq!(entry.text, "Café au Crépuscule");
    }

    #[test]
    fn non_latin1_value_becomes_itxt() {
        let chunk = encode("title", "Sunset 🌅 over the bay");
        assert_eq!(chunk.kind(), KIND_ITXT);
        let entry = decode(&chunk).unwrap();
        assert_eq!(entry.keyword, "title");
        assert_eq!(entry.text, "Sunset 🌅 over the bay");
    }

    #[test]
    fn keyword_extracted_from_any_text_kind() {
        assert_eq!(keyword(&encode("title", "a")).as_deref(), Some("title"));
        assert_eq!(keyword(&encode("title", "🌅")).as_deref(), Some("title"));

        // zTXt: keyword \0 method, then deflated data we never touch
        let ztxt = PngChunk::new(KIND_ZTXT, Bytes::from(b"title\0\0\x78\x9c".to_vec()));
        assert_eq!(keyword(&ztxt).as_deref(), Some("title"));
        assert!(decode(&ztxt).is_none());
    }

    #[test]
    fn non_text_chunk_is_ignored() {
        let ihdr = PngChunk::new(*b"IHDR", Bytes::from(vec![0u8; 13]));
        assert!(keyword(&ihdr).is_none());
        assert!(decode(&ihdr).is_none());
    }

    #[test]
    fn compressed_itxt_is_not_decoded() {
        let mut contents = b"title\0".to_vec();
        contents.push(1); // compressed
        contents.push(0);
        contents.extend_from_slice(b"\0\0\x78\x9c");
        let chunk = PngChunk::new(KIND_ITXT, Bytes::from(contents));
        assert!(decode(&chunk).is_none());
        // but the keyword is still visible for replacement
        assert_eq!(keyword(&chunk).as_deref(), Some("title"));
    }
}
