//! Plain text decoding with encoding fallback

use crate::error::{Error, Result};
use tracing::debug;

/// Decode raw `.txt` bytes into a string
///
/// Tries UTF-8 first and falls back to Latin-1, in that order so a later
/// encoding never shadows a valid UTF-8 file. NUL bytes mark the content as
/// binary rather than text under any supported encoding.
pub fn decode_text(raw: &[u8]) -> Result<String> {
    if raw.contains(&0) {
        return Err(Error::Decoding(
            "content contains NUL bytes (tried utf-8, latin-1)".to_string(),
        ));
    }

    match std::str::from_utf8(raw) {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            debug!("UTF-8 decoding failed ({}), falling back to Latin-1", e);
            Ok(decode_latin1(raw))
        }
    }
}

/// Decode bytes as ISO-8859-1 (each byte maps to the same code point)
fn decode_latin1(raw: &[u8]) -> String {
    raw.iter().map(|&b| b as char).collect()
}
