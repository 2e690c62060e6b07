//! Data file content: gzip decoding and full-text search.

use async_compression::tokio::bufread::GzipDecoder;
use kbx_error::{ContentError, KbxError, Result};
use regex::Regex;
use tokio::io::AsyncReadExt;

/// Decompress a gzip data file and decode it as UTF-8 text.
///
/// Concatenated gzip members (as written by rolling sink appenders) are
/// decoded as one stream.
pub async fn decode_content(raw: &[u8]) -> Result<String> {
    let mut decoder = GzipDecoder::new(raw);
    decoder.multiple_members(true);

    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .await
        .map_err(|e| ContentError::Decompression(e.to_string()))?;

    let text =
        String::from_utf8(decompressed).map_err(|e| ContentError::Decoding(e.to_string()))?;
    Ok(text)
}

/// A compiled content search pattern.
///
/// Matches anywhere in the text (not anchored).
#[derive(Debug, Clone)]
pub struct SearchPattern {
    regex: Regex,
}

impl SearchPattern {
    /// Compile a search pattern.
    ///
    /// # Errors
    ///
    /// Returns [`KbxError::InvalidRequest`] if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            KbxError::InvalidRequest(format!("Invalid search pattern '{pattern}': {e}"))
        })?;
        Ok(Self { regex })
    }

    /// Check if the pattern occurs in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The pattern as given.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}
