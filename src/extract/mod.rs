//! Plain-text extraction from uploaded files
//!
//! Dispatches on the filename extension. Only `.pdf` and `.txt` are
//! supported; anything else is rejected before further work happens.

#[cfg(feature = "pdf")]
mod pdf;
mod text;

#[cfg(feature = "pdf")]
pub use pdf::extract_pdf_text;
pub use text::decode_text;

use crate::error::{Error, Result};
use tracing::debug;

/// Supported upload file types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Text,
}

impl FileType {
    /// Detect the file type from a filename extension
    pub fn from_filename(filename: &str) -> Result<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Ok(FileType::Pdf)
        } else if lower.ends_with(".txt") {
            Ok(FileType::Text)
        } else {
            let ext = lower
                .rsplit_once('.')
                .map(|(_, e)| format!(".{}", e))
                .unwrap_or_else(|| filename.to_string());
            Err(Error::UnsupportedFileType(ext))
        }
    }
}

/// Extract plain text from raw file bytes
///
/// `.txt` content goes through the encoding fallback chain; `.pdf` content
/// is extracted page by page with a blank line between pages.
pub fn extract_text(raw: &[u8], filename: &str) -> Result<String> {
    let file_type = FileType::from_filename(filename)?;
    debug!("Extracting text from {} ({:?})", filename, file_type);

    match file_type {
        FileType::Text => decode_text(raw),
        #[cfg(feature = "pdf")]
        FileType::Pdf => extract_pdf_text(raw),
        #[cfg(not(feature = "pdf"))]
        FileType::Pdf => Err(Error::Extraction(
            "PDF support not compiled in. Enable the 'pdf' feature.".to_string(),
        )),
    }
}
