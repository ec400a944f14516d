//! PDF text extraction

use crate::error::{Error, Result};
use tracing::{debug, warn};

/// Extract text from a PDF, page by page
///
/// Pages are joined with a blank line. A page with no extractable text
/// contributes an empty string rather than aborting the whole document.
pub fn extract_pdf_text(raw: &[u8]) -> Result<String> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(raw)
        .map_err(|e| Error::Extraction(format!("PDF extraction failed: {}", e)))?;

    debug!("Extracted {} PDF pages", pages.len());

    let empty_pages = pages.iter().filter(|p| p.trim().is_empty()).count();
    if empty_pages > 0 {
        warn!("{} of {} PDF pages yielded no text", empty_pages, pages.len());
    }

    Ok(pages.join("\n\n"))
}
