//! PDF validation and info extraction
//!
//! Ingestion gate for uploaded files: a document that fails here is
//! rejected before any session state is created.

use lopdf::Document;
use serde::Serialize;

use crate::error::RewriteError;

/// PDF file information extracted during validation
#[derive(Debug, Clone, Serialize, Default)]
pub struct PdfInfo {
    /// Number of pages in the document
    pub page_count: u32,
    /// PDF version string (e.g., "1.7")
    pub version: String,
    /// Whether the document is encrypted
    pub encrypted: bool,
    /// File size in bytes
    pub size_bytes: usize,
    /// Document title from metadata (if available)
    pub title: Option<String>,
    /// Document author from metadata (if available)
    pub author: Option<String>,
}

/// Validate a PDF file and extract basic info
pub fn validate_pdf(bytes: &[u8]) -> Result<PdfInfo, RewriteError> {
    quick_validate(bytes)?;

    let version = extract_version(bytes);

    let document =
        Document::load_mem(bytes).map_err(|e| RewriteError::ParseError(e.to_string()))?;

    let encrypted = document.is_encrypted();

    let page_count = document.get_pages().len() as u32;
    if page_count == 0 {
        return Err(RewriteError::InvalidDocument("PDF has no pages".to_string()));
    }

    let (title, author) = extract_metadata(&document);

    Ok(PdfInfo {
        page_count,
        version,
        encrypted,
        size_bytes: bytes.len(),
        title,
        author,
    })
}

/// Quick validation without full parsing (for large files)
pub fn quick_validate(bytes: &[u8]) -> Result<(), RewriteError> {
    if bytes.len() < 8 {
        return Err(RewriteError::InvalidDocument(
            "File too small to be a valid PDF".to_string(),
        ));
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err(RewriteError::InvalidDocument(
            "Not a valid PDF file (missing %PDF- header)".to_string(),
        ));
    }

    Ok(())
}

/// Extract PDF version from the header (`%PDF-1.7`)
fn extract_version(bytes: &[u8]) -> String {
    if bytes.len() >= 8 && bytes.starts_with(b"%PDF-") {
        let version_bytes = &bytes[5..8];
        if let Ok(version) = std::str::from_utf8(version_bytes) {
            return version.trim().to_string();
        }
    }
    "1.4".to_string()
}

/// Extract title and author from the Info dictionary
fn extract_metadata(document: &Document) -> (Option<String>, Option<String>) {
    let mut title = None;
    let mut author = None;

    if let Ok(info_ref) = document.trailer.get(b"Info") {
        if let Ok(info_id) = info_ref.as_reference() {
            if let Some(info_obj) = document.objects.get(&info_id) {
                if let Ok(info_dict) = info_obj.as_dict() {
                    if let Ok(title_obj) = info_dict.get(b"Title") {
                        if let Ok(title_bytes) = title_obj.as_str() {
                            let decoded = String::from_utf8_lossy(title_bytes);
                            if !decoded.is_empty() {
                                title = Some(decoded.into_owned());
                            }
                        }
                    }

                    if let Ok(author_obj) = info_dict.get(b"Author") {
                        if let Ok(author_bytes) = author_obj.as_str() {
                            let decoded = String::from_utf8_lossy(author_bytes);
                            if !decoded.is_empty() {
                                author = Some(decoded.into_owned());
                            }
                        }
                    }
                }
            }
        }
    }

    (title, author)
}
