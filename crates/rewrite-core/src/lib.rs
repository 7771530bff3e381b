//! PDF text-override model and export engine
//!
//! This crate holds the editor's document-independent logic: the
//! [`Modification`](modification::Modification) override model, the
//! insertion-ordered [`ModificationStore`](store::ModificationStore), the
//! heuristic text-run classifier, PDF validation, and the export engine
//! that replays overrides into a new byte stream with lopdf.
//!
//! Everything browser-specific (coordinate projection, overlay state, the
//! rendering bridge) lives in the `rewrite-wasm` app crate.

pub mod error;
pub mod export;
pub mod modification;
pub mod runs;
pub mod store;
pub mod validation;

pub use error::RewriteError;
pub use export::export_document;
pub use modification::{Modification, ModificationKind, TextAlign};
pub use runs::TextRun;
pub use store::{ModificationStore, StoreCommand};
pub use validation::{quick_validate, validate_pdf, PdfInfo};

/// Parse PDF bytes and return the page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, RewriteError> {
    let doc =
        lopdf::Document::load_mem(bytes).map_err(|e| RewriteError::ParseError(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}
