use thiserror::Error;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Export failed: {0}")]
    ExportError(String),
}
