use std::path::Path;

use thiserror::Error;

/// Failure inside a text-extraction backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The file could not be opened or recognised as a PDF.
    #[error("failed to open PDF: {0}")]
    Open(String),
    /// The document opened but a page could not be turned into text.
    #[error("failed to extract text: {0}")]
    Extraction(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of a document's plain text.
///
/// The job in [`crate::job`] only needs the whole document as one string;
/// layout, page separators and character mapping are the backend's call.
pub trait PdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}
