use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("malformed document: {0}")]
    Malformed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// Implementors walk the pages once, in order, and return each page's text
/// without a trailing newline. Joining, trimming and word counting happen in
/// [`crate::text::assemble_pdf`], so every backend produces the same shape of
/// result.
pub trait PdfBackend: Send + Sync {
    /// Extract the text of every page of a PDF file.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError>;
}

/// Trait for DOCX backends.
///
/// Implementors read the package and return the body's top-level paragraphs
/// and tables; [`crate::text::assemble_docx`] turns them into text.
pub trait DocxBackend: Send + Sync {
    fn read_body(&self, path: &Path) -> Result<DocxBody, BackendError>;
}

/// The parts of a Word document body that contribute text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxBody {
    /// Text of each top-level paragraph, in document order.
    pub paragraphs: Vec<String>,
    /// Top-level tables, in document order.
    pub tables: Vec<DocxTable>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxTable {
    /// Cell text per row. A cell spanning several grid columns appears once
    /// per column it covers; a vertically merged cell repeats the text of the
    /// cell it continues.
    pub rows: Vec<Vec<String>>,
}
