//! DOCX text extraction for docparse.
//!
//! Reads the main document part of an OOXML package with `zip` and walks
//! it with `quick-xml`, producing the top-level paragraphs and tables that
//! [`docparse_core::assemble_docx`] turns into text.

mod body;
mod package;
mod xml;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use docparse_core::{BackendError, DocxBackend, DocxBody};

use package::Package;

/// Errors specific to reading a DOCX package.
#[derive(Debug, thiserror::Error)]
pub enum DocxError {
    #[error("not a valid DOCX package: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("XML error in {part}: {message}")]
    Xml { part: String, message: String },
    #[error("package is missing part {0}")]
    MissingPart(String),
    #[error("part {part} exceeds the {limit}-byte size limit")]
    PartTooLarge { part: String, limit: u64 },
    #[error("document has no body")]
    NoBody,
    #[error("table {table}, row {row}: {message}")]
    Table {
        table: usize,
        row: usize,
        message: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DocxError> for BackendError {
    fn from(err: DocxError) -> Self {
        match err {
            DocxError::Io(e) => BackendError::Io(e),
            DocxError::Zip(e) => BackendError::OpenError(e.to_string()),
            other => BackendError::Malformed(other.to_string()),
        }
    }
}

/// OOXML implementation of [`DocxBackend`].
#[derive(Debug, Clone)]
pub struct OoxmlBackend {
    max_part_bytes: u64,
}

impl Default for OoxmlBackend {
    fn default() -> Self {
        Self {
            max_part_bytes: docparse_core::config_file::DEFAULT_MAX_PART_MB * 1024 * 1024,
        }
    }
}

impl OoxmlBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap on the uncompressed size of any part read from the package.
    pub fn with_max_part_bytes(mut self, bytes: u64) -> Self {
        self.max_part_bytes = bytes;
        self
    }

    fn read(&self, path: &Path) -> Result<DocxBody, DocxError> {
        let file = File::open(path)?;
        let mut package = Package::open(BufReader::new(file), self.max_part_bytes)?;

        let part = package.main_part_name()?;
        let bytes = package.read_part(&part)?;
        let document = xml::parse(&bytes).map_err(|message| DocxError::Xml {
            part: part.clone(),
            message,
        })?;

        let body = body::read_body(&document)?;
        tracing::debug!(
            path = %path.display(),
            part = %part,
            paragraphs = body.paragraphs.len(),
            tables = body.tables.len(),
            "read DOCX body"
        );
        Ok(body)
    }
}

impl DocxBackend for OoxmlBackend {
    fn read_body(&self, path: &Path) -> Result<DocxBody, BackendError> {
        self.read(path).map_err(BackendError::from)
    }
}
