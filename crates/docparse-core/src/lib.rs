use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod parser;
pub mod text;

// Re-export for convenience
pub use backend::{BackendError, DocxBackend, DocxBody, DocxTable, PdfBackend};
pub use config_file::Settings;
pub use parser::{Capability, DocumentParser};
pub use text::{assemble_docx, assemble_pdf, word_count};

/// A document format the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Pdf,
    Docx,
}

impl FileType {
    pub const ALL: [FileType; 2] = [FileType::Pdf, FileType::Docx];

    /// The lowercase tag accepted on the command line.
    pub fn tag(self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Docx => "docx",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Pdf => f.write_str("PDF"),
            FileType::Docx => f.write_str("DOCX"),
        }
    }
}

impl FromStr for FileType {
    type Err = DocumentError;

    /// Case-insensitive. Unknown tags are reported in their lowercased form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|ft| ft.tag() == tag)
            .ok_or(DocumentError::UnsupportedType(tag))
    }
}

/// Successful extraction: the trimmed text plus format-specific metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    pub text: String,
    pub metadata: Metadata,
}

/// Metadata keyed by the file type that produced it.
///
/// Serialized untagged, so the JSON object only carries the variant's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Metadata {
    Pdf(PdfMetadata),
    Docx(DocxMetadata),
}

impl Metadata {
    pub fn word_count(&self) -> usize {
        match self {
            Metadata::Pdf(m) => m.word_count,
            Metadata::Docx(m) => m.word_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfMetadata {
    pub page_count: usize,
    pub word_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocxMetadata {
    /// Top-level body paragraphs only; paragraphs inside table cells are not counted.
    pub paragraphs: usize,
    pub word_count: usize,
}

/// The `{"error": ...}` object emitted on any failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorOutput {
    pub error: String,
}

impl From<&DocumentError> for ErrorOutput {
    fn from(err: &DocumentError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// A parsing backend that was left out of this build, with the
/// instruction that brings it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub library: &'static str,
    pub install: &'static str,
}

#[derive(Error, Debug)]
pub enum DocumentError {
    /// Wrong argument count; carries the full usage line.
    #[error("{0}")]
    Usage(String),
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("{} not installed. Run: {}", .0.library, .0.install)]
    DependencyMissing(Dependency),
    #[error("Failed to parse {file_type}: {message}")]
    Extraction { file_type: FileType, message: String },
}

impl DocumentError {
    pub fn extraction(file_type: FileType, err: impl fmt::Display) -> Self {
        Self::Extraction {
            file_type,
            message: err.to_string(),
        }
    }
}
