//! File-type dispatch over the compiled-in backends.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use crate::backend::{BackendError, DocxBackend, PdfBackend};
use crate::text::{assemble_docx, assemble_pdf};
use crate::{Dependency, DocumentError, FileType, ParsedDocument};

/// Whether a backend is usable in this build.
///
/// Decided once when the [`DocumentParser`] is built, so a missing backend
/// fails fast with [`DocumentError::DependencyMissing`] instead of surfacing
/// as an extraction error.
pub enum Capability<B> {
    Ready(B),
    Missing(Dependency),
}

impl<B> Capability<B> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Capability::Ready(_))
    }

    fn get(&self) -> Result<&B, DocumentError> {
        match self {
            Capability::Ready(backend) => Ok(backend),
            Capability::Missing(dep) => Err(DocumentError::DependencyMissing(*dep)),
        }
    }
}

pub struct DocumentParser {
    pdf: Capability<Box<dyn PdfBackend>>,
    docx: Capability<Box<dyn DocxBackend>>,
}

impl DocumentParser {
    pub fn new(
        pdf: Capability<Box<dyn PdfBackend>>,
        docx: Capability<Box<dyn DocxBackend>>,
    ) -> Self {
        Self { pdf, docx }
    }

    /// True if the backend for `file_type` was compiled in.
    pub fn supports(&self, file_type: FileType) -> bool {
        match file_type {
            FileType::Pdf => self.pdf.is_ready(),
            FileType::Docx => self.docx.is_ready(),
        }
    }

    /// Validate `path`, resolve the `file_type` tag and extract.
    ///
    /// Checks run in a fixed order: the path must exist, then the tag must
    /// name a supported type, then that type's backend must be available.
    pub fn parse(&self, path: &Path, file_type: &str) -> Result<ParsedDocument, DocumentError> {
        if !path.exists() {
            return Err(DocumentError::FileNotFound(path.to_path_buf()));
        }
        let file_type: FileType = file_type.parse()?;
        self.extract(path, file_type)
    }

    /// Extract from a path already known to exist.
    pub fn extract(
        &self,
        path: &Path,
        file_type: FileType,
    ) -> Result<ParsedDocument, DocumentError> {
        tracing::debug!(path = %path.display(), %file_type, "dispatching");

        let parsed = match file_type {
            FileType::Pdf => {
                let backend = self.pdf.get()?;
                let pages = guarded(file_type, || backend.extract_pages(path))?;
                assemble_pdf(&pages)
            }
            FileType::Docx => {
                let backend = self.docx.get()?;
                let body = guarded(file_type, || backend.read_body(path))?;
                assemble_docx(&body)
            }
        };

        tracing::info!(
            path = %path.display(),
            %file_type,
            words = parsed.metadata.word_count(),
            "extraction complete"
        );
        Ok(parsed)
    }
}

/// Run a backend call, turning both its error and any panic it raises into
/// [`DocumentError::Extraction`].
fn guarded<T>(
    file_type: FileType,
    call: impl FnOnce() -> Result<T, BackendError>,
) -> Result<T, DocumentError> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            tracing::debug!(%file_type, error = %err, "backend error");
            Err(DocumentError::extraction(file_type, err))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!(%file_type, reason = %message, "backend panicked");
            Err(DocumentError::extraction(
                file_type,
                format!("backend panicked: {message}"),
            ))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
