//! Builds a [`DocumentParser`] from whichever backends this build carries.
//!
//! Each backend sits behind a cargo feature (`pdf`, `docx`, both on by
//! default). A backend left out of the build is still known to the parser,
//! as a [`Capability::Missing`] naming what to install, so asking for that
//! file type fails with [`DocumentError::DependencyMissing`] rather than an
//! extraction error.
//!
//! [`DocumentError::DependencyMissing`]: docparse_core::DocumentError::DependencyMissing

use docparse_core::{
    Capability, Dependency, DocumentParser, DocxBackend, FileType, PdfBackend, Settings,
};

/// What to install when the PDF backend is missing.
pub const PDF_DEPENDENCY: Dependency = Dependency {
    library: "mupdf",
    install: "cargo install docparse-cli --features pdf",
};

/// What to install when the DOCX backend is missing.
pub const DOCX_DEPENDENCY: Dependency = Dependency {
    library: "docparse-docx",
    install: "cargo install docparse-cli --features docx",
};

/// Build a parser with every compiled-in backend, configured from `settings`.
pub fn build_parser(settings: &Settings) -> DocumentParser {
    let parser = DocumentParser::new(pdf_backend(settings), docx_backend(settings));
    tracing::debug!(
        supported = ?supported_file_types(&parser),
        "document parser ready"
    );
    parser
}

/// File-type tags this build can actually extract.
fn supported_file_types(parser: &DocumentParser) -> Vec<&'static str> {
    FileType::ALL
        .into_iter()
        .filter(|ft| parser.supports(*ft))
        .map(FileType::tag)
        .collect()
}

#[cfg(feature = "pdf")]
fn pdf_backend(settings: &Settings) -> Capability<Box<dyn PdfBackend>> {
    let backend = docparse_pdf_mupdf::MupdfBackend::new()
        .with_header_exclusion(settings.pdf_header_exclusion)
        .with_footer_exclusion(settings.pdf_footer_exclusion);
    Capability::Ready(Box::new(backend))
}

#[cfg(not(feature = "pdf"))]
fn pdf_backend(_settings: &Settings) -> Capability<Box<dyn PdfBackend>> {
    Capability::Missing(PDF_DEPENDENCY)
}

#[cfg(feature = "docx")]
fn docx_backend(settings: &Settings) -> Capability<Box<dyn DocxBackend>> {
    let backend =
        docparse_docx::OoxmlBackend::new().with_max_part_bytes(settings.docx_max_part_bytes);
    Capability::Ready(Box::new(backend))
}

#[cfg(not(feature = "docx"))]
fn docx_backend(_settings: &Settings) -> Capability<Box<dyn DocxBackend>> {
    Capability::Missing(DOCX_DEPENDENCY)
}
