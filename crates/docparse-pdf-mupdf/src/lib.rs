use std::path::Path;

use mupdf::{Document, TextPageFlags};

use docparse_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that builds without the `pdf` feature do not
/// transitively depend on it.
///
/// Header and footer exclusion are off by default so every text block on
/// the page is returned. When enabled, blocks lying entirely in the top
/// band, or starting in the bottom band, of each page are skipped.
#[derive(Debug, Clone, Default)]
pub struct MupdfBackend {
    /// Fraction of page height from bottom to exclude as footer (0.0–1.0).
    /// `None` disables footer exclusion.
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    /// `None` disables header exclusion.
    header_exclusion_ratio: Option<f32>,
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    fn open(&self, path: &Path) -> Result<Document, BackendError> {
        // Read up front so the file handle is closed before parsing starts,
        // and force the PDF handler regardless of the file's extension.
        let data = std::fs::read(path)?;
        let mut document = Document::from_bytes(&data, "application/pdf")
            .map_err(|e| BackendError::OpenError(e.to_string()))?;

        let needs_password = document
            .needs_password()
            .map_err(|e| BackendError::OpenError(e.to_string()))?;
        if needs_password {
            // Owner-password-only files open with an empty user password.
            let unlocked = document
                .authenticate("")
                .map_err(|e| BackendError::OpenError(e.to_string()))?;
            if !unlocked {
                return Err(BackendError::OpenError(
                    "document is encrypted and requires a password".into(),
                ));
            }
            tracing::debug!(path = %path.display(), "opened encrypted PDF with empty password");
        }

        Ok(document)
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let document = self.open(path)?;

        let mut pages_text = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            // Get page bounds for header/footer exclusion
            let page_bounds = page
                .bounds()
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let page_height = page_bounds.y1 - page_bounds.y0;

            let header_threshold = self
                .header_exclusion_ratio
                .map(|r| page_bounds.y0 + page_height * r);
            let footer_threshold = self
                .footer_exclusion_ratio
                .map(|r| page_bounds.y1 - page_height * r);

            let mut lines = Vec::new();
            for block in text_page.blocks() {
                let block_bounds = block.bounds();

                // Skip blocks entirely within the header region
                if let Some(threshold) = header_threshold {
                    if block_bounds.y1 <= threshold {
                        continue;
                    }
                }

                // Skip blocks whose top edge is in the footer region
                if let Some(threshold) = footer_threshold {
                    if block_bounds.y0 >= threshold {
                        continue;
                    }
                }

                for line in block.lines() {
                    let line_text: String = line
                        .chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect();
                    lines.push(line_text);
                }
            }
            pages_text.push(lines.join("\n"));
        }

        tracing::debug!(path = %path.display(), pages = pages_text.len(), "extracted PDF pages");
        Ok(pages_text)
    }
}
