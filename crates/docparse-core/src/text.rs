//! Text assembly and word counting shared by every extractor.

use crate::{DocxBody, DocxMetadata, Metadata, ParsedDocument, PdfMetadata};

/// Whitespace for splitting and trimming: Unicode `White_Space` plus the
/// ASCII information separators U+001C..U+001F.
pub fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Number of whitespace-delimited tokens in `text`.
pub fn word_count(text: &str) -> usize {
    text.split(is_whitespace).filter(|t| !t.is_empty()).count()
}

pub fn trim(text: &str) -> &str {
    text.trim_matches(is_whitespace)
}

/// Join page texts (each followed by a newline), count words on the joined
/// text and trim it.
pub fn assemble_pdf(pages: &[String]) -> ParsedDocument {
    let mut text = String::new();
    for page in pages {
        text.push_str(page);
        text.push('\n');
    }

    let word_count = word_count(&text);
    ParsedDocument {
        text: trim(&text).to_string(),
        metadata: Metadata::Pdf(PdfMetadata {
            page_count: pages.len(),
            word_count,
        }),
    }
}

/// Paragraph text first, then every table row as space-terminated cells.
///
/// Tables always come after all paragraphs, whatever their position in the
/// body. Each row keeps the space after its last cell; only the final text
/// is trimmed.
pub fn assemble_docx(body: &DocxBody) -> ParsedDocument {
    let mut text = String::new();
    for paragraph in &body.paragraphs {
        text.push_str(paragraph);
        text.push('\n');
    }

    for table in &body.tables {
        for row in &table.rows {
            for cell in row {
                text.push_str(cell);
                text.push(' ');
            }
            text.push('\n');
        }
    }

    let word_count = word_count(&text);
    ParsedDocument {
        text: trim(&text).to_string(),
        metadata: Metadata::Docx(DocxMetadata {
            paragraphs: body.paragraphs.len(),
            word_count,
        }),
    }
}
