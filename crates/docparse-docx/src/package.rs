//! OPC package access: locating the main document part and reading parts
//! with a size cap.

use std::io::{Read, Seek};

use zip::ZipArchive;
use zip::result::ZipError;

use crate::DocxError;
use crate::xml;

const ROOT_RELS: &str = "_rels/.rels";
const DEFAULT_MAIN_PART: &str = "word/document.xml";
const OFFICE_DOCUMENT_SUFFIX: &str = "/officeDocument";

/// Upper bound on the buffer reserved up front from a part's declared size.
const PREALLOC_LIMIT: u64 = 1024 * 1024;

pub struct Package<R> {
    archive: ZipArchive<R>,
    max_part_bytes: u64,
}

impl<R: Read + Seek> Package<R> {
    pub fn open(reader: R, max_part_bytes: u64) -> Result<Self, DocxError> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
            max_part_bytes,
        })
    }

    /// Name of the main document part, from the package relationships when
    /// present, otherwise the conventional `word/document.xml`.
    pub fn main_part_name(&mut self) -> Result<String, DocxError> {
        let rels = match self.read_part(ROOT_RELS) {
            Ok(bytes) => bytes,
            Err(DocxError::MissingPart(_)) => {
                tracing::warn!("package has no {ROOT_RELS}, assuming {DEFAULT_MAIN_PART}");
                return Ok(DEFAULT_MAIN_PART.to_string());
            }
            Err(e) => return Err(e),
        };
        let root = xml::parse(&rels).map_err(|message| DocxError::Xml {
            part: ROOT_RELS.to_string(),
            message,
        })?;

        let target = root
            .elements()
            .filter(|e| e.name == "Relationship")
            .filter(|e| {
                e.attr(None, "Type")
                    .is_some_and(|t| t.ends_with(OFFICE_DOCUMENT_SUFFIX))
            })
            .find_map(|e| e.attr(None, "Target"))
            .map(|t| t.trim_start_matches('/').to_string());

        Ok(target.unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()))
    }

    /// Read a part fully, refusing parts whose uncompressed size exceeds
    /// the configured limit.
    pub fn read_part(&mut self, name: &str) -> Result<Vec<u8>, DocxError> {
        let limit = self.max_part_bytes;
        let file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Err(DocxError::MissingPart(name.to_string())),
            Err(e) => return Err(e.into()),
        };

        if file.size() > limit {
            return Err(DocxError::PartTooLarge {
                part: name.to_string(),
                limit,
            });
        }

        // The declared size can lie; cap the actual read as well.
        let mut bytes = Vec::with_capacity(initial_capacity(file.size()));
        file.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
        if bytes.len() as u64 > limit {
            return Err(DocxError::PartTooLarge {
                part: name.to_string(),
                limit,
            });
        }
        Ok(bytes)
    }
}

fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared.min(PREALLOC_LIMIT)).unwrap_or(0)
}
