//! Document source seam: turn a file into per-page raw text.

use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::core::error::TagError;

/// Page separator in extracted text (the `pdftotext` convention).
pub const PAGE_BREAK: char = '\u{0C}';

/// Produces the raw text of each page of a document, in document order.
///
/// The page texts are built once per run and never mutated afterwards.
pub trait DocumentSource {
    fn extract_text(&self, path: &Path) -> Result<Vec<String>>;
}

/// Reads UTF-8 text and Markdown files.
///
/// Form feeds delimit pages; a file without them is a single page.
pub struct PlainTextSource;

impl DocumentSource for PlainTextSource {
    fn extract_text(&self, path: &Path) -> Result<Vec<String>> {
        if !path.exists() {
            return Err(TagError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let raw = fs::read_to_string(path).map_err(|e| TagError::UnreadableDocument {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(raw.split(PAGE_BREAK).map(str::to_string).collect())
    }
}
