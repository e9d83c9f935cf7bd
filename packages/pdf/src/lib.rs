#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! First-page text extraction for single-page source forms.
//!
//! The field report tool only ever reads page one of the source PDF. This
//! crate renders that page to plain text with pure-Rust extraction
//! ([`pdf_extract`]) and splits the result into raw lines for the line
//! cleaner downstream.

use std::path::Path;

use pdf_extract::{Document, PlainTextOutput, output_doc_page};

/// Page number (1-based) of the only page the tool reads.
const FIRST_PAGE: u32 = 1;

/// Errors specific to reading the source PDF.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// The source file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not a readable PDF or its first page holds no text
    /// (corrupted, encrypted with a password, or scanned).
    #[error("PDF format error: {0}")]
    Format(String),
}

/// Extracts the plain text of the first page of the PDF at `path`.
///
/// # Errors
///
/// * [`PdfError::Io`] if the file cannot be read.
/// * [`PdfError::Format`] if the file cannot be parsed, has no pages, or
///   the first page yields no text.
pub fn extract_first_page_text(path: &Path) -> Result<String, PdfError> {
    let bytes = std::fs::read(path).map_err(|e| PdfError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    log::debug!("Read {} bytes from {}", bytes.len(), path.display());

    extract_first_page_text_from_mem(&bytes)
}

/// Same as [`extract_first_page_text`] for a PDF already in memory.
///
/// Only page 1 is rendered, so content on later pages cannot fail the
/// read. Documents encrypted with an empty user password are decrypted.
///
/// # Errors
///
/// Returns [`PdfError::Format`] if the bytes are not a readable PDF with
/// text on its first page.
pub fn extract_first_page_text_from_mem(bytes: &[u8]) -> Result<String, PdfError> {
    let mut doc = Document::load_mem(bytes)
        .map_err(|e| PdfError::Format(format!("failed to load PDF: {e}")))?;

    // The loader already applies the empty password when it can.
    if doc.is_encrypted() && doc.encryption_state.is_none() {
        doc.decrypt("")
            .map_err(|e| PdfError::Format(format!("PDF is password protected: {e}")))?;
    }

    let pages = doc.get_pages();
    log::debug!("PDF has {} page(s)", pages.len());
    if !pages.contains_key(&FIRST_PAGE) {
        return Err(PdfError::Format("PDF has no pages".to_owned()));
    }

    let mut text = String::new();
    output_doc_page(&doc, &mut PlainTextOutput::new(&mut text), FIRST_PAGE)
        .map_err(|e| PdfError::Format(format!("failed to extract text from page 1: {e}")))?;

    if text.trim().is_empty() {
        return Err(PdfError::Format(
            "first page contains no extractable text".to_owned(),
        ));
    }

    log::debug!("Extracted {} characters of text from page 1", text.len());

    Ok(text)
}

/// Reads the first page of the PDF at `path` and splits it into lines.
///
/// # Errors
///
/// See [`extract_first_page_text`].
pub fn extract_first_page_lines(path: &Path) -> Result<Vec<String>, PdfError> {
    let text = extract_first_page_text(path)?;
    let lines = split_lines(&text);

    log::info!("Read {} raw lines from {}", lines.len(), path.display());

    Ok(lines)
}

/// Splits `text` at every line boundary: `\n`, `\r\n`, `\r`, vertical tab,
/// form feed, the file/group/record separators, NEL, and the Unicode line
/// and paragraph separators.
///
/// A trailing boundary does not produce a final empty line.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
            }
            '\n' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}'
            | '\u{2029}' => {
                lines.push(std::mem::take(&mut current));
            }
            other => current.push(other),
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
