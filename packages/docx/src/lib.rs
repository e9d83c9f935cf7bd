#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Just enough of the DOCX document model to fill a report template.
//!
//! A [`TemplateDocument`] keeps every part of the source package. Only
//! `word/document.xml` and `word/styles.xml` are parsed into an
//! [`xml::XmlDocument`] tree; everything else (images, headers, relations)
//! is carried through byte-for-byte on save.
//!
//! Text access follows the usual word-processing model: a paragraph's text
//! is the concatenation of its runs, and a table cell's text is its
//! paragraphs joined by newlines.

mod body;
mod document;
mod style;
pub mod xml;

pub use body::{Alignment, Cell, Paragraph, Row, Table};
pub use document::{DOCUMENT_PART, STYLES_PART, TemplateDocument};
pub use style::HalfPoints;

/// Errors from reading, editing, or writing a DOCX package.
#[derive(Debug, thiserror::Error)]
pub enum DocxError {
    /// File system error.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The package is not a readable zip archive.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An XML part is not well-formed.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A required package part is absent.
    #[error("Package has no '{0}' part")]
    MissingPart(String),

    /// The styles part has no style with the given name.
    #[error("No paragraph style named '{0}'")]
    MissingStyle(String),

    /// A part parsed but does not have the expected structure.
    #[error("Malformed document: {0}")]
    Malformed(String),
}
