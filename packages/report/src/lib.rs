#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Field service report generation.
//!
//! One run reads the first page of a field service request PDF, maps its
//! lines to the eight report fields, fills the placeholders of a DOCX
//! template with them, and writes the result next to the other reports as
//! `"{WO-id}_Field Service Report_{vessel}_date.docx"`.

pub mod config;
pub mod fill;
pub mod observer;
pub mod pipeline;

pub use config::{ReportConfig, StyleConfig};
pub use fill::{FillReport, Substitution, fill_template};
pub use observer::{NullObserver, RunObserver};
pub use pipeline::{RunSummary, extract_form, generate, run, run_with, write_report};

/// Errors from any stage of a report run.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The source PDF could not be read.
    #[error(transparent)]
    Pdf(#[from] field_report_pdf::PdfError),

    /// The source text does not match the form layout.
    #[error(transparent)]
    Form(#[from] field_report_form::FormError),

    /// The template could not be read, edited, or written.
    #[error(transparent)]
    Docx(#[from] field_report_docx::DocxError),

    /// Configuration TOML failed to parse.
    #[error("Config parse error: {0}")]
    Config(toml::de::Error),

    /// File system error outside the template and source reads.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configured font size has no half-point representation.
    #[error("Invalid font size: {0}pt")]
    InvalidFontSize(f32),

    /// Placeholders were missing from the template and the run requires
    /// all of them.
    #[error("Placeholders not found in template: {}", .0.join(", "))]
    UnmatchedPlaceholders(Vec<String>),
}
