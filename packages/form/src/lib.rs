#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Layout-driven field extraction from source form text.
//!
//! A [`LayoutDefinition`] describes where a form's fields sit: which window
//! of non-blank lines to keep ([`clean_lines`]) and, for each line in that
//! window, which labels to strip and how to split what remains
//! ([`map_fields`]). Layouts are plain TOML, so a new form revision is a
//! data change rather than a code change. The layout the tool ships with
//! is embedded at compile time and returned by [`default_layout`].

pub mod layout;
pub mod lines;
pub mod mapper;
pub mod registry;

use field_report_form_models::{FieldKey, MissingField};

pub use layout::{LayoutDefinition, LineRule, LineWindow, parse_layout_toml};
pub use lines::clean_lines;
pub use mapper::map_fields;
pub use registry::{default_layout, load_layout};

/// Errors raised while cleaning lines or mapping them to fields.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// The source has fewer non-blank lines than the layout window needs.
    #[error("Structure error: found {found} non-blank lines, layout requires {required}")]
    Structure {
        /// Number of lines available.
        found: usize,
        /// Number of lines the layout requires.
        required: usize,
    },

    /// A required label was not present on its line.
    #[error("Value error: label '{label}' not found on form line {line}")]
    LabelNotFound {
        /// Line index within the layout window.
        line: usize,
        /// The label text that was expected.
        label: String,
    },

    /// A line had no whitespace-delimited token where one was expected.
    #[error("Value error: no {what} token on form line {line}")]
    MissingToken {
        /// Line index within the layout window.
        line: usize,
        /// What the token was expected to be (e.g. `"work order id"`).
        what: &'static str,
    },

    /// A field had no value once every rule ran.
    #[error("Value error: no value for field '{0}'")]
    MissingField(FieldKey),

    /// A layout file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path to the layout file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Layout TOML failed to parse.
    #[error("Layout parse error: {0}")]
    Layout(#[from] toml::de::Error),

    /// Layout parsed but is not usable.
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
}

impl From<MissingField> for FormError {
    fn from(e: MissingField) -> Self {
        Self::MissingField(e.0)
    }
}
