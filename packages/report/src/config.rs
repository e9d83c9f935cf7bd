//! Run configuration.
//!
//! Every field has a default, so an empty TOML file (or no file at all)
//! reproduces the stock behavior: read `file_name.pdf`, fill `report.docx`,
//! write into the current directory with Arial 10pt as the default font.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ReportError;

/// Paths and options for one report run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Source PDF form.
    pub source: PathBuf,
    /// DOCX report template.
    pub template: PathBuf,
    /// Directory the filled report is written to.
    pub output_dir: PathBuf,
    /// Layout TOML describing the source form. The embedded field service
    /// request layout is used when unset.
    pub layout: Option<PathBuf>,
    /// Default paragraph style applied to the report.
    pub style: StyleConfig,
    /// Fail before writing if any placeholder is missing from the template.
    pub require_all_placeholders: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("file_name.pdf"),
            template: PathBuf::from("report.docx"),
            output_dir: PathBuf::from("."),
            layout: None,
            style: StyleConfig::default(),
            require_all_placeholders: false,
        }
    }
}

impl ReportConfig {
    /// Reads a configuration TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Io`] if the file cannot be read and
    /// [`ReportError::Config`] if it is not valid configuration TOML.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ReportError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let config: Self = toml::from_str(&contents).map_err(ReportError::Config)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Font applied to the template's `Normal` style.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Font family for ASCII and high-ANSI text.
    pub font_family: String,
    /// Font size in points.
    pub font_size_pt: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_owned(),
            font_size_pt: 10.0,
        }
    }
}
