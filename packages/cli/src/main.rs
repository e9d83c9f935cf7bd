#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Generates a field service report from a field service request PDF.
//!
//! ```text
//! field_report                                  # file_name.pdf + report.docx -> ./
//! field_report --source request.pdf --template fsr.docx --output-dir reports
//! field_report --config field_report.toml --require-all-placeholders
//! field_report --json
//! ```
//!
//! Flags override the values of `--config`, which in turn override the
//! built-in defaults. Set `RUST_LOG=info` to see each pipeline stage.

use std::path::PathBuf;

use clap::Parser;
use field_report::{FillReport, NullObserver, ReportConfig, RunObserver};
use field_report_form_models::ExtractedForm;

#[derive(Parser)]
#[command(
    name = "field_report",
    about = "Fill a field service report template from a request PDF"
)]
struct Cli {
    /// Configuration TOML file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Source PDF form
    #[arg(long)]
    source: Option<PathBuf>,
    /// DOCX report template
    #[arg(long)]
    template: Option<PathBuf>,
    /// Directory to write the filled report into
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Layout TOML describing the source form
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Default font family
    #[arg(long)]
    font: Option<String>,
    /// Default font size in points
    #[arg(long)]
    font_size: Option<f32>,
    /// Fail without writing if the template lacks any placeholder
    #[arg(long)]
    require_all_placeholders: bool,
    /// Print the run summary as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> Result<ReportConfig, field_report::ReportError> {
        let mut config = match &self.config {
            Some(path) => ReportConfig::load(path)?,
            None => ReportConfig::default(),
        };

        if let Some(source) = self.source {
            config.source = source;
        }
        if let Some(template) = self.template {
            config.template = template;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(layout) = self.layout {
            config.layout = Some(layout);
        }
        if let Some(font) = self.font {
            config.style.font_family = font;
        }
        if let Some(size) = self.font_size {
            config.style.font_size_pt = size;
        }
        if self.require_all_placeholders {
            config.require_all_placeholders = true;
        }

        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let json = cli.json;
    let config = cli.into_config()?;
    log::debug!("Running with {config:?}");

    if json {
        let summary = field_report::run_with(&config, &NullObserver)?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        field_report::run_with(&config, &ConsoleReport)?;
    }

    Ok(())
}

/// Prints the extracted values and each replaced placeholder as the run
/// reaches them.
struct ConsoleReport;

impl RunObserver for ConsoleReport {
    fn extracted(&self, form: &ExtractedForm) {
        println!("DATA FROM PDF:");
        for (key, value) in form.fields.iter() {
            println!("{}: {value}", key.label());
        }
        println!("\nDATA REPLACED IN REPORT:");
    }

    fn filled(&self, fill: &FillReport) {
        for substitution in &fill.substitutions {
            println!("Found {} and modified!", substitution.placeholder);
        }
    }
}
