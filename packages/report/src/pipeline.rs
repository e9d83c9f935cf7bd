//! End-to-end report run: extract, clean, map, fill, write.

use std::path::{Path, PathBuf};

use field_report_docx::TemplateDocument;
use field_report_form::{LayoutDefinition, clean_lines, default_layout, load_layout, map_fields};
use field_report_form_models::ExtractedForm;
use field_report_pdf::extract_first_page_lines;
use serde::Serialize;

use crate::ReportError;
use crate::config::ReportConfig;
use crate::fill::{FillReport, fill_template};
use crate::observer::{NullObserver, RunObserver};

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Values read from the source form and the derived file name.
    #[serde(flatten)]
    pub form: ExtractedForm,
    /// Where the filled report was written.
    pub output_path: PathBuf,
    /// Substitutions made and placeholders left unmatched.
    #[serde(flatten)]
    pub fill: FillReport,
}

/// Runs the whole pipeline for `config`.
///
/// Nothing is written unless every earlier stage succeeds, including the
/// placeholder check when `require_all_placeholders` is set.
///
/// # Errors
///
/// Returns the first error of any stage; see [`ReportError`].
pub fn run(config: &ReportConfig) -> Result<RunSummary, ReportError> {
    run_with(config, &NullObserver)
}

/// Same as [`run`], reporting each stage's result to `observer` as soon as
/// it is available.
///
/// # Errors
///
/// Returns the first error of any stage; see [`ReportError`].
pub fn run_with(
    config: &ReportConfig,
    observer: &dyn RunObserver,
) -> Result<RunSummary, ReportError> {
    let layout = match &config.layout {
        Some(path) => load_layout(path)?,
        None => default_layout(),
    };

    let form = extract_form(&config.source, &layout)?;
    observer.extracted(&form);
    generate(form, config, observer)
}

/// Fills the configured template with `form` and writes the report.
///
/// `observer` sees the fill result before the placeholder check runs and
/// before anything is written.
///
/// # Errors
///
/// Returns [`ReportError::Docx`] if the template cannot be read or written,
/// and [`ReportError::UnmatchedPlaceholders`] (before anything is written)
/// if `require_all_placeholders` is set and the template lacks one.
pub fn generate(
    form: ExtractedForm,
    config: &ReportConfig,
    observer: &dyn RunObserver,
) -> Result<RunSummary, ReportError> {
    let mut doc = TemplateDocument::open(&config.template)?;
    let fill = fill_template(&mut doc, &form.fields, &config.style)?;
    observer.filled(&fill);

    if config.require_all_placeholders && !fill.is_complete() {
        return Err(ReportError::UnmatchedPlaceholders(
            fill.unmatched.iter().map(|p| (*p).to_owned()).collect(),
        ));
    }

    let output_path = write_report(&doc, &config.output_dir, &form.output_file_name)?;
    log::info!("Report written to {}", output_path.display());

    Ok(RunSummary {
        form,
        output_path,
        fill,
    })
}

/// Reads the source PDF and maps it to report fields with `layout`.
///
/// # Errors
///
/// Returns [`ReportError::Pdf`] if the PDF cannot be read and
/// [`ReportError::Form`] if its text does not fit the layout.
pub fn extract_form(source: &Path, layout: &LayoutDefinition) -> Result<ExtractedForm, ReportError> {
    let lines = extract_first_page_lines(source)?;
    let window = clean_lines(&lines, layout.window())?;
    Ok(map_fields(&window, layout)?)
}

/// Saves `doc` as `output_dir/file_name`, creating `output_dir` if needed.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if the directory cannot be created and
/// [`ReportError::Docx`] if the package cannot be written.
pub fn write_report(
    doc: &TemplateDocument,
    output_dir: &Path,
    file_name: &str,
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(output_dir).map_err(|e| ReportError::Io {
        path: output_dir.display().to_string(),
        source: e,
    })?;

    let path = output_dir.join(file_name);
    doc.save(&path)?;
    Ok(path)
}
