//! Stage notifications for a report run.
//!
//! [`RunObserver`] lets a front end show what a run extracted and replaced
//! while the run is still in progress, before the report is written.

use field_report_form_models::ExtractedForm;

use crate::FillReport;

/// Receives the intermediate results of [`crate::run_with`].
pub trait RunObserver {
    /// Called once the source form has been mapped to report fields.
    fn extracted(&self, form: &ExtractedForm);

    /// Called once the template has been filled, before any placeholder
    /// check and before the report is written.
    fn filled(&self, fill: &FillReport);
}

/// A [`RunObserver`] that ignores every notification.
pub struct NullObserver;

impl RunObserver for NullObserver {
    fn extracted(&self, _form: &ExtractedForm) {}
    fn filled(&self, _fill: &FillReport) {}
}
