//! Maps the cleaned line window to named field values.
//!
//! Each [`LineRule`] strips its labels from one line and splits what is
//! left. There is no recovery: a missing label or token means the source
//! does not match the layout, and the whole mapping fails.

use std::collections::BTreeMap;

use field_report_form_models::{ExtractedForm, FieldKey, FieldSet, output_file_name};

use crate::FormError;
use crate::layout::{LayoutDefinition, LineRule};

/// Derives the [`ExtractedForm`] from the lines kept by
/// [`crate::clean_lines`].
///
/// # Errors
///
/// * [`FormError::Structure`] if fewer lines than the layout window, or a
///   rule points past the last line.
/// * [`FormError::LabelNotFound`] / [`FormError::MissingToken`] if a line
///   does not have the expected shape.
/// * [`FormError::MissingField`] if the layout leaves a field unset.
pub fn map_fields<S: AsRef<str>>(
    lines: &[S],
    layout: &LayoutDefinition,
) -> Result<ExtractedForm, FormError> {
    if lines.len() < layout.line_count {
        return Err(FormError::Structure {
            found: lines.len(),
            required: layout.line_count,
        });
    }

    let mut values = BTreeMap::new();
    let mut work_order_id = None;
    let mut request_date = None;

    for rule in &layout.rules {
        let line_no = rule.line();
        let (strip, strip_optional) = rule.labels();
        let line = lines.get(line_no).ok_or(FormError::Structure {
            found: lines.len(),
            required: line_no + 1,
        })?;
        let text = strip_labels(line_no, line.as_ref(), strip, strip_optional)?;

        match rule {
            LineRule::Text { field, .. } => {
                values.insert(*field, text.trim().to_owned());
            }
            LineRule::WorkOrderCase {
                work_order_field,
                case_field,
                work_order_prefix,
                work_order_replacement,
                ..
            } => {
                let parsed = split_work_order_case(line_no, &text)?;
                values.insert(
                    *work_order_field,
                    parsed
                        .id
                        .replace(work_order_prefix.as_str(), work_order_replacement),
                );
                values.insert(*case_field, parsed.case);
                work_order_id = Some(parsed.id);
            }
            LineRule::DatedName {
                field, name_label, ..
            } => {
                let parsed = split_dated_name(line_no, &text, name_label.as_deref())?;
                values.insert(*field, parsed.name);
                request_date = Some(parsed.date);
            }
        }
    }

    for (key, value) in &values {
        log::debug!("{key} = {value:?}");
    }

    let fields = FieldSet::try_from_map(values)?;
    let work_order_id = work_order_id.ok_or_else(|| {
        FormError::InvalidLayout(format!("{}: no work order rule", layout.id))
    })?;
    let output_file_name = output_file_name(&work_order_id, fields.get(FieldKey::Vessel));

    log::info!("Mapped form fields for work order {work_order_id}");

    Ok(ExtractedForm {
        fields,
        work_order_id,
        request_date,
        output_file_name,
    })
}

/// Removes every occurrence of each label. Required labels must appear.
fn strip_labels(
    line_no: usize,
    line: &str,
    strip: &[String],
    strip_optional: &[String],
) -> Result<String, FormError> {
    let mut text = line.to_owned();

    for label in strip {
        if !text.contains(label.as_str()) {
            return Err(FormError::LabelNotFound {
                line: line_no,
                label: label.clone(),
            });
        }
        text = text.replace(label.as_str(), "");
    }

    for label in strip_optional {
        text = text.replace(label.as_str(), "");
    }

    Ok(text)
}

struct WorkOrderCase {
    id: String,
    case: String,
}

fn split_work_order_case(line_no: usize, text: &str) -> Result<WorkOrderCase, FormError> {
    let text = text.trim_start();
    let id = text
        .split_whitespace()
        .next()
        .ok_or(FormError::MissingToken {
            line: line_no,
            what: "work order id",
        })?
        .to_owned();

    let case = text
        .replace(id.as_str(), "")
        .trim()
        .trim_matches(|c: char| matches!(c, ' ' | '(' | ')'))
        .to_owned();

    Ok(WorkOrderCase { id, case })
}

struct DatedName {
    date: String,
    name: String,
}

fn split_dated_name(
    line_no: usize,
    text: &str,
    name_label: Option<&str>,
) -> Result<DatedName, FormError> {
    let date = text
        .split_whitespace()
        .next()
        .ok_or(FormError::MissingToken {
            line: line_no,
            what: "request date",
        })?
        .to_owned();

    let mut rest = text.replace(date.as_str(), "").trim_start().to_owned();

    if let Some(label) = name_label {
        if !rest.contains(label) {
            return Err(FormError::LabelNotFound {
                line: line_no,
                label: label.to_owned(),
            });
        }
        rest = rest.replace(label, "");
    }

    Ok(DatedName {
        date,
        name: rest.trim().to_owned(),
    })
}
