//! Placeholder substitution in the report template.
//!
//! Paragraph placeholders are replaced wherever they occur inside a body
//! paragraph's text. Table-cell placeholders only match a cell whose whole
//! text is the placeholder; a cell reading `[ticket] extra` is left alone.
//! Replaced cells are centered.

use field_report_docx::{Alignment, HalfPoints, TemplateDocument};
use field_report_form_models::{FieldKey, FieldSet, PlaceholderTarget};
use serde::Serialize;

use crate::ReportError;
use crate::config::StyleConfig;

/// One placeholder replacement made in the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
    /// Field whose value was written.
    pub field: FieldKey,
    /// The placeholder token that was found.
    pub placeholder: &'static str,
    /// Where it was found.
    pub target: PlaceholderTarget,
}

/// Outcome of filling a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FillReport {
    /// Replacements in the order they were made.
    pub substitutions: Vec<Substitution>,
    /// Placeholders that matched nothing in the template.
    pub unmatched: Vec<&'static str>,
}

impl FillReport {
    /// Whether every placeholder was found at least once.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Applies the default style and substitutes every placeholder.
///
/// # Errors
///
/// Returns [`ReportError::InvalidFontSize`] if the configured size cannot
/// be expressed in half-points, and [`ReportError::Docx`] if the template
/// has no `Normal` paragraph style.
pub fn fill_template(
    doc: &mut TemplateDocument,
    fields: &FieldSet,
    style: &StyleConfig,
) -> Result<FillReport, ReportError> {
    let size = HalfPoints::from_points(style.font_size_pt)
        .ok_or(ReportError::InvalidFontSize(style.font_size_pt))?;
    doc.set_default_font(&style.font_family, size)?;

    let mut report = FillReport::default();

    for key in FieldKey::ALL
        .into_iter()
        .filter(|k| k.target() == PlaceholderTarget::Paragraph)
    {
        replace_in_paragraphs(doc, key, fields.get(key), &mut report);
    }

    let cell_keys: Vec<FieldKey> = FieldKey::ALL
        .into_iter()
        .filter(|k| k.target() == PlaceholderTarget::TableCell)
        .collect();
    replace_in_cells(doc, &cell_keys, fields, &mut report);

    report.unmatched = FieldKey::ALL
        .iter()
        .filter(|k| !report.substitutions.iter().any(|s| s.field == **k))
        .map(|k| k.placeholder())
        .collect();

    for placeholder in &report.unmatched {
        log::warn!("Placeholder {placeholder} not found in template");
    }

    Ok(report)
}

fn replace_in_paragraphs(
    doc: &mut TemplateDocument,
    key: FieldKey,
    value: &str,
    report: &mut FillReport,
) {
    let placeholder = key.placeholder();
    for mut paragraph in doc.paragraphs_mut() {
        let text = paragraph.text();
        if text.contains(placeholder) {
            paragraph.set_text(&text.replace(placeholder, value));
            record(report, key);
        }
    }
}

fn replace_in_cells(
    doc: &mut TemplateDocument,
    keys: &[FieldKey],
    fields: &FieldSet,
    report: &mut FillReport,
) {
    for mut table in doc.tables_mut() {
        for mut row in table.rows() {
            for mut cell in row.cells() {
                for &key in keys {
                    if cell.text() != key.placeholder() {
                        continue;
                    }
                    cell.set_text(fields.get(key));
                    for mut paragraph in cell.paragraphs() {
                        paragraph.set_alignment(Alignment::Center);
                    }
                    record(report, key);
                }
            }
        }
    }
}

fn record(report: &mut FillReport, key: FieldKey) {
    log::info!("Found {} and modified", key.placeholder());
    report.substitutions.push(Substitution {
        field: key,
        placeholder: key.placeholder(),
        target: key.target(),
    });
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    const STYLES: &str = concat!(
        r#"<w:styles xmlns:w="urn:w">"#,
        r#"<w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/></w:style>"#,
        r#"</w:styles>"#,
    );

    fn document(paragraphs: &[&str], cells: &[&str]) -> TemplateDocument {
        let mut xml = String::from(r#"<w:document xmlns:w="urn:w"><w:body>"#);
        for p in paragraphs {
            xml.push_str(&format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"));
        }
        xml.push_str("<w:tbl><w:tr>");
        for c in cells {
            xml.push_str(&format!("<w:tc><w:p><w:r><w:t>{c}</w:t></w:r></w:p></w:tc>"));
        }
        xml.push_str("</w:tr></w:tbl></w:body></w:document>");
        TemplateDocument::from_xml_parts(&xml, STYLES).unwrap()
    }

    fn fields() -> FieldSet {
        let values: BTreeMap<FieldKey, String> = [
            (FieldKey::AttendanceDate, "3/1/2024"),
            (FieldKey::Location, "Port X"),
            (FieldKey::Ticket, "ACME"),
            (FieldKey::WorkOrder, "00012345"),
            (FieldKey::Case, "Case-9"),
            (FieldKey::Vessel, "The Mariner"),
            (FieldKey::AntennaSerial, "SN001"),
            (FieldKey::AntennaModel, "ModelZ"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_owned()))
        .collect();
        FieldSet::try_from_map(values).unwrap()
    }

    const ALL_CELLS: &[&str] = &[
        "[location]",
        "[ticket]",
        "[wo]",
        "[case]",
        "[vessel]",
        "[antenna_serial]",
        "[antenna_model]",
    ];

    #[test]
    fn fills_paragraphs_and_cells() {
        let mut doc = document(&["Report date: attendance_date, final"], ALL_CELLS);
        let report = fill_template(&mut doc, &fields(), &StyleConfig::default()).unwrap();

        assert!(report.is_complete(), "{:?}", report.unmatched);
        assert_eq!(report.substitutions.len(), 8);
        assert_eq!(report.substitutions[0].placeholder, "attendance_date");
        assert_eq!(report.substitutions[0].target, PlaceholderTarget::Paragraph);

        assert_eq!(doc.paragraph_texts(), vec!["Report date: 3/1/2024, final"]);
        assert_eq!(
            doc.table_texts()[0][0],
            vec![
                "Port X",
                "ACME",
                "00012345",
                "Case-9",
                "The Mariner",
                "SN001",
                "ModelZ"
            ]
        );
    }

    #[test]
    fn cell_with_extra_text_is_left_alone() {
        let mut doc = document(&[], &["[ticket] extra", "[wo]"]);
        let report = fill_template(&mut doc, &fields(), &StyleConfig::default()).unwrap();

        assert_eq!(doc.table_texts()[0][0], vec!["[ticket] extra", "00012345"]);
        assert!(report.unmatched.contains(&"[ticket]"));
        assert!(!report.unmatched.contains(&"[wo]"));
    }

    #[test]
    fn attendance_date_is_not_replaced_in_cells() {
        let mut doc = document(&[], &["attendance_date"]);
        let report = fill_template(&mut doc, &fields(), &StyleConfig::default()).unwrap();

        assert_eq!(doc.table_texts()[0][0], vec!["attendance_date"]);
        assert!(report.unmatched.contains(&"attendance_date"));
    }

    #[test]
    fn missing_placeholders_are_reported_not_fatal() {
        let mut doc = document(&["No placeholders here"], &["[vessel]"]);
        let report = fill_template(&mut doc, &fields(), &StyleConfig::default()).unwrap();

        assert_eq!(report.substitutions.len(), 1);
        assert_eq!(report.unmatched.len(), 7);
        assert!(!report.is_complete());
    }

    #[test]
    fn second_fill_is_a_no_op() {
        let mut doc = document(&["Date attendance_date"], ALL_CELLS);
        fill_template(&mut doc, &fields(), &StyleConfig::default()).unwrap();
        let paragraphs = doc.paragraph_texts();
        let tables = doc.table_texts();

        let again = fill_template(&mut doc, &fields(), &StyleConfig::default()).unwrap();
        assert!(again.substitutions.is_empty());
        assert_eq!(doc.paragraph_texts(), paragraphs);
        assert_eq!(doc.table_texts(), tables);
    }

    #[test]
    fn every_occurrence_in_a_paragraph_is_replaced() {
        let mut doc = document(&["attendance_date to attendance_date"], &[]);
        fill_template(&mut doc, &fields(), &StyleConfig::default()).unwrap();
        assert_eq!(doc.paragraph_texts(), vec!["3/1/2024 to 3/1/2024"]);
    }

    #[test]
    fn invalid_font_size_is_rejected() {
        let mut doc = document(&[], &[]);
        let style = StyleConfig {
            font_size_pt: 0.0,
            ..StyleConfig::default()
        };
        let err = fill_template(&mut doc, &fields(), &style).unwrap_err();
        assert!(matches!(err, ReportError::InvalidFontSize(_)), "{err}");
    }

    #[test]
    fn report_serializes_placeholders() {
        let mut doc = document(&[], &["[case]"]);
        let report = fill_template(&mut doc, &fields(), &StyleConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["substitutions"][0]["placeholder"], "[case]");
        assert_eq!(json["substitutions"][0]["target"], "table_cell");
        assert_eq!(json["unmatched"].as_array().unwrap().len(), 7);
    }
}
