#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Field keys and extracted field sets for the field service report tool.
//!
//! A source form yields exactly eight named values ([`FieldKey::ALL`]).
//! Each key knows the placeholder token that marks its slot in the report
//! template and whether that token lives in body paragraphs or in table
//! cells.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Literal text between the work order id and the vessel name in every
/// generated report file name.
pub const REPORT_TITLE: &str = "Field Service Report";

/// One of the eight values pulled from the source form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldKey {
    /// Date the technician attended the vessel.
    AttendanceDate,
    /// Port or site of attendance.
    Location,
    /// Customer ticket identifier.
    Ticket,
    /// Work order number, `000`-prefixed form.
    WorkOrder,
    /// Case identifier.
    Case,
    /// Vessel name.
    Vessel,
    /// Antenna serial number.
    AntennaSerial,
    /// Antenna model.
    AntennaModel,
}

impl FieldKey {
    /// Every key, in report order.
    pub const ALL: [Self; 8] = [
        Self::AttendanceDate,
        Self::Location,
        Self::Ticket,
        Self::WorkOrder,
        Self::Case,
        Self::Vessel,
        Self::AntennaSerial,
        Self::AntennaModel,
    ];

    /// The literal token marking this field's slot in the template.
    #[must_use]
    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::AttendanceDate => "attendance_date",
            Self::Location => "[location]",
            Self::Ticket => "[ticket]",
            Self::WorkOrder => "[wo]",
            Self::Case => "[case]",
            Self::Vessel => "[vessel]",
            Self::AntennaSerial => "[antenna_serial]",
            Self::AntennaModel => "[antenna_model]",
        }
    }

    /// Where in the template the placeholder is expected.
    #[must_use]
    pub const fn target(self) -> PlaceholderTarget {
        match self {
            Self::AttendanceDate => PlaceholderTarget::Paragraph,
            _ => PlaceholderTarget::TableCell,
        }
    }

    /// Human-readable label derived from the placeholder token
    /// (`[antenna_serial]` becomes `Antenna Serial`).
    #[must_use]
    pub fn label(self) -> String {
        let spaced = self.placeholder().replace('_', " ");
        title_case(spaced.trim_matches(|c: char| c == '[' || c == ']'))
    }
}

/// Part of the template a placeholder is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlaceholderTarget {
    /// Body paragraphs outside tables; matched by substring.
    Paragraph,
    /// Table cells; matched only when the whole cell text equals the token.
    TableCell,
}

/// A field was left without a value after mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingField(pub FieldKey);

impl std::fmt::Display for MissingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no value for field '{}'", self.0)
    }
}

impl std::error::Error for MissingField {}

/// The complete set of eight extracted values.
///
/// Construction guarantees every [`FieldKey`] has a value, so lookups
/// never fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldSet {
    values: BTreeMap<FieldKey, String>,
}

impl FieldSet {
    /// Builds a field set, requiring a value for every key.
    ///
    /// # Errors
    ///
    /// Returns [`MissingField`] naming the first key (in report order)
    /// without a value.
    pub fn try_from_map(values: BTreeMap<FieldKey, String>) -> Result<Self, MissingField> {
        if let Some(missing) = FieldKey::ALL.iter().find(|k| !values.contains_key(k)) {
            return Err(MissingField(*missing));
        }
        Ok(Self { values })
    }

    /// Value for `key`.
    #[must_use]
    pub fn get(&self, key: FieldKey) -> &str {
        self.values.get(&key).map_or("", String::as_str)
    }

    /// All `(key, value)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Everything the field mapper derives from one source form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedForm {
    /// The eight template values.
    pub fields: FieldSet,
    /// Work order id exactly as printed on the form (e.g. `WO-12345`).
    pub work_order_id: String,
    /// Request date read alongside the vessel name, if the layout has one.
    pub request_date: Option<String>,
    /// File name of the report to write.
    pub output_file_name: String,
}

/// Name of the generated report for a work order and vessel.
#[must_use]
pub fn output_file_name(work_order_id: &str, vessel: &str) -> String {
    format!("{work_order_id}_{REPORT_TITLE}_{vessel}_date.docx")
}

/// Uppercases the first letter of every alphabetic run and lowercases the
/// rest (`"antenna serial"` becomes `"Antenna Serial"`).
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}
