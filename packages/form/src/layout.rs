//! Config-driven form layout definition.
//!
//! [`LayoutDefinition`] captures everything positional about a source form
//! in a serializable struct: the window of non-blank lines holding the
//! fields and an ordered list of [`LineRule`]s, one per used line.

use std::collections::BTreeSet;

use field_report_form_models::FieldKey;
use serde::Deserialize;

use crate::FormError;

// ── Top-level layout ─────────────────────────────────────────────────────

/// A complete positional layout for one source form.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutDefinition {
    /// Unique identifier (e.g., `"field_service_request"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Index of the first kept line among the non-blank lines.
    pub first_line: usize,
    /// Number of lines kept, starting at `first_line`.
    pub line_count: usize,
    /// Per-line parse rules, applied in order.
    pub rules: Vec<LineRule>,
}

/// Slice bounds applied to the non-blank lines of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineWindow {
    /// Index of the first kept line.
    pub first_line: usize,
    /// Number of lines kept.
    pub line_count: usize,
}

impl LineWindow {
    /// Minimum number of non-blank lines the window needs.
    #[must_use]
    pub const fn required_lines(self) -> usize {
        self.first_line + self.line_count
    }
}

impl LayoutDefinition {
    /// The line window this layout reads.
    #[must_use]
    pub const fn window(&self) -> LineWindow {
        LineWindow {
            first_line: self.first_line,
            line_count: self.line_count,
        }
    }

    /// Checks the layout can produce a complete field set.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidLayout`] if a rule points outside the
    /// window, a field is written twice or never, there is not exactly one
    /// work order rule, or a label or prefix is empty.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.line_count == 0 {
            return Err(self.invalid("line_count must be at least 1"));
        }

        let mut seen = BTreeSet::new();
        let mut work_order_rules = 0usize;

        for rule in &self.rules {
            if rule.line() >= self.line_count {
                return Err(self.invalid(&format!(
                    "rule for line {} is outside the {}-line window",
                    rule.line(),
                    self.line_count
                )));
            }

            let (strip, strip_optional) = rule.labels();
            if strip.iter().chain(strip_optional).any(String::is_empty) {
                return Err(self.invalid(&format!("empty label on line {}", rule.line())));
            }

            if let LineRule::WorkOrderCase {
                work_order_prefix, ..
            } = rule
            {
                work_order_rules += 1;
                if work_order_prefix.is_empty() {
                    return Err(self.invalid("work_order_prefix must not be empty"));
                }
            }

            if let LineRule::DatedName {
                name_label: Some(label),
                ..
            } = rule
                && label.is_empty()
            {
                return Err(self.invalid(&format!("empty name_label on line {}", rule.line())));
            }

            for field in rule.fields() {
                if !seen.insert(field) {
                    return Err(self.invalid(&format!("field '{field}' is written twice")));
                }
            }
        }

        if work_order_rules != 1 {
            return Err(self.invalid(&format!(
                "expected exactly one work_order_case rule, found {work_order_rules}"
            )));
        }

        if let Some(missing) = FieldKey::ALL.iter().find(|k| !seen.contains(k)) {
            return Err(self.invalid(&format!("no rule produces field '{missing}'")));
        }

        Ok(())
    }

    fn invalid(&self, message: &str) -> FormError {
        FormError::InvalidLayout(format!("{}: {message}", self.id))
    }
}

// ── Line rules ───────────────────────────────────────────────────────────

/// How to turn one line of the window into field values.
///
/// Labels in `strip` must be present on the line; labels in
/// `strip_optional` are removed only when present. Every occurrence of a
/// label is removed, in listed order, required labels first.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineRule {
    /// Strip labels and trim; the rest is the value.
    Text {
        /// Line index within the window.
        line: usize,
        /// Field receiving the value.
        field: FieldKey,
        /// Required labels.
        #[serde(default)]
        strip: Vec<String>,
        /// Labels removed when present.
        #[serde(default)]
        strip_optional: Vec<String>,
    },
    /// `"WO-12345 (Case-9)"`: the first token is the work order id, the
    /// parenthesised remainder is the case.
    WorkOrderCase {
        /// Line index within the window.
        line: usize,
        /// Field receiving the rewritten work order number.
        work_order_field: FieldKey,
        /// Field receiving the case identifier.
        case_field: FieldKey,
        /// Required labels.
        #[serde(default)]
        strip: Vec<String>,
        /// Labels removed when present.
        #[serde(default)]
        strip_optional: Vec<String>,
        /// Prefix of the printed id (e.g. `"WO-"`).
        work_order_prefix: String,
        /// Replacement for the prefix in the field value (e.g. `"000"`).
        work_order_replacement: String,
    },
    /// `"3/2/2024 Vessel Name The Mariner"`: the first token is a date,
    /// the remainder after `name_label` is the value.
    DatedName {
        /// Line index within the window.
        line: usize,
        /// Field receiving the name.
        field: FieldKey,
        /// Required labels.
        #[serde(default)]
        strip: Vec<String>,
        /// Labels removed when present.
        #[serde(default)]
        strip_optional: Vec<String>,
        /// Required label between the date and the name.
        #[serde(default)]
        name_label: Option<String>,
    },
}

impl LineRule {
    /// Line index within the window.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Text { line, .. }
            | Self::WorkOrderCase { line, .. }
            | Self::DatedName { line, .. } => *line,
        }
    }

    /// Required and optional labels.
    #[must_use]
    pub fn labels(&self) -> (&[String], &[String]) {
        match self {
            Self::Text {
                strip,
                strip_optional,
                ..
            }
            | Self::WorkOrderCase {
                strip,
                strip_optional,
                ..
            }
            | Self::DatedName {
                strip,
                strip_optional,
                ..
            } => (strip, strip_optional),
        }
    }

    /// Fields this rule writes.
    #[must_use]
    pub fn fields(&self) -> Vec<FieldKey> {
        match self {
            Self::Text { field, .. } | Self::DatedName { field, .. } => vec![*field],
            Self::WorkOrderCase {
                work_order_field,
                case_field,
                ..
            } => vec![*work_order_field, *case_field],
        }
    }
}

/// Parses and validates a layout from TOML.
///
/// # Errors
///
/// Returns [`FormError::Layout`] on malformed TOML and
/// [`FormError::InvalidLayout`] if validation fails.
pub fn parse_layout_toml(toml_str: &str) -> Result<LayoutDefinition, FormError> {
    let layout: LayoutDefinition = toml::from_str(toml_str)?;
    layout.validate()?;
    Ok(layout)
}
