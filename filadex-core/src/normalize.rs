//! Field-level coercions for raw vendor records.
//!
//! Vendor payloads are quirky: the same field may arrive as a bare scalar
//! or a single-element array, numbers come as strings, and booleans are
//! `"1"`/`"0"` sentinels. [`RecordReader`] wraps one raw record and applies
//! these coercions uniformly, collecting a per-field outcome instead of
//! logging from deep inside the normalizer. A malformed field never aborts
//! the record, and a malformed record never aborts the batch.

use serde_json::{Map, Value};

use crate::fixed;

/// Outcome of coercing a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    /// Value parsed from the raw record.
    Parsed,
    /// Field was absent or unparseable; the declared default was used.
    Defaulted,
    /// Field was present but could not be coerced.
    Skipped { reason: String },
}

/// Per-record list of non-clean field outcomes, for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct RecordDiagnostics {
    entries: Vec<(&'static str, FieldOutcome)>,
}

impl RecordDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(&'static str, FieldOutcome)] {
        &self.entries
    }

    fn note(&mut self, field: &'static str, outcome: FieldOutcome) {
        if outcome != FieldOutcome::Parsed {
            self.entries.push((field, outcome));
        }
    }
}

impl std::fmt::Display for RecordDiagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, outcome) in &self.entries {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            match outcome {
                FieldOutcome::Parsed => write!(f, "{field}: ok")?,
                FieldOutcome::Defaulted => write!(f, "{field}: defaulted")?,
                FieldOutcome::Skipped { reason } => write!(f, "{field}: skipped ({reason})")?,
            }
        }
        Ok(())
    }
}

/// Unwrap the scalar-or-list quirk: a single-element array yields its first
/// element, an empty array or `null` counts as absent.
pub fn first_value(value: &Value) -> Option<&Value> {
    match value {
        Value::Null => None,
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

/// Render a scalar as text. Numbers are accepted because some vendors emit
/// the same field as a string in one record and a number in the next.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reader over one raw vendor record, accumulating field diagnostics.
pub struct RecordReader<'a> {
    fields: &'a Map<String, Value>,
    diag: RecordDiagnostics,
}

impl<'a> RecordReader<'a> {
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self {
            fields,
            diag: RecordDiagnostics::default(),
        }
    }

    fn raw(&self, name: &'static str) -> Option<&Value> {
        self.fields.get(name).and_then(first_value)
    }

    /// A required-ish text field. Absent or non-text yields an empty string
    /// plus a diagnostic; callers enforce hard requirements via
    /// [`crate::Material::validate`].
    pub fn text(&mut self, name: &'static str) -> String {
        match self.raw(name) {
            Some(value) => match scalar_text(value) {
                Some(text) => text.trim().to_string(),
                None => {
                    self.diag.note(
                        name,
                        FieldOutcome::Skipped {
                            reason: format!("expected text, got {value}"),
                        },
                    );
                    String::new()
                }
            },
            None => {
                self.diag.note(name, FieldOutcome::Defaulted);
                String::new()
            }
        }
    }

    /// A decimal field stored as a fixed-point integer at `scale`. Absent or
    /// unparseable values fall back to `default` and are recorded in the
    /// diagnostics rather than crashing the batch.
    pub fn scaled(&mut self, name: &'static str, scale: i64, default: i64) -> i64 {
        match self.raw(name) {
            Some(value) => {
                let parsed = scalar_text(value).and_then(|s| fixed::scale_decimal(&s, scale));
                match parsed {
                    Some(n) => n,
                    None => {
                        self.diag.note(
                            name,
                            FieldOutcome::Skipped {
                                reason: format!("not a decimal number: {value}"),
                            },
                        );
                        default
                    }
                }
            }
            None => {
                self.diag.note(name, FieldOutcome::Defaulted);
                default
            }
        }
    }

    /// A whole-number field (temperatures). Same fallback policy as
    /// [`Self::scaled`].
    pub fn integer(&mut self, name: &'static str, default: i64) -> i64 {
        self.scaled(name, fixed::SCALE_UNIT, default)
    }

    /// A sentinel boolean: the string `"1"` is true, everything else
    /// (including `"0"`, `""`, and absent) is false.
    pub fn flag(&mut self, name: &'static str) -> bool {
        self.raw(name)
            .and_then(scalar_text)
            .map(|s| sentinel_flag(&s))
            .unwrap_or(false)
    }

    pub fn finish(self) -> RecordDiagnostics {
        self.diag
    }
}

/// `"1"` → true; any other value → false.
pub fn sentinel_flag(raw: &str) -> bool {
    raw == "1"
}

/// Left-pad a numeric-as-string identifier with zeros to a fixed width.
/// Identifiers already at or beyond the width pass through unchanged.
pub fn pad_numeric_id(id: &str, width: usize) -> String {
    format!("{id:0>width$}")
}

/// Keep only the prefix before the vendor-internal delimiter, trimmed.
/// `"PLA Basic @Marketplace"` with `'@'` → `"PLA Basic"`.
pub fn clean_name(raw: &str, delimiter: char) -> String {
    raw.split(delimiter)
        .next()
        .unwrap_or(raw)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_scalar_and_single_element_list_normalize_identically() {
        let scalar = record(json!({ "filament_cost": "12.345" }));
        let listed = record(json!({ "filament_cost": ["12.345"] }));

        let mut a = RecordReader::new(&scalar);
        let mut b = RecordReader::new(&listed);
        assert_eq!(a.scaled("filament_cost", 100, 0), 1234);
        assert_eq!(b.scaled("filament_cost", 100, 0), 1234);
        assert!(a.finish().is_clean());
        assert!(b.finish().is_clean());
    }

    #[test]
    fn test_empty_list_counts_as_absent() {
        let fields = record(json!({ "pressure_advance": [] }));
        let mut reader = RecordReader::new(&fields);
        assert_eq!(reader.scaled("pressure_advance", 1000, 0), 0);
        let diag = reader.finish();
        assert_eq!(diag.entries(), &[("pressure_advance", FieldOutcome::Defaulted)]);
    }

    #[test]
    fn test_numeric_scalar_accepted_for_text_field() {
        let fields = record(json!({ "id": 42 }));
        let mut reader = RecordReader::new(&fields);
        assert_eq!(reader.text("id"), "42");
    }

    #[test]
    fn test_unparseable_number_falls_back_to_default() {
        let fields = record(json!({ "filament_density": "unknown" }));
        let mut reader = RecordReader::new(&fields);
        assert_eq!(reader.scaled("filament_density", 100, 0), 0);
        let diag = reader.finish();
        assert!(!diag.is_clean());
        assert!(matches!(
            diag.entries()[0].1,
            FieldOutcome::Skipped { .. }
        ));
    }

    #[test]
    fn test_flag_sentinels() {
        let fields = record(json!({
            "is_support": "1",
            "is_soluble": "0",
            "empty": "",
            "listed": ["1"],
        }));
        let mut reader = RecordReader::new(&fields);
        assert!(reader.flag("is_support"));
        assert!(!reader.flag("is_soluble"));
        assert!(!reader.flag("empty"));
        assert!(!reader.flag("absent"));
        assert!(reader.flag("listed"));
    }

    #[test]
    fn test_pad_numeric_id() {
        assert_eq!(pad_numeric_id("42", 6), "000042");
        assert_eq!(pad_numeric_id("123456", 6), "123456");
        assert_eq!(pad_numeric_id("1234567", 6), "1234567");
    }

    #[test]
    fn test_clean_name_strips_internal_suffix() {
        assert_eq!(clean_name("PLA Basic @Marketplace", '@'), "PLA Basic");
        assert_eq!(clean_name("  PETG HF  ", '@'), "PETG HF");
        assert_eq!(clean_name("Generic @BBL @X1C", '@'), "Generic");
    }
}
