//! Raw row and canonical record shapes.
//!
//! The remote table store returns rows as JSON objects with arbitrary column
//! names and loosely typed scalar cells. `RawRecord` captures one row as-is;
//! `CanonicalRecord` is the fixed, typed shape the rest of the app works with.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One scalar cell as delivered by the source. Coercions in the normalizer
/// are total over this union; nested arrays/objects are rejected at row
/// conversion instead.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
}

impl RawValue {
    fn from_json(value: &Value) -> Option<RawValue> {
        match value {
            Value::String(s) => Some(RawValue::Str(s.clone())),
            Value::Number(n) => n.as_f64().map(RawValue::Num),
            Value::Bool(b) => Some(RawValue::Bool(*b)),
            Value::Null => Some(RawValue::Null),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// String form used for all text-typed canonical fields.
    /// Integral numbers print without a fractional part so document and
    /// table identifiers survive numeric-typed source columns.
    pub fn stringify(&self) -> String {
        match self {
            RawValue::Str(s) => s.trim().to_string(),
            RawValue::Num(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            RawValue::Bool(b) => b.to_string(),
            RawValue::Null => String::new(),
        }
    }
}

/// One source row: ordered field name → raw value pairs. Order matters for
/// last-wins resolution when two input columns map to the same canonical
/// field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, RawValue)>,
}

impl RawRecord {
    pub fn new() -> RawRecord {
        RawRecord::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: RawValue) {
        self.fields.push((key.into(), value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Converts one JSON row into a raw record. Fails if the row is not an
    /// object or contains a nested array/object cell; the batch processor
    /// treats that as a per-record recoverable failure.
    pub fn from_row(row: &Value) -> Result<RawRecord, RowError> {
        let object = row.as_object().ok_or(RowError::NotObject)?;
        let mut record = RawRecord::new();
        for (key, value) in object {
            let raw = RawValue::from_json(value).ok_or_else(|| RowError::UnsupportedCell {
                field: key.clone(),
            })?;
            record.push(key.clone(), raw);
        }
        Ok(record)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    NotObject,
    UnsupportedCell { field: String },
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotObject => write!(f, "row is not a JSON object"),
            Self::UnsupportedCell { field } => {
                write!(f, "field '{field}' holds a nested value")
            }
        }
    }
}

/// The canonical, typed record every valid source row normalizes into.
/// Unmapped input columns pass through in `extra` (lenient schema).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub lider: String,
    pub nombre: String,
    pub apellidos: String,
    pub cedula: String,
    pub ciudad: String,
    pub puesto_votacion: String,
    pub mesa: String,
    pub latitud: f64,
    pub longitud: f64,
    pub reporto_voto: bool,
    pub telefono: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl CanonicalRecord {
    /// Retention rule: a record is kept only when it carries a document
    /// number and at least part of a name.
    pub fn is_retainable(&self) -> bool {
        !self.cedula.is_empty() && (!self.nombre.is_empty() || !self.apellidos.is_empty())
    }

    /// True when the record carries plottable, non-zero coordinates.
    pub fn has_coordinates(&self) -> bool {
        self.latitud != 0.0 && self.longitud != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_row_accepts_scalar_cells() {
        let row = json!({"cedula": "007", "lat": 4.5, "voto": true, "obs": null});
        let record = RawRecord::from_row(&row).expect("convert");
        let fields: Vec<_> = record.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(fields.len(), 4);
        assert!(fields.contains(&"cedula".to_string()));
    }

    #[test]
    fn from_row_rejects_nested_cells() {
        let row = json!({"cedula": "1", "tags": ["a", "b"]});
        let err = RawRecord::from_row(&row).unwrap_err();
        assert_eq!(
            err,
            RowError::UnsupportedCell {
                field: "tags".to_string()
            }
        );
    }

    #[test]
    fn from_row_rejects_non_object() {
        assert_eq!(
            RawRecord::from_row(&json!([1, 2])).unwrap_err(),
            RowError::NotObject
        );
    }

    #[test]
    fn stringify_keeps_leading_zeros_and_integral_numbers() {
        assert_eq!(RawValue::Str("  007  ".to_string()).stringify(), "007");
        assert_eq!(RawValue::Num(3001234567.0).stringify(), "3001234567");
        assert_eq!(RawValue::Num(4.57).stringify(), "4.57");
        assert_eq!(RawValue::Null.stringify(), "");
        assert_eq!(RawValue::Bool(true).stringify(), "true");
    }

    #[test]
    fn canonical_record_serializes_with_canonical_spellings() {
        let record = CanonicalRecord {
            cedula: "1".to_string(),
            nombre: "Ana".to_string(),
            puesto_votacion: "Colegio Central".to_string(),
            reporto_voto: true,
            ..CanonicalRecord::default()
        };
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["puestoVotacion"], "Colegio Central");
        assert_eq!(value["reportoVoto"], true);
    }
}
