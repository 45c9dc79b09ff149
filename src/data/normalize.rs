//! Field normalization: maps arbitrary source column names onto the
//! canonical field set and coerces each cell to its canonical type.
//!
//! Column resolution is case- and accent-insensitive against a fixed synonym
//! table. Unknown columns pass through as string-trimmed extra fields.

use serde_json::Value;
use tracing::warn;

use crate::data::record::{CanonicalRecord, RawRecord, RawValue};

/// String values accepted as a positive vote report, compared lowercased.
const REPORTED_WORDS: &[&str] = &["si", "sí", "true", "1", "yes", "verdadero"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CanonicalField {
    Lider,
    Nombre,
    Apellidos,
    Cedula,
    Ciudad,
    PuestoVotacion,
    Mesa,
    Latitud,
    Longitud,
    ReportoVoto,
    Telefono,
}

/// Resolves a folded (lowercased, trimmed, accent-stripped) column name
/// through the synonym table.
fn resolve_field(folded: &str) -> Option<CanonicalField> {
    match folded {
        "lider" => Some(CanonicalField::Lider),
        "nombre" => Some(CanonicalField::Nombre),
        "apellidos" => Some(CanonicalField::Apellidos),
        "cedula" => Some(CanonicalField::Cedula),
        "ciudad" => Some(CanonicalField::Ciudad),
        "puesto de votacion" | "puesto_de_votacion" | "puesto_votacion" | "puesto" => {
            Some(CanonicalField::PuestoVotacion)
        }
        "mesa" => Some(CanonicalField::Mesa),
        "latitud" | "lat" => Some(CanonicalField::Latitud),
        "longitud" | "long" | "lng" => Some(CanonicalField::Longitud),
        "reporto voto" | "reporto_voto" | "voto" | "reportado" => {
            Some(CanonicalField::ReportoVoto)
        }
        "telefono" | "celular" | "cel" | "phone" | "tel" | "contacto" => {
            Some(CanonicalField::Telefono)
        }
        _ => None,
    }
}

/// Strips the accented characters the source data uses so "Líder", "CÉDULA"
/// and "teléfono" all resolve like their plain spellings. Applied to lookup
/// keys only; unknown columns keep their lowercased/trimmed form.
fn fold_accents(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Coordinate cells may use a decimal comma; the first comma is normalized
/// to a point before parsing. Anything unparseable is 0.0.
fn parse_coordinate(value: &RawValue) -> f64 {
    match value {
        RawValue::Num(n) => *n,
        RawValue::Str(s) => s.trim().replacen(',', ".", 1).parse().unwrap_or(0.0),
        RawValue::Bool(_) | RawValue::Null => 0.0,
    }
}

/// Booleans are kept; everything else is stringified and matched against the
/// accepted positive words.
fn parse_reported(value: &RawValue) -> bool {
    match value {
        RawValue::Bool(b) => *b,
        other => {
            let text = other.stringify().to_lowercase();
            REPORTED_WORDS.contains(&text.as_str())
        }
    }
}

/// Formats a phone number to the `+57 XXX XXX XXXX` convention.
///
/// A 12-digit string starting with the 57 country code groups the trailing
/// ten digits 3-3-4; a bare 10-digit string gets the prefix added. Anything
/// else (short, malformed, other country codes) passes through unchanged.
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 12 && digits.starts_with("57") {
        format!("+57 {} {} {}", &digits[2..5], &digits[5..8], &digits[8..])
    } else if digits.len() == 10 {
        format!("+57 {} {} {}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        phone.to_string()
    }
}

/// Normalizes one raw row into the canonical shape. Pure and total: every
/// cell lands somewhere, later duplicate columns win.
pub fn normalize(raw: &RawRecord) -> CanonicalRecord {
    let mut record = CanonicalRecord::default();
    for (key, value) in raw.iter() {
        let column = key.trim().to_lowercase();
        match resolve_field(&fold_accents(&column)) {
            Some(CanonicalField::Lider) => record.lider = value.stringify(),
            Some(CanonicalField::Nombre) => record.nombre = value.stringify(),
            Some(CanonicalField::Apellidos) => record.apellidos = value.stringify(),
            Some(CanonicalField::Cedula) => record.cedula = value.stringify(),
            Some(CanonicalField::Ciudad) => record.ciudad = value.stringify(),
            Some(CanonicalField::PuestoVotacion) => {
                record.puesto_votacion = value.stringify()
            }
            Some(CanonicalField::Mesa) => record.mesa = value.stringify(),
            Some(CanonicalField::Latitud) => record.latitud = parse_coordinate(value),
            Some(CanonicalField::Longitud) => record.longitud = parse_coordinate(value),
            Some(CanonicalField::ReportoVoto) => {
                record.reporto_voto = parse_reported(value)
            }
            Some(CanonicalField::Telefono) => {
                record.telefono = format_phone(&value.stringify())
            }
            None => {
                record.extra.insert(column, value.stringify());
            }
        }
    }
    record
}

/// Normalizes a fetched batch. Rows that fail conversion are logged and
/// skipped; rows that normalize but miss the required fields are dropped.
/// Output order matches input order.
pub fn process_rows(rows: &[Value]) -> Vec<CanonicalRecord> {
    let mut records = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let raw = match RawRecord::from_row(row) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(row = index + 1, %err, "skipping malformed row");
                continue;
            }
        };
        let record = normalize(&raw);
        if record.is_retainable() {
            records.push(record);
        }
    }
    records
}
