//! CSV serialization of the filtered view for download.
//!
//! Column order mirrors the data table; the phone column appears only when
//! the dataset carries phone numbers. String fields are quoted, coordinates
//! stay numeric, the report flag is written SI/NO.

use std::fmt;

use chrono::NaiveDate;

use crate::data::record::CanonicalRecord;

#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Io(std::io::Error),
    Utf8(std::string::FromUtf8Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "failed to write csv: {err}"),
            Self::Io(err) => write!(f, "failed to flush csv: {err}"),
            Self::Utf8(err) => write!(f, "csv output was not utf-8: {err}"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Serializes the given records. `include_telefono` is the column-set flag
/// the caller computes over the full dataset, so the export layout matches
/// the table even when the filtered view happens to have no phones.
pub fn export_csv(
    records: &[CanonicalRecord],
    include_telefono: bool,
) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(Vec::new());

    let mut header = vec!["Líder", "Nombre", "Apellidos", "Cédula"];
    if include_telefono {
        header.push("Teléfono");
    }
    header.extend([
        "Ciudad",
        "Puesto de Votación",
        "Mesa",
        "Latitud",
        "Longitud",
        "Reportó Voto",
    ]);
    writer.write_record(&header).map_err(ExportError::Csv)?;

    for record in records {
        let mut row = vec![
            record.lider.clone(),
            record.nombre.clone(),
            record.apellidos.clone(),
            record.cedula.clone(),
        ];
        if include_telefono {
            row.push(record.telefono.clone());
        }
        row.extend([
            record.ciudad.clone(),
            record.puesto_votacion.clone(),
            record.mesa.clone(),
            format!("{}", record.latitud),
            format!("{}", record.longitud),
            if record.reporto_voto { "SI" } else { "NO" }.to_string(),
        ]);
        writer.write_record(&row).map_err(ExportError::Csv)?;
    }

    writer.flush().map_err(ExportError::Io)?;
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    String::from_utf8(bytes).map_err(ExportError::Utf8)
}

/// Download name for an export produced on the given date.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("padron_{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(nombre: &str, telefono: &str, voto: bool) -> CanonicalRecord {
        CanonicalRecord {
            lider: "Marta".to_string(),
            nombre: nombre.to_string(),
            apellidos: "Ruiz".to_string(),
            cedula: "00123".to_string(),
            ciudad: "Cali".to_string(),
            puesto_votacion: "Colegio Central".to_string(),
            mesa: "12".to_string(),
            latitud: 3.45,
            longitud: -76.53,
            reporto_voto: voto,
            telefono: telefono.to_string(),
            ..CanonicalRecord::default()
        }
    }

    #[test]
    fn header_includes_phone_column_only_when_flagged() {
        let with = export_csv(&[record("Ana", "+57 300 123 4567", true)], true).expect("csv");
        let without = export_csv(&[record("Ana", "", true)], false).expect("csv");
        assert!(with.lines().next().unwrap().contains("Teléfono"));
        assert!(!without.lines().next().unwrap().contains("Teléfono"));
    }

    #[test]
    fn header_order_is_fixed() {
        let csv = export_csv(&[], true).expect("csv");
        assert_eq!(
            csv.lines().next().unwrap(),
            "\"Líder\",\"Nombre\",\"Apellidos\",\"Cédula\",\"Teléfono\",\"Ciudad\",\"Puesto de Votación\",\"Mesa\",\"Latitud\",\"Longitud\",\"Reportó Voto\""
        );
    }

    #[test]
    fn rows_quote_strings_and_keep_numeric_fields_bare() {
        let csv = export_csv(&[record("Ana", "", false)], false).expect("csv");
        let row = csv.lines().nth(1).expect("data row");
        assert!(row.contains("\"Colegio Central\""));
        assert!(row.contains("00123"));
        assert!(row.contains("3.45"));
        assert!(!row.contains("\"3.45\""));
        assert!(row.ends_with("\"NO\""));
    }

    #[test]
    fn file_name_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 6).expect("date");
        assert_eq!(export_file_name(date), "padron_2026-08-06.csv");
    }
}
