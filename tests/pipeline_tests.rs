//! End-to-end pipeline coverage: raw fetched rows through normalization,
//! retention and the derived projections.

use std::path::Path;

use serde_json::{json, Value};

use padron::data::normalize::process_rows;
use padron::data::projections::{city_summary, filter_options, has_telefono, statistics};

fn fixture_rows(name: &str) -> Vec<Value> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let raw = std::fs::read_to_string(&path).expect("read fixture");
    serde_json::from_str(&raw).expect("parse fixture")
}

#[test]
fn fixture_batch_normalizes_retains_and_skips() {
    let rows = fixture_rows("sample_rows.json");
    let records = process_rows(&rows);

    // 5 rows: one missing cedula, one with a nested cell; 3 survive.
    assert_eq!(records.len(), 3);

    let ana = &records[0];
    assert_eq!(ana.lider, "Marta");
    assert_eq!(ana.cedula, "00123");
    assert_eq!(ana.puesto_votacion, "Colegio Central");
    assert_eq!(ana.latitud, 3.45);
    assert_eq!(ana.longitud, -76.53);
    assert!(ana.reporto_voto);
    assert_eq!(ana.telefono, "+57 300 123 4567");
    assert_eq!(ana.extra.get("barrio").map(String::as_str), Some("Centro"));

    let ruiz = &records[1];
    assert_eq!(ruiz.nombre, "");
    assert_eq!(ruiz.apellidos, "Ruiz");
    assert_eq!(ruiz.telefono, "+57 300 123 4567");
    assert!(!ruiz.reporto_voto);

    assert_eq!(records[2].cedula, "789");
}

#[test]
fn fixture_batch_feeds_consistent_projections() {
    let rows = fixture_rows("sample_rows.json");
    let records = process_rows(&rows);

    let stats = statistics(&records);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.ciudades, 2);
    assert_eq!(stats.reportados, 1);
    assert_eq!(stats.porcentaje_reportado, 33.3);

    let cities = city_summary(&records);
    let cali = cities.iter().find(|g| g.label == "Cali").expect("Cali group");
    assert_eq!(cali.total, 2);
    assert_eq!(cali.reported, 1);

    let options = filter_options(&records);
    assert_eq!(options.ciudades, vec!["Bogotá", "Cali"]);
    assert_eq!(options.mesas, vec!["2", "3", "12"]);
    assert!(has_telefono(&records));
}

#[test]
fn three_row_scenario_drops_the_incomplete_record() {
    let rows = vec![
        json!({"cedula": "1", "nombre": "Ana", "ciudad": "Cali", "voto": "si"}),
        json!({"cedula": "", "nombre": "Bob"}),
        json!({"cedula": "2", "apellidos": "Ruiz", "ciudad": "Cali", "voto": "no"}),
    ];
    let records = process_rows(&rows);

    let cedulas: Vec<&str> = records.iter().map(|r| r.cedula.as_str()).collect();
    assert_eq!(cedulas, vec!["1", "2"]);

    let cities = city_summary(&records);
    assert_eq!(cities.len(), 1);
    assert_eq!(cities[0].label, "Cali");
    assert_eq!(cities[0].total, 2);
    assert_eq!(cities[0].reported, 1);
}

#[test]
fn empty_batch_is_an_empty_dataset_not_an_error() {
    let records = process_rows(&[]);
    assert!(records.is_empty());
    assert_eq!(statistics(&records).porcentaje_reportado, 0.0);
}
