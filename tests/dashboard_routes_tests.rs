//! Route-level coverage for the dashboard API: status codes and payload
//! shape, against a context preloaded without any network access.

use padron::data::record::CanonicalRecord;
use padron::refresh::AppContext;
use padron::server::routes::route_request;
use padron::source::SourceConfig;

fn record(cedula: &str, ciudad: &str, lider: &str, voto: bool) -> CanonicalRecord {
    CanonicalRecord {
        cedula: cedula.to_string(),
        nombre: format!("N{cedula}"),
        ciudad: ciudad.to_string(),
        lider: lider.to_string(),
        mesa: cedula.to_string(),
        latitud: 4.5,
        longitud: -74.1,
        reporto_voto: voto,
        ..CanonicalRecord::default()
    }
}

fn preloaded_context() -> AppContext {
    let ctx = AppContext::new(SourceConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: "test".to_string(),
        table: "votos".to_string(),
    });
    ctx.dataset().set_full(
        vec![
            record("1", "Cali", "Marta", true),
            record("2", "Bogotá", "Marta", false),
            record("3", "Cali", "Pedro", true),
        ],
        1,
    );
    ctx
}

#[test]
fn health_returns_200_with_service_name() {
    let ctx = preloaded_context();
    let response = route_request(&ctx, "GET", "/api/health", "");
    assert_eq!(response.status_code, 200);
    assert!(response.body.contains("padron-api"));
}

#[test]
fn dashboard_payload_carries_records_and_projections() {
    let ctx = preloaded_context();
    let response = route_request(&ctx, "GET", "/api/dashboard", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");

    let payload: serde_json::Value = serde_json::from_str(&response.body).expect("json");
    assert_eq!(payload["records"].as_array().map(Vec::len), Some(3));
    assert_eq!(payload["stats"]["total"], 3);
    assert_eq!(payload["stats"]["reportados"], 2);
    assert_eq!(payload["hasTelefono"], false);
    assert_eq!(payload["totalLoaded"], 3);
    assert_eq!(payload["leaderChart"]["labels"][0], "Marta");
    assert_eq!(payload["mapPoints"].as_array().map(Vec::len), Some(3));
    assert_eq!(payload["mapPoints"][0]["color"], "#28a745");
    assert_eq!(payload["mapPoints"][1]["color"], "#dc3545");
}

#[test]
fn apply_filters_restricts_the_filtered_view() {
    let ctx = preloaded_context();
    let response = route_request(&ctx, "POST", "/api/filters/apply", r#"{"ciudad":"Cali"}"#);
    assert_eq!(response.status_code, 200);

    let payload: serde_json::Value = serde_json::from_str(&response.body).expect("json");
    assert_eq!(payload["records"].as_array().map(Vec::len), Some(2));
    assert_eq!(payload["criteria"]["ciudad"], "Cali");
    // Option lists still come from the full dataset.
    assert_eq!(payload["filters"]["ciudades"].as_array().map(Vec::len), Some(2));
}

#[test]
fn reset_filters_restores_the_full_view() {
    let ctx = preloaded_context();
    route_request(&ctx, "POST", "/api/filters/apply", r#"{"ciudad":"Cali"}"#);
    let response = route_request(&ctx, "POST", "/api/filters/reset", "");
    assert_eq!(response.status_code, 200);

    let payload: serde_json::Value = serde_json::from_str(&response.body).expect("json");
    assert_eq!(payload["records"].as_array().map(Vec::len), Some(3));
    assert_eq!(payload["criteria"]["ciudad"], serde_json::Value::Null);
}

#[test]
fn malformed_filter_criteria_return_400() {
    let ctx = preloaded_context();
    let response = route_request(&ctx, "POST", "/api/filters/apply", "{not json");
    assert_eq!(response.status_code, 400);
    assert!(response.body.contains("Invalid filter criteria"));
}

#[test]
fn export_streams_csv_with_a_dated_attachment_name() {
    let ctx = preloaded_context();
    let response = route_request(&ctx, "GET", "/api/export", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "text/csv; charset=utf-8");
    let disposition = response.content_disposition.expect("disposition");
    assert!(disposition.starts_with("attachment; filename=\"padron_"));
    assert!(disposition.ends_with(".csv\""));
    assert!(response.body.lines().next().expect("header").contains("Cédula"));
    assert_eq!(response.body.lines().count(), 4);
}

#[test]
fn export_respects_the_active_filter() {
    let ctx = preloaded_context();
    route_request(&ctx, "POST", "/api/filters/apply", r#"{"reportoVoto":true}"#);
    let response = route_request(&ctx, "GET", "/api/export", "");
    assert_eq!(response.body.lines().count(), 3);
}

#[test]
fn manual_refresh_with_unreachable_source_returns_502_and_keeps_data() {
    let ctx = preloaded_context();
    let response = route_request(&ctx, "POST", "/api/refresh", "");
    assert_eq!(response.status_code, 502);
    assert!(response.body.contains("error"));
    assert_eq!(ctx.dataset().full().len(), 3);
}

#[test]
fn unknown_routes_return_404() {
    let ctx = preloaded_context();
    let response = route_request(&ctx, "GET", "/api/unknown", "");
    assert_eq!(response.status_code, 404);
}

#[test]
fn index_page_serves_the_dashboard_shell() {
    let ctx = preloaded_context();
    let response = route_request(&ctx, "GET", "/", "");
    assert_eq!(response.status_code, 200);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.body.contains("filter-ciudad"));
    assert!(response.body.contains("leader-chart"));
}
