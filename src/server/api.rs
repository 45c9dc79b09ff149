//! JSON payload builders for the dashboard API. Route handlers stay thin;
//! everything the browser renderers need is assembled here from the shared
//! application context.

use std::fmt;

use chrono::Utc;
use serde::Serialize;

use crate::data::dataset::FilterCriteria;
use crate::data::export_csv::{export_csv, export_file_name, ExportError};
use crate::data::projections::{
    chart_series, city_summary, filter_options, has_telefono, leader_summary, statistics,
    ChartSeries, FilterOptions, Statistics,
};
use crate::data::record::CanonicalRecord;
use crate::refresh::{refresh_once, AppContext, RefreshStatus};
use crate::source::FetchError;

/// Marker colors consumed by the map renderer.
const MARKER_REPORTED: &str = "#28a745";
const MARKER_PENDING: &str = "#dc3545";

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "padron-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// One map marker: coordinate, report color and the detail fields the popup
/// shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    pub latitud: f64,
    pub longitud: f64,
    pub color: &'static str,
    pub label: String,
    pub cedula: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    pub lider: String,
    pub ciudad: String,
    pub puesto_votacion: String,
    pub mesa: String,
    pub reporto_voto: bool,
}

fn map_points(records: &[CanonicalRecord]) -> Vec<MapPoint> {
    records
        .iter()
        .filter(|record| record.has_coordinates())
        .map(|record| MapPoint {
            latitud: record.latitud,
            longitud: record.longitud,
            color: if record.reporto_voto {
                MARKER_REPORTED
            } else {
                MARKER_PENDING
            },
            label: format!("{} {}", record.nombre, record.apellidos)
                .trim()
                .to_string(),
            cedula: record.cedula.clone(),
            telefono: if record.telefono.is_empty() {
                None
            } else {
                Some(record.telefono.clone())
            },
            lider: record.lider.clone(),
            ciudad: record.ciudad.clone(),
            puesto_votacion: record.puesto_votacion.clone(),
            mesa: record.mesa.clone(),
            reporto_voto: record.reporto_voto,
        })
        .collect()
}

/// Everything one dashboard render needs in a single payload: the filtered
/// records, the derived projections, the filter state and the refresh
/// status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardPayload {
    records: Vec<CanonicalRecord>,
    has_telefono: bool,
    stats: Statistics,
    leader_chart: ChartSeries,
    city_chart: ChartSeries,
    map_points: Vec<MapPoint>,
    filters: FilterOptions,
    criteria: FilterCriteria,
    total_loaded: usize,
    status: RefreshStatus,
}

pub fn dashboard_payload(ctx: &AppContext) -> Result<String, serde_json::Error> {
    let dataset = ctx.dataset();
    let payload = DashboardPayload {
        records: dataset.filtered().to_vec(),
        has_telefono: has_telefono(dataset.full()),
        stats: statistics(dataset.filtered()),
        leader_chart: chart_series(&leader_summary(dataset.filtered())),
        city_chart: chart_series(&city_summary(dataset.filtered())),
        map_points: map_points(dataset.filtered()),
        filters: filter_options(dataset.full()),
        criteria: dataset.criteria().clone(),
        total_loaded: dataset.full().len(),
        status: ctx.status(),
    };
    drop(dataset);
    serde_json::to_string_pretty(&payload)
}

#[derive(Debug)]
pub enum FilterPayloadError {
    Parse(serde_json::Error),
    Render(serde_json::Error),
}

impl fmt::Display for FilterPayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid filter criteria: {err}"),
            Self::Render(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for FilterPayloadError {}

/// Applies the posted criteria wholesale and answers with the refreshed
/// dashboard payload.
pub fn apply_filters_payload(ctx: &AppContext, body: &str) -> Result<String, FilterPayloadError> {
    let criteria: FilterCriteria =
        serde_json::from_str(body).map_err(FilterPayloadError::Parse)?;
    ctx.dataset().apply_filter(criteria);
    dashboard_payload(ctx).map_err(FilterPayloadError::Render)
}

pub fn reset_filters_payload(ctx: &AppContext) -> Result<String, serde_json::Error> {
    ctx.dataset().reset_filter();
    dashboard_payload(ctx)
}

#[derive(Debug)]
pub enum RefreshPayloadError {
    Fetch(FetchError),
    Render(serde_json::Error),
}

impl fmt::Display for RefreshPayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RefreshPayloadError {}

/// Manual refresh trigger. A failed fetch leaves the dataset untouched and
/// surfaces the transport error.
pub fn refresh_payload(ctx: &AppContext) -> Result<String, RefreshPayloadError> {
    refresh_once(ctx).map_err(RefreshPayloadError::Fetch)?;
    dashboard_payload(ctx).map_err(RefreshPayloadError::Render)
}

/// CSV of the current filtered view plus its date-stamped download name.
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub file_name: String,
    pub csv: String,
}

pub fn export_payload(ctx: &AppContext) -> Result<ExportPayload, ExportError> {
    let dataset = ctx.dataset();
    let include_telefono = has_telefono(dataset.full());
    let csv = export_csv(dataset.filtered(), include_telefono)?;
    drop(dataset);
    Ok(ExportPayload {
        file_name: export_file_name(Utc::now().date_naive()),
        csv,
    })
}
