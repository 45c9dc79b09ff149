//! Derived views over the dataset: global statistics, per-leader and
//! per-city aggregation, chart series, and filter option lists.
//!
//! Everything here is a pure function over record slices; the aggregations
//! run over the filtered view, the option lists over the full one.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::data::record::CanonicalRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub lideres: usize,
    pub ciudades: usize,
    pub reportados: usize,
    /// Share of records with a reported vote, one decimal. An empty view
    /// reports 0.0 rather than a division-by-zero artifact.
    pub porcentaje_reportado: f64,
}

pub fn statistics(records: &[CanonicalRecord]) -> Statistics {
    let lideres: HashSet<&str> = records.iter().map(|r| r.lider.as_str()).collect();
    let ciudades: HashSet<&str> = records.iter().map(|r| r.ciudad.as_str()).collect();
    let reportados = records.iter().filter(|r| r.reporto_voto).count();
    let porcentaje_reportado = if records.is_empty() {
        0.0
    } else {
        (reportados as f64 / records.len() as f64 * 1000.0).round() / 10.0
    };
    Statistics {
        total: records.len(),
        lideres: lideres.len(),
        ciudades: ciudades.len(),
        reportados,
        porcentaje_reportado,
    }
}

/// One aggregation bucket: how many records share the label and how many of
/// those reported their vote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub label: String,
    pub total: usize,
    pub reported: usize,
}

fn group_by<F>(records: &[CanonicalRecord], key: F) -> Vec<GroupSummary>
where
    F: Fn(&CanonicalRecord) -> &str,
{
    let mut groups: Vec<GroupSummary> = Vec::new();
    let mut index_by_label: HashMap<String, usize> = HashMap::new();
    for record in records {
        let label = key(record);
        if label.is_empty() {
            continue;
        }
        let index = *index_by_label.entry(label.to_string()).or_insert_with(|| {
            groups.push(GroupSummary {
                label: label.to_string(),
                total: 0,
                reported: 0,
            });
            groups.len() - 1
        });
        groups[index].total += 1;
        if record.reporto_voto {
            groups[index].reported += 1;
        }
    }
    groups
}

/// Groups by leader in first-seen order; records without a leader are
/// omitted from the grouping.
pub fn leader_summary(records: &[CanonicalRecord]) -> Vec<GroupSummary> {
    group_by(records, |r| &r.lider)
}

/// Groups by city in first-seen order; records without a city are omitted.
pub fn city_summary(records: &[CanonicalRecord]) -> Vec<GroupSummary> {
    group_by(records, |r| &r.ciudad)
}

/// Label list plus two parallel series, the shape the chart renderers
/// consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub totals: Vec<usize>,
    pub reported: Vec<usize>,
}

pub fn chart_series(groups: &[GroupSummary]) -> ChartSeries {
    ChartSeries {
        labels: groups.iter().map(|g| g.label.clone()).collect(),
        totals: groups.iter().map(|g| g.total).collect(),
        reported: groups.iter().map(|g| g.reported).collect(),
    }
}

/// Distinct non-empty values for the filter selects, computed over the FULL
/// dataset so options do not vanish while a filter is active.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub ciudades: Vec<String>,
    pub lideres: Vec<String>,
    pub mesas: Vec<String>,
}

pub fn filter_options(full: &[CanonicalRecord]) -> FilterOptions {
    let mut options = FilterOptions {
        ciudades: distinct(full, |r| &r.ciudad),
        lideres: distinct(full, |r| &r.lider),
        mesas: distinct(full, |r| &r.mesa),
    };
    options.ciudades.sort();
    options.lideres.sort();
    options.mesas.sort_by(|a, b| compare_mesa(a, b));
    options
}

fn distinct<F>(records: &[CanonicalRecord], key: F) -> Vec<String>
where
    F: Fn(&CanonicalRecord) -> &str,
{
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| key(r))
        .filter(|value| !value.is_empty() && seen.insert(value.to_string()))
        .map(str::to_string)
        .collect()
}

/// Mesa identifiers are opaque strings but usually numeric: numeric values
/// compare numerically and sort before non-numeric ones, which compare
/// lexically. The partition keeps the ordering total over mixed data.
pub fn compare_mesa(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(left), Ok(right)) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Column-set flag for the table and export collaborators: whether any
/// record carries a phone number.
pub fn has_telefono(records: &[CanonicalRecord]) -> bool {
    records.iter().any(|r| !r.telefono.is_empty())
}
