//! In-memory dataset: the full normalized collection plus the currently
//! active filtered view.
//!
//! `filtered` is recomputed synchronously on every mutation and is always
//! the subset of `full` matching the active criteria. Refresh results carry
//! a generation token so a slow refresh finishing late cannot overwrite
//! newer data.

use serde::{Deserialize, Serialize};

use crate::data::record::CanonicalRecord;

/// Optional equality constraints; `None` or an empty string leaves the
/// field unrestricted. All present constraints are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub ciudad: Option<String>,
    pub lider: Option<String>,
    pub mesa: Option<String>,
    pub reporto_voto: Option<bool>,
}

impl FilterCriteria {
    /// Drops empty-string constraints so form submissions with blank
    /// selects behave like absent fields.
    pub fn normalized(mut self) -> FilterCriteria {
        for field in [&mut self.ciudad, &mut self.lider, &mut self.mesa] {
            if field.as_deref().is_some_and(str::is_empty) {
                *field = None;
            }
        }
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.ciudad.is_none()
            && self.lider.is_none()
            && self.mesa.is_none()
            && self.reporto_voto.is_none()
    }

    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        if let Some(ciudad) = &self.ciudad {
            if &record.ciudad != ciudad {
                return false;
            }
        }
        if let Some(lider) = &self.lider {
            if &record.lider != lider {
                return false;
            }
        }
        if let Some(mesa) = &self.mesa {
            if &record.mesa != mesa {
                return false;
            }
        }
        if let Some(reporto) = self.reporto_voto {
            if record.reporto_voto != reporto {
                return false;
            }
        }
        true
    }
}

/// Owns both record sequences. The filtered view is never mutated
/// independently; every mutation path goes through `recompute`.
#[derive(Debug, Default)]
pub struct Dataset {
    full: Vec<CanonicalRecord>,
    filtered: Vec<CanonicalRecord>,
    criteria: FilterCriteria,
    applied_generation: u64,
}

impl Dataset {
    pub fn new() -> Dataset {
        Dataset::default()
    }

    pub fn full(&self) -> &[CanonicalRecord] {
        &self.full
    }

    pub fn filtered(&self) -> &[CanonicalRecord] {
        &self.filtered
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn applied_generation(&self) -> u64 {
        self.applied_generation
    }

    /// Replaces the full collection and recomputes the filtered view under
    /// the active criteria. A result whose generation is not newer than the
    /// last applied one is discarded (returns false) so only the most
    /// recent refresh wins.
    pub fn set_full(&mut self, records: Vec<CanonicalRecord>, generation: u64) -> bool {
        if generation <= self.applied_generation {
            return false;
        }
        self.applied_generation = generation;
        self.full = records;
        self.recompute();
        true
    }

    /// Overwrites the criteria wholesale and recomputes the filtered view.
    pub fn apply_filter(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria.normalized();
        self.recompute();
    }

    /// Clears all criteria; the filtered view becomes an independent copy
    /// of the full collection.
    pub fn reset_filter(&mut self) {
        self.criteria = FilterCriteria::default();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.filtered = self
            .full
            .iter()
            .filter(|record| self.criteria.matches(record))
            .cloned()
            .collect();
    }
}
