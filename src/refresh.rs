//! Refresh orchestration: fetch → normalize → dataset replacement, plus the
//! fixed-interval background poller.
//!
//! Refreshes may overlap (startup, timer tick and manual trigger are not
//! mutually exclusive); each one takes a generation from a monotonic
//! counter and the dataset discards completions that arrive out of order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};

use crate::data::dataset::Dataset;
use crate::data::normalize::process_rows;
use crate::source::{fetch_rows, FetchError, SourceConfig};

pub const DEFAULT_REFRESH_SECS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Human-readable refresh state for the status collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshStatus {
    pub level: StatusLevel,
    pub message: String,
    /// RFC3339 instant of the last applied refresh, absent until one lands.
    pub last_update: Option<String>,
}

impl Default for RefreshStatus {
    fn default() -> RefreshStatus {
        RefreshStatus {
            level: StatusLevel::Info,
            message: "Esperando la primera carga".to_string(),
            last_update: None,
        }
    }
}

/// Explicitly owned application state, passed to the server and the poller
/// instead of living in globals: the source settings, the dataset, the
/// refresh generation counter and the surfaced status.
#[derive(Debug)]
pub struct AppContext {
    pub source: SourceConfig,
    dataset: Mutex<Dataset>,
    generation: AtomicU64,
    status: Mutex<RefreshStatus>,
}

impl AppContext {
    pub fn new(source: SourceConfig) -> AppContext {
        AppContext {
            source,
            dataset: Mutex::new(Dataset::new()),
            generation: AtomicU64::new(0),
            status: Mutex::new(RefreshStatus::default()),
        }
    }

    pub fn dataset(&self) -> MutexGuard<'_, Dataset> {
        self.dataset.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> RefreshStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn set_status(&self, level: StatusLevel, message: String, touch_update: bool) {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        status.level = level;
        status.message = message;
        if touch_update {
            status.last_update = Some(Utc::now().to_rfc3339());
        }
    }
}

/// What one refresh attempt produced. `applied` is false when a newer
/// refresh already replaced the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    pub records: usize,
    pub applied: bool,
}

/// One full refresh: fetch all rows, normalize, replace the dataset if this
/// attempt is still the newest. On transport failure the dataset is left
/// untouched and the error is surfaced through the status.
pub fn refresh_once(ctx: &AppContext) -> Result<RefreshReport, FetchError> {
    let generation = ctx.next_generation();
    ctx.set_status(
        StatusLevel::Info,
        "Cargando datos desde la fuente...".to_string(),
        false,
    );

    let rows = match fetch_rows(&ctx.source) {
        Ok(rows) => rows,
        Err(err) => {
            error!(generation, %err, "refresh failed");
            ctx.set_status(StatusLevel::Error, format!("Error: {err}"), false);
            return Err(err);
        }
    };

    let records = process_rows(&rows);
    let count = records.len();
    let applied = ctx.dataset().set_full(records, generation);

    if applied {
        if count == 0 {
            ctx.set_status(
                StatusLevel::Warning,
                "Sin datos en la fuente".to_string(),
                true,
            );
        } else {
            ctx.set_status(
                StatusLevel::Success,
                format!("Datos cargados: {count} registros"),
                true,
            );
        }
        info!(generation, records = count, "refresh applied");
    } else {
        info!(generation, records = count, "stale refresh discarded");
    }

    Ok(RefreshReport {
        records: count,
        applied,
    })
}

/// Starts the fixed-interval poller. Failures are logged and surfaced via
/// the status; the timer keeps retrying unconditionally, without backoff.
pub fn spawn_poller(ctx: Arc<AppContext>, every: Duration) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("padron-poller".to_string())
        .spawn(move || loop {
            thread::sleep(every);
            let _ = refresh_once(&ctx);
        })
}
