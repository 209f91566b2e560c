//! Adapters for the administrative retention triggers.
//!
//! Each synchronous trigger runs one retention operation and returns a
//! serializable report for the caller's response body. Parameters the caller
//! left out are echoed as `None`: the engine applied its configured default.
//! The full cleanup trigger hands `run_cleanup_job` to a caller-supplied
//! [`TaskSubmitter`] and returns at once.

use std::sync::Arc;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use forecast_core::{HistoricalCleanup, RecoveryAction, StoreErrorCode, StoreResult};

use crate::connection::ConnectionProvider;
use crate::retention::RetentionEngine;

pub const STATUS_OK: &str = "ok";
pub const CLEANUP_STARTED: &str = "Data retention cleanup job started";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionsCleanupReport {
    pub status: String,
    pub records_removed: u64,
    pub days_kept: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalRecordsRemoved {
    pub sales: u64,
    pub stock: u64,
    pub stock_changes: u64,
    pub prices: u64,
    pub total: u64,
}

impl From<HistoricalCleanup> for HistoricalRecordsRemoved {
    fn from(c: HistoricalCleanup) -> Self {
        Self {
            sales: c.sales,
            stock: c.stock,
            stock_changes: c.stock_changes,
            prices: c.prices,
            total: c.total(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalCleanupReport {
    pub status: String,
    pub records_removed: HistoricalRecordsRemoved,
    pub sales_days_kept: Option<u32>,
    pub stock_days_kept: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsCleanupReport {
    pub status: String,
    pub models_removed: Vec<String>,
    pub models_removed_count: usize,
    pub models_kept: Option<u32>,
    pub inactive_days_kept: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanupAck {
    pub status: String,
    pub message: String,
}

pub fn cleanup_predictions(
    engine: &RetentionEngine,
    conn: &Connection,
    days_to_keep: Option<u32>,
) -> StoreResult<PredictionsCleanupReport> {
    let records_removed = engine.cleanup_predictions(conn, days_to_keep)?;
    Ok(PredictionsCleanupReport {
        status: STATUS_OK.to_string(),
        records_removed,
        days_kept: days_to_keep,
    })
}

pub fn cleanup_historical(
    engine: &RetentionEngine,
    conn: &Connection,
    sales_days_to_keep: Option<u32>,
    stock_days_to_keep: Option<u32>,
) -> StoreResult<HistoricalCleanupReport> {
    let removed = engine.cleanup_historical_data(conn, sales_days_to_keep, stock_days_to_keep)?;
    Ok(HistoricalCleanupReport {
        status: STATUS_OK.to_string(),
        records_removed: removed.into(),
        sales_days_kept: sales_days_to_keep,
        stock_days_kept: stock_days_to_keep,
    })
}

pub fn cleanup_models(
    engine: &RetentionEngine,
    conn: &Connection,
    models_to_keep: Option<u32>,
    inactive_days_to_keep: Option<u32>,
) -> StoreResult<ModelsCleanupReport> {
    let models_removed = engine.cleanup_models(conn, models_to_keep, inactive_days_to_keep)?;
    Ok(ModelsCleanupReport {
        status: STATUS_OK.to_string(),
        models_removed_count: models_removed.len(),
        models_removed,
        models_kept: models_to_keep,
        inactive_days_kept: inactive_days_to_keep,
    })
}

/// Work handed to a [`TaskSubmitter`]. Its error is the submitter's to handle.
pub type BackgroundTask = Box<dyn FnOnce() -> StoreResult<()> + Send + 'static>;

/// Caller-owned background execution. At-most-one concurrent cleanup, retries
/// and error reporting are the submitter's concern.
pub trait TaskSubmitter {
    fn submit(&self, task: BackgroundTask);
}

/// Runs each task on a fresh named thread and logs a failure by error code
/// and recovery action.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSubmitter;

impl TaskSubmitter for ThreadSubmitter {
    fn submit(&self, task: BackgroundTask) {
        let spawned = std::thread::Builder::new()
            .name("forecast-cleanup".to_string())
            .spawn(move || {
                if let Err(e) = task() {
                    error!(
                        code = e.error_code(),
                        recovery = %RecoveryAction::for_error(&e),
                        "Background task failed"
                    );
                }
            });
        if let Err(e) = spawned {
            error!(kind = ?e.kind(), "Failed to spawn background task");
        }
    }
}

/// Schedule a full cleanup pass and acknowledge immediately.
pub fn trigger_cleanup<S>(
    submitter: &S,
    provider: Arc<dyn ConnectionProvider + Send + Sync>,
    engine: Arc<RetentionEngine>,
) -> CleanupAck
where
    S: TaskSubmitter + ?Sized,
{
    submitter.submit(Box::new(move || {
        let conn = provider.acquire()?;
        engine.run_cleanup_job(&conn)
    }));
    info!("Retention cleanup scheduled");
    CleanupAck {
        status: STATUS_OK.to_string(),
        message: CLEANUP_STARTED.to_string(),
    }
}
