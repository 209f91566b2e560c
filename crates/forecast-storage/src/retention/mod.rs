//! Retention engine: age- and count-based cleanup of predictions, historical
//! facts and models.
//!
//! Each operation runs in exactly one transaction on the connection it is
//! given, so a failure part-way through a batch removes nothing. Model
//! artifact files are deleted only after the row deletions commit.

mod historical;
mod models;
mod predictions;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;
use tracing::info;

use forecast_core::{RetentionConfig, StoreConfig, StoreError, StoreResult};

use crate::artifacts::sweep_orphaned_artifacts;

/// Cleanup operations bound to a retention policy and a models root.
#[derive(Debug, Clone)]
pub struct RetentionEngine {
    config: RetentionConfig,
    models_root: PathBuf,
}

impl RetentionEngine {
    pub fn new(config: RetentionConfig, models_root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            models_root: models_root.into(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.retention.clone(), config.storage.models_dir.clone())
    }

    pub fn config(&self) -> &RetentionConfig {
        &self.config
    }

    pub fn models_root(&self) -> &Path {
        &self.models_root
    }

    /// Run every cleanup with the configured defaults, then sweep orphaned
    /// artifact files. Stops at the first failure and returns it.
    pub fn run_cleanup_job(&self, conn: &Connection) -> StoreResult<()> {
        info!("Retention cleanup started");

        let predictions = self.cleanup_predictions(conn, None)?;
        let historical = self.cleanup_historical_data(conn, None, None)?;
        let models = self.cleanup_models(conn, None, None)?;

        let grace = Duration::from_secs(u64::from(self.config.orphan_grace_hours) * 3600);
        let orphans = sweep_orphaned_artifacts(conn, &self.models_root, grace)?;

        info!(
            predictions,
            historical = historical.total(),
            models = models.len(),
            orphans,
            "Retention cleanup finished"
        );
        Ok(())
    }
}

/// Resolve an optional day count against its default. Zero is rejected.
fn days_or_default(requested: Option<u32>, default: u32, name: &str) -> StoreResult<u32> {
    match requested {
        Some(0) => Err(StoreError::Validation(format!("{name} must be at least 1"))),
        Some(days) => Ok(days),
        None => Ok(default),
    }
}
