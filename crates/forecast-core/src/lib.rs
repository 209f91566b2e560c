//! # forecast-core
//!
//! Foundation crate for the forecast store.
//! Defines errors, config, row types, logging bootstrap and the input guards
//! (path safety, metric whitelist) that every storage operation runs through.
//! `forecast-storage` depends on this.

pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod security;

// Re-export the most commonly used types at the crate root.
pub use config::{RetentionConfig, StorageConfig, StoreConfig};
pub use errors::error_code::StoreErrorCode;
pub use errors::{DatabaseError, DatabaseErrorKind, RecoveryAction, StoreError, StoreResult};
pub use security::{is_path_safe, resolve_within, validate_metric_name, Metric};
pub use models::{
    ConfigRanking, ConfigRecord, HistoricalCleanup, JobRecord, JobStatus, JobStatusEntry,
    ModelRecord, PredictionRow, PredictionSummary, TrainingResultRecord, MULTIINDEX_COLUMNS,
    POINT_COLUMN, PREDICTION_MONTH_COLUMN, QUANTILE_COLUMNS,
};
