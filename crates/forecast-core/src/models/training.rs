//! Hyperparameter configs and training results.

use serde::{Deserialize, Serialize};

/// A row of `configs`. Immutable once created apart from the active flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub config_id: String,
    pub config: serde_json::Value,
    pub is_active: bool,
    pub created_at: String,
}

/// A row of `training_results`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResultRecord {
    pub result_id: String,
    pub job_id: String,
    pub model_id: String,
    pub config_id: String,
    pub metrics: serde_json::Value,
    pub duration: Option<f64>,
}

/// One entry of a "top configs by metric" ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRanking {
    pub config_id: String,
    pub config: serde_json::Value,
    pub is_active: bool,
    pub metric_value: Option<f64>,
}
