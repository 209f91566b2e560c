//! Retention defaults applied when an operator trigger omits a parameter.

use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};

/// Engine defaults for the retention operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Prediction summaries and rows older than this are purged.
    pub prediction_days: u32,
    /// Cutoff for `fact_sales` and `fact_prices`.
    pub sales_days: u32,
    /// Cutoff for `fact_stock` and `fact_stock_changes`.
    pub stock_days: u32,
    /// Most recently used models kept regardless of age.
    pub models_to_keep: u32,
    /// Models unused for longer than this are purged.
    pub inactive_model_days: u32,
    /// Unreferenced files in the models root younger than this are left alone.
    pub orphan_grace_hours: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            prediction_days: 365,
            sales_days: 730,
            stock_days: 730,
            models_to_keep: 5,
            inactive_model_days: 30,
            orphan_grace_hours: 24,
        }
    }
}

impl RetentionConfig {
    pub fn validate(&self) -> StoreResult<()> {
        if self.prediction_days == 0
            || self.sales_days == 0
            || self.stock_days == 0
            || self.inactive_model_days == 0
        {
            return Err(StoreError::Config(
                "retention day counts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
