pub mod retention_config;
pub mod storage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};

pub use retention_config::RetentionConfig;
pub use storage_config::StorageConfig;

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    pub storage: StorageConfig,
    pub retention: RetentionConfig,
}

impl StoreConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Read, parse and validate a TOML config file.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&raw).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> StoreResult<()> {
        self.storage.validate()?;
        self.retention.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = StoreConfig::from_toml("").unwrap();
        assert_eq!(config.retention.prediction_days, 365);
        assert_eq!(config.retention.models_to_keep, 5);
        assert_eq!(config.storage.busy_timeout_ms, 5000);
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = StoreConfig::from_toml(
            r#"
            [storage]
            database_path = "/var/lib/forecast/store.db"
            models_dir = "/var/lib/forecast/models"

            [retention]
            sales_days = 90
            "#,
        )
        .unwrap();
        assert_eq!(config.retention.sales_days, 90);
        assert_eq!(config.retention.stock_days, 730);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.toml");
        std::fs::write(&path, "[retention]\nmodels_to_keep = 2\n").unwrap();
        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.retention.models_to_keep, 2);
    }

    #[test]
    fn load_rejects_relative_models_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.toml");
        std::fs::write(&path, "[storage]\nmodels_dir = \"models\"\n").unwrap();
        assert!(matches!(StoreConfig::load(&path), Err(StoreError::Config(_))));
    }
}
