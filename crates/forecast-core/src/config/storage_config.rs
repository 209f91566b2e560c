//! Storage subsystem configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};

/// Where the store lives and how connections are opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file. `None` opens an in-memory database.
    pub database_path: Option<PathBuf>,
    /// Models root: the only directory model artifacts may be deleted from.
    pub models_dir: PathBuf,
    /// Engine-level lock wait before a statement fails with busy.
    pub busy_timeout_ms: u32,
    /// Create file databases with owner-only permissions (Unix).
    pub restrict_file_permissions: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            models_dir: PathBuf::from("/var/lib/forecast/models"),
            busy_timeout_ms: 5000,
            restrict_file_permissions: true,
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> StoreResult<()> {
        if !self.models_dir.is_absolute() {
            return Err(StoreError::Config(
                "storage.models_dir must be an absolute path".to_string(),
            ));
        }
        Ok(())
    }
}
