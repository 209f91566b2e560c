//! Model artifacts.

use serde::{Deserialize, Serialize};

/// A row of `models`. `model_path` points at the serialized artifact and must
/// resolve inside the models root before the file may be deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub model_id: String,
    pub job_id: String,
    pub model_path: String,
    pub created_at: String,
    pub last_used_at: Option<String>,
    pub is_active: bool,
    pub metadata: Option<serde_json::Value>,
}

impl ModelRecord {
    /// Timestamp used for recency ranking.
    pub fn last_activity(&self) -> &str {
        self.last_used_at.as_deref().unwrap_or(&self.created_at)
    }
}
