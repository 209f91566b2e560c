//! Jobs and their status history.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a pipeline job. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A row of `jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub job_type: String,
    pub status: JobStatus,
    pub created_at: String,
    pub updated_at: String,
    pub parameters: Option<serde_json::Value>,
    pub progress: f64,
    pub error_message: Option<String>,
}

/// A row of `job_status_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusEntry {
    pub job_id: String,
    pub status: JobStatus,
    /// Percent complete, 0 to 100.
    pub progress: f64,
    pub status_message: Option<String>,
    pub updated_at: String,
}
