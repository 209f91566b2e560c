//! RecoveryAction: what a caller should do with a failed operation.

use std::fmt;

use super::{DatabaseErrorKind, StoreError};

/// Recommended recovery action for a failed store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Correct the input (missing file, bad table, unknown metric) and call again.
    FixInput,
    /// Transient: the store was unreachable or busy.
    Retry,
    /// Cannot be handled by the caller; surface it.
    Escalate,
}

impl RecoveryAction {
    pub fn for_error(error: &StoreError) -> Self {
        match error {
            StoreError::NotFound { .. } | StoreError::Validation(_) | StoreError::InvalidMetric => {
                Self::FixInput
            }
            StoreError::Connectivity(_) => Self::Retry,
            StoreError::Database(e) if e.kind() == DatabaseErrorKind::Busy => Self::Retry,
            StoreError::Database(_) | StoreError::Io(_) | StoreError::Config(_) => Self::Escalate,
        }
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixInput => write!(f, "FixInput"),
            Self::Retry => write!(f, "Retry"),
            Self::Escalate => write!(f, "Escalate"),
        }
    }
}
