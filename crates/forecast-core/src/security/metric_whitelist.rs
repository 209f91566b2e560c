//! Closed set of metric identifiers that may appear in an ORDER BY position.
//!
//! Callers pass metric names as strings. A name is accepted only if it is one
//! of [`Metric::ALL`]; the SQL fragment is then taken from a static table, so
//! the caller's string never touches statement text.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::errors::StoreError;

/// A training metric the store can rank configs by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    ValLoss,
    ValMic,
    ValMiws,
    ValMiwsMicRatio,
    TrainLoss,
    TrainMic,
    TrainMiws,
    TrainMiwsMicRatio,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Self::ValLoss,
        Self::ValMic,
        Self::ValMiws,
        Self::ValMiwsMicRatio,
        Self::TrainLoss,
        Self::TrainMic,
        Self::TrainMiws,
        Self::TrainMiwsMicRatio,
    ];

    /// Key inside the `training_results.metrics` JSON payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValLoss => "val_loss",
            Self::ValMic => "val_MIC",
            Self::ValMiws => "val_MIWS",
            Self::ValMiwsMicRatio => "val_MIWS_MIC_Ratio",
            Self::TrainLoss => "train_loss",
            Self::TrainMic => "train_MIC",
            Self::TrainMiws => "train_MIWS",
            Self::TrainMiwsMicRatio => "train_MIWS_MIC_Ratio",
        }
    }

    /// Column expression over `training_results tr`.
    pub fn sql_fragment(&self) -> &'static str {
        match self {
            Self::ValLoss => "json_extract(tr.metrics, '$.val_loss')",
            Self::ValMic => "json_extract(tr.metrics, '$.val_MIC')",
            Self::ValMiws => "json_extract(tr.metrics, '$.val_MIWS')",
            Self::ValMiwsMicRatio => "json_extract(tr.metrics, '$.val_MIWS_MIC_Ratio')",
            Self::TrainLoss => "json_extract(tr.metrics, '$.train_loss')",
            Self::TrainMic => "json_extract(tr.metrics, '$.train_MIC')",
            Self::TrainMiws => "json_extract(tr.metrics, '$.train_MIWS')",
            Self::TrainMiwsMicRatio => "json_extract(tr.metrics, '$.train_MIWS_MIC_Ratio')",
        }
    }

    /// Coverage metrics rank descending; loss and width metrics ascending.
    pub fn higher_is_better(&self) -> bool {
        matches!(self, Self::ValMic | Self::TrainMic)
    }

    pub fn order_direction(&self) -> &'static str {
        if self.higher_is_better() {
            "DESC"
        } else {
            "ASC"
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or(StoreError::InvalidMetric)
    }
}

/// Validate a caller-supplied metric name.
///
/// The rejected value is not logged and not echoed in the error.
pub fn validate_metric_name(name: &str) -> Result<Metric, StoreError> {
    name.parse::<Metric>().inspect_err(|_| {
        warn!(allowed = Metric::ALL.len(), "Invalid metric name provided");
    })
}
