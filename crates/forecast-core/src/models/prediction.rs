//! Multi-quantile prediction rows and their summary.

use serde::{Deserialize, Serialize};

/// Required quantile columns, as labelled in the input table, paired with the
/// `fact_predictions` column each one lands in.
pub const QUANTILE_COLUMNS: [(&str, &str); 5] = [
    ("0.05", "quantile_05"),
    ("0.25", "quantile_25"),
    ("0.5", "quantile_50"),
    ("0.75", "quantile_75"),
    ("0.95", "quantile_95"),
];

/// Columns that together identify one time-series entity.
pub const MULTIINDEX_COLUMNS: [&str; 10] = [
    "barcode",
    "artist",
    "album",
    "cover_type",
    "price_category",
    "release_type",
    "recording_decade",
    "release_decade",
    "style",
    "record_year",
];

/// Optional point-forecast column. When absent the median quantile is used.
pub const POINT_COLUMN: &str = "point";

/// Optional per-row month column (`YYYY-MM-DD` or `YYYY-MM`).
pub const PREDICTION_MONTH_COLUMN: &str = "prediction_month";

/// One parsed input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    /// Values of [`MULTIINDEX_COLUMNS`], in order.
    pub entity: Vec<String>,
    /// First day of the forecast month, `YYYY-MM-DD`.
    pub prediction_month: String,
    pub point_forecast: f64,
    /// Values of [`QUANTILE_COLUMNS`], in order.
    pub quantiles: [f64; 5],
}

/// What an ingestion run persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub result_id: String,
    pub job_id: String,
    pub model_id: String,
    pub prediction_date: String,
    pub prediction_month: String,
    pub predictions_count: usize,
}
