//! Row and report types shared by the storage crate and its callers.

pub mod artifact;
pub mod job;
pub mod prediction;
pub mod retention;
pub mod timestamps;
pub mod training;

pub use artifact::ModelRecord;
pub use job::{JobRecord, JobStatus, JobStatusEntry};
pub use prediction::{
    PredictionRow, PredictionSummary, MULTIINDEX_COLUMNS, POINT_COLUMN, PREDICTION_MONTH_COLUMN,
    QUANTILE_COLUMNS,
};
pub use retention::HistoricalCleanup;
pub use training::{ConfigRanking, ConfigRecord, TrainingResultRecord};
