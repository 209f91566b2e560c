//! Predictions ingestion: parse a tabular export, then commit the rows and
//! their summary in one transaction.

mod parser;
mod writer;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use forecast_core::{PredictionRow, PredictionSummary, StoreError, StoreResult};

use crate::connection::ConnectionProvider;

pub use parser::parse_predictions;
pub use writer::write_predictions;

fn read_rows(predictions_path: &Path) -> StoreResult<Vec<PredictionRow>> {
    if !predictions_path.is_file() {
        return Err(StoreError::NotFound {
            path: predictions_path.display().to_string(),
        });
    }
    let file = File::open(predictions_path)?;
    parse_predictions(BufReader::new(file), Utc::now().date_naive())
}

/// Ingest `predictions_path` for `job_id` / `model_id` on `conn`.
///
/// Fails with `NotFound` for a missing file and `Validation` for unparsable
/// input or missing quantile columns; nothing is written in either case.
pub fn save_predictions_to_db(
    predictions_path: &Path,
    job_id: &str,
    model_id: &str,
    conn: &Connection,
) -> StoreResult<PredictionSummary> {
    let rows = read_rows(predictions_path)?;
    let output_path = predictions_path.to_str();
    let summary = write_predictions(conn, job_id, model_id, output_path, &rows)?;
    info!(
        result_id = %summary.result_id,
        rows = summary.predictions_count,
        "Saved predictions"
    );
    Ok(summary)
}

/// Same as [`save_predictions_to_db`], acquiring the connection from `provider`.
/// An acquisition failure is returned exactly as the provider produced it.
pub fn save_predictions_with<P>(
    provider: &P,
    predictions_path: &Path,
    job_id: &str,
    model_id: &str,
) -> StoreResult<PredictionSummary>
where
    P: ConnectionProvider + ?Sized,
{
    let conn = provider.acquire()?;
    save_predictions_to_db(predictions_path, job_id, model_id, &conn)
}
