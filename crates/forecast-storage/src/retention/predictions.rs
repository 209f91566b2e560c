use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use forecast_core::models::timestamps::cutoff_timestamp;
use forecast_core::StoreResult;

use super::{days_or_default, RetentionEngine};
use crate::connection::with_transaction;
use crate::queries::exec::{execute, text};

impl RetentionEngine {
    /// Delete prediction summaries dated before the cutoff, with their rows.
    /// Returns the number of prediction rows removed.
    pub fn cleanup_predictions(&self, conn: &Connection, days_to_keep: Option<u32>) -> StoreResult<u64> {
        let days = days_or_default(days_to_keep, self.config.prediction_days, "days_to_keep")?;
        let cutoff = [text(cutoff_timestamp(Utc::now(), days))];

        let (rows, summaries) = with_transaction(conn, |conn| {
            let rows = execute(
                conn,
                "DELETE FROM fact_predictions WHERE result_id IN
                    (SELECT result_id FROM prediction_results WHERE prediction_date < ?1)",
                &cutoff,
            )?;
            let summaries = execute(
                conn,
                "DELETE FROM prediction_results WHERE prediction_date < ?1",
                &cutoff,
            )?;
            Ok((rows as u64, summaries as u64))
        })?;

        info!(rows, summaries, days_kept = days, "Cleaned up predictions");
        Ok(rows)
    }
}
