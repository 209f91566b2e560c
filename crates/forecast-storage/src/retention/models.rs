use chrono::Utc;
use rusqlite::Connection;
use tracing::info;

use forecast_core::models::timestamps::cutoff_timestamp;
use forecast_core::StoreResult;

use super::{days_or_default, RetentionEngine};
use crate::artifacts::remove_artifacts_after_commit;
use crate::connection::with_transaction;
use crate::queries::exec::query_rows;
use crate::queries::models::delete_model_rows;

impl RetentionEngine {
    /// Remove inactive models beyond the `models_to_keep` most recently used,
    /// plus any not used within `inactive_days_to_keep`. The active model is
    /// never removed. Returns the ids whose rows were deleted.
    pub fn cleanup_models(
        &self,
        conn: &Connection,
        models_to_keep: Option<u32>,
        inactive_days_to_keep: Option<u32>,
    ) -> StoreResult<Vec<String>> {
        let keep = models_to_keep.unwrap_or(self.config.models_to_keep) as usize;
        let inactive_days = days_or_default(
            inactive_days_to_keep,
            self.config.inactive_model_days,
            "inactive_days_to_keep",
        )?;
        let inactive_cutoff = cutoff_timestamp(Utc::now(), inactive_days);

        let removed = with_transaction(conn, |conn| {
            let ranked: Vec<(String, String)> = query_rows(
                conn,
                "SELECT model_id, COALESCE(last_used_at, created_at) AS last_activity
                 FROM models
                 WHERE is_active = 0
                 ORDER BY last_activity DESC, model_id",
                &[],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let doomed: Vec<String> = ranked
                .into_iter()
                .enumerate()
                .filter(|(rank, (_, last_activity))| *rank >= keep || *last_activity < inactive_cutoff)
                .map(|(_, (model_id, _))| model_id)
                .collect();

            delete_model_rows(conn, &doomed)
        })?;

        let files = remove_artifacts_after_commit(conn, &self.models_root, &removed);
        info!(
            models = removed.len(),
            files,
            models_kept = keep,
            inactive_days_kept = inactive_days,
            "Cleaned up models"
        );
        Ok(removed.into_iter().map(|(model_id, _)| model_id).collect())
    }
}
