//! Transactional write of one ingestion run.

use std::collections::BTreeSet;

use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

use forecast_core::models::timestamps::now_timestamp;
use forecast_core::{PredictionRow, PredictionSummary, StoreResult};

use crate::connection::with_transaction;
use crate::queries::predictions::{insert_prediction_result, insert_prediction_row};

/// Persist one summary row and every prediction row, all or nothing.
pub fn write_predictions(
    conn: &Connection,
    job_id: &str,
    model_id: &str,
    output_path: Option<&str>,
    rows: &[PredictionRow],
) -> StoreResult<PredictionSummary> {
    let result_id = Uuid::new_v4().to_string();
    let prediction_date = now_timestamp();
    let months: BTreeSet<&str> = rows.iter().map(|r| r.prediction_month.as_str()).collect();
    let prediction_month = months.iter().next().copied().unwrap_or_default().to_string();

    let mean_point = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.point_forecast).sum::<f64>() / rows.len() as f64
    };
    let summary_metrics = json!({
        "predictions_count": rows.len(),
        "months": months.len(),
        "mean_point_forecast": mean_point,
    });

    with_transaction(conn, |conn| {
        insert_prediction_result(
            conn,
            &result_id,
            job_id,
            model_id,
            &prediction_date,
            &prediction_month,
            output_path,
            &summary_metrics,
        )?;
        for row in rows {
            insert_prediction_row(conn, &result_id, row)?;
        }
        Ok(())
    })?;

    Ok(PredictionSummary {
        result_id,
        job_id: job_id.to_string(),
        model_id: model_id.to_string(),
        prediction_date,
        prediction_month,
        predictions_count: rows.len(),
    })
}
