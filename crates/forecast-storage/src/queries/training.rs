//! Training results. Every insert requires an existing job, model and config.

use rusqlite::types::Value;
use rusqlite::Connection;

use forecast_core::{StoreResult, TrainingResultRecord};

use super::exec::{execute, json_column, json_text, query_rows, real, text};

pub fn create_training_result(
    conn: &Connection,
    result_id: &str,
    job_id: &str,
    model_id: &str,
    config_id: &str,
    metrics: &serde_json::Value,
    duration: Option<f64>,
) -> StoreResult<()> {
    execute(
        conn,
        "INSERT INTO training_results (result_id, job_id, model_id, config_id, metrics, duration)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        &[
            text(result_id),
            text(job_id),
            text(model_id),
            text(config_id),
            json_text(metrics),
            duration.map_or(Value::Null, real),
        ],
    )?;
    Ok(())
}

pub fn get_training_results_for_model(
    conn: &Connection,
    model_id: &str,
) -> StoreResult<Vec<TrainingResultRecord>> {
    query_rows(
        conn,
        "SELECT result_id, job_id, model_id, config_id, metrics, duration
         FROM training_results WHERE model_id = ?1 ORDER BY result_id",
        &[text(model_id)],
        |row| {
            Ok(TrainingResultRecord {
                result_id: row.get(0)?,
                job_id: row.get(1)?,
                model_id: row.get(2)?,
                config_id: row.get(3)?,
                metrics: json_column(row, 4)?,
                duration: row.get(5)?,
            })
        },
    )
}
