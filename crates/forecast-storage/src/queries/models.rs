//! Model artifact records and guarded model removal.

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::Connection;
use tracing::info;

use forecast_core::models::timestamps::now_timestamp;
use forecast_core::{ModelRecord, StoreResult};

use super::exec::{execute, json_text, opt_json_column, query_optional, query_rows, text};
use crate::artifacts::remove_artifacts_after_commit;
use crate::connection::with_transaction;

const MODEL_COLUMNS: &str =
    "model_id, job_id, model_path, created_at, last_used_at, is_active, metadata";

fn map_model(row: &rusqlite::Row<'_>) -> rusqlite::Result<ModelRecord> {
    Ok(ModelRecord {
        model_id: row.get(0)?,
        job_id: row.get(1)?,
        model_path: row.get(2)?,
        created_at: row.get(3)?,
        last_used_at: row.get(4)?,
        is_active: row.get(5)?,
        metadata: opt_json_column(row, 6)?,
    })
}

pub fn create_model_record(
    conn: &Connection,
    model_id: &str,
    job_id: &str,
    model_path: &str,
    metadata: Option<&serde_json::Value>,
) -> StoreResult<()> {
    execute(
        conn,
        "INSERT INTO models (model_id, job_id, model_path, created_at, is_active, metadata)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        &[
            text(model_id),
            text(job_id),
            text(model_path),
            text(now_timestamp()),
            metadata.map_or(Value::Null, json_text),
        ],
    )?;
    Ok(())
}

/// Make `model_id` the single active model. Returns false if it does not exist.
pub fn set_model_active(conn: &Connection, model_id: &str) -> StoreResult<bool> {
    with_transaction(conn, |conn| {
        if get_model(conn, model_id)?.is_none() {
            return Ok(false);
        }
        execute(conn, "UPDATE models SET is_active = 0 WHERE is_active = 1", &[])?;
        execute(
            conn,
            "UPDATE models SET is_active = 1, last_used_at = ?2 WHERE model_id = ?1",
            &[text(model_id), text(now_timestamp())],
        )?;
        Ok(true)
    })
}

/// Record that a model was just used. Returns false if it does not exist.
pub fn touch_model(conn: &Connection, model_id: &str) -> StoreResult<bool> {
    let updated = execute(
        conn,
        "UPDATE models SET last_used_at = ?2 WHERE model_id = ?1",
        &[text(model_id), text(now_timestamp())],
    )?;
    Ok(updated > 0)
}

pub fn get_model(conn: &Connection, model_id: &str) -> StoreResult<Option<ModelRecord>> {
    let sql = format!("SELECT {MODEL_COLUMNS} FROM models WHERE model_id = ?1");
    query_optional(conn, &sql, &[text(model_id)], map_model)
}

/// All models, most recently used first.
pub fn list_models(conn: &Connection) -> StoreResult<Vec<ModelRecord>> {
    let sql = format!(
        "SELECT {MODEL_COLUMNS} FROM models
         ORDER BY COALESCE(last_used_at, created_at) DESC, model_id"
    );
    query_rows(conn, &sql, &[], map_model)
}

/// Delete model rows and everything that references them.
///
/// Dependents go first (prediction rows, prediction summaries, training
/// results) since every relationship is RESTRICT. Unknown ids are skipped.
/// Returns `(model_id, model_path)` for each row actually removed. Does not
/// open a transaction and touches no files.
pub fn delete_model_rows(conn: &Connection, model_ids: &[String]) -> StoreResult<Vec<(String, String)>> {
    let mut removed = Vec::with_capacity(model_ids.len());

    for model_id in model_ids {
        let id = [text(model_id.as_str())];
        let Some(path) = query_optional(
            conn,
            "SELECT model_path FROM models WHERE model_id = ?1",
            &id,
            |row| row.get::<_, String>(0),
        )?
        else {
            continue;
        };

        execute(
            conn,
            "DELETE FROM fact_predictions WHERE result_id IN
                (SELECT result_id FROM prediction_results WHERE model_id = ?1)",
            &id,
        )?;
        execute(conn, "DELETE FROM prediction_results WHERE model_id = ?1", &id)?;
        execute(conn, "DELETE FROM training_results WHERE model_id = ?1", &id)?;
        execute(conn, "DELETE FROM models WHERE model_id = ?1", &id)?;

        removed.push((model_id.clone(), path));
    }

    Ok(removed)
}

/// Delete a batch of models: rows in one transaction, then artifact files.
///
/// A file is deleted only if its path lies inside `models_root`. A model with
/// an unsafe path still loses its row and is still reported. Returns the ids
/// whose rows were removed.
pub fn delete_models_by_ids(
    conn: &Connection,
    models_root: &Path,
    model_ids: &[String],
) -> StoreResult<Vec<String>> {
    let removed = with_transaction(conn, |conn| delete_model_rows(conn, model_ids))?;
    let files = remove_artifacts_after_commit(conn, models_root, &removed);
    info!(rows = removed.len(), files, "Deleted models");
    Ok(removed.into_iter().map(|(id, _)| id).collect())
}

/// Delete one model row and, if its path is safe, its artifact file.
/// Returns false if the model does not exist.
pub fn delete_model_record_and_file(
    conn: &Connection,
    models_root: &Path,
    model_id: &str,
) -> StoreResult<bool> {
    let removed = delete_models_by_ids(conn, models_root, &[model_id.to_string()])?;
    Ok(!removed.is_empty())
}
