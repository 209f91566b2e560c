//! Prediction summaries, the entity dimension and per-entity prediction rows.

use rusqlite::types::Value;
use rusqlite::Connection;

use forecast_core::{PredictionRow, StoreError, StoreResult, MULTIINDEX_COLUMNS};

use super::exec::{execute, json_text, opt_text, query_optional, real, text};

/// Id of the dimension row for `entity`, inserting it on first sight.
pub fn get_or_create_multiindex_id(conn: &Connection, entity: &[String]) -> StoreResult<i64> {
    if entity.len() != MULTIINDEX_COLUMNS.len() {
        return Err(StoreError::Validation(format!(
            "entity key must have {} components",
            MULTIINDEX_COLUMNS.len()
        )));
    }
    let params: Vec<Value> = entity.iter().map(|v| text(v.as_str())).collect();

    execute(
        conn,
        "INSERT INTO dim_multiindex_mapping (barcode, artist, album, cover_type, price_category,
             release_type, recording_decade, release_decade, style, record_year)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
         ON CONFLICT DO NOTHING",
        &params,
    )?;

    let id = query_optional(
        conn,
        "SELECT multiindex_id FROM dim_multiindex_mapping
         WHERE barcode = ?1 AND artist = ?2 AND album = ?3 AND cover_type = ?4
           AND price_category = ?5 AND release_type = ?6 AND recording_decade = ?7
           AND release_decade = ?8 AND style = ?9 AND record_year = ?10",
        &params,
        |row| row.get::<_, i64>(0),
    )?;
    id.ok_or_else(|| StoreError::Validation("entity key could not be resolved".to_string()))
}

/// Insert the summary row of one ingestion run.
#[allow(clippy::too_many_arguments)]
pub fn insert_prediction_result(
    conn: &Connection,
    result_id: &str,
    job_id: &str,
    model_id: &str,
    prediction_date: &str,
    prediction_month: &str,
    output_path: Option<&str>,
    summary_metrics: &serde_json::Value,
) -> StoreResult<()> {
    execute(
        conn,
        "INSERT INTO prediction_results
             (result_id, job_id, model_id, prediction_date, prediction_month, output_path, summary_metrics)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        &[
            text(result_id),
            text(job_id),
            text(model_id),
            text(prediction_date),
            text(prediction_month),
            opt_text(output_path),
            json_text(summary_metrics),
        ],
    )?;
    Ok(())
}

/// Insert one prediction row under `result_id`.
pub fn insert_prediction_row(conn: &Connection, result_id: &str, row: &PredictionRow) -> StoreResult<()> {
    let multiindex_id = get_or_create_multiindex_id(conn, &row.entity)?;
    let [q05, q25, q50, q75, q95] = row.quantiles;
    execute(
        conn,
        "INSERT INTO fact_predictions
             (result_id, multiindex_id, prediction_month, point_forecast,
              quantile_05, quantile_25, quantile_50, quantile_75, quantile_95)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        &[
            text(result_id),
            Value::Integer(multiindex_id),
            text(row.prediction_month.as_str()),
            real(row.point_forecast),
            real(q05),
            real(q25),
            real(q50),
            real(q75),
            real(q95),
        ],
    )?;
    Ok(())
}

pub fn count_prediction_rows(conn: &Connection) -> StoreResult<u64> {
    count(conn, "SELECT COUNT(*) FROM fact_predictions")
}

pub fn count_prediction_results(conn: &Connection) -> StoreResult<u64> {
    count(conn, "SELECT COUNT(*) FROM prediction_results")
}

fn count(conn: &Connection, sql: &str) -> StoreResult<u64> {
    let n = query_optional(conn, sql, &[], |row| row.get::<_, i64>(0))?.unwrap_or(0);
    Ok(u64::try_from(n).unwrap_or(0))
}
