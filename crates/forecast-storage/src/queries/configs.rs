//! Hyperparameter configurations and the metric-ranked read.

use rusqlite::types::Value;
use rusqlite::Connection;

use forecast_core::models::timestamps::now_timestamp;
use forecast_core::{validate_metric_name, ConfigRanking, ConfigRecord, StoreResult};

use super::exec::{execute, json_column, json_text, query_optional, query_rows, text};
use crate::connection::with_transaction;

pub fn create_config(conn: &Connection, config_id: &str, config: &serde_json::Value) -> StoreResult<()> {
    execute(
        conn,
        "INSERT INTO configs (config_id, config, is_active, created_at) VALUES (?1, ?2, 0, ?3)",
        &[text(config_id), json_text(config), text(now_timestamp())],
    )?;
    Ok(())
}

/// Make `config_id` the single active config. Returns false if it does not exist.
pub fn set_config_active(conn: &Connection, config_id: &str) -> StoreResult<bool> {
    with_transaction(conn, |conn| {
        if get_config(conn, config_id)?.is_none() {
            return Ok(false);
        }
        execute(conn, "UPDATE configs SET is_active = 0 WHERE is_active = 1", &[])?;
        execute(
            conn,
            "UPDATE configs SET is_active = 1 WHERE config_id = ?1",
            &[text(config_id)],
        )?;
        Ok(true)
    })
}

pub fn get_config(conn: &Connection, config_id: &str) -> StoreResult<Option<ConfigRecord>> {
    query_optional(
        conn,
        "SELECT config_id, config, is_active, created_at FROM configs WHERE config_id = ?1",
        &[text(config_id)],
        |row| {
            Ok(ConfigRecord {
                config_id: row.get(0)?,
                config: json_column(row, 1)?,
                is_active: row.get(2)?,
                created_at: row.get(3)?,
            })
        },
    )
}

/// Best `limit` configs ranked by their best training result on `metric_name`.
///
/// The name is checked against the metric whitelist before any statement is
/// built; an unknown name fails with [`forecast_core::StoreError::InvalidMetric`].
/// The column expression and sort direction come from the matched [`forecast_core::Metric`].
/// Configs without training results are not ranked.
pub fn get_top_configs(
    conn: &Connection,
    metric_name: &str,
    limit: u32,
    include_active: bool,
) -> StoreResult<Vec<ConfigRanking>> {
    let metric = validate_metric_name(metric_name)?;
    let aggregate = if metric.higher_is_better() { "MAX" } else { "MIN" };
    let active_filter = if include_active { "" } else { "WHERE c.is_active = 0" };

    let sql = format!(
        "SELECT c.config_id, c.config, c.is_active, {aggregate}({fragment}) AS metric_value
         FROM configs c
         JOIN training_results tr ON tr.config_id = c.config_id
         {active_filter}
         GROUP BY c.config_id
         ORDER BY metric_value IS NULL, metric_value {direction}, c.config_id
         LIMIT ?1",
        fragment = metric.sql_fragment(),
        direction = metric.order_direction(),
    );

    query_rows(conn, &sql, &[Value::Integer(i64::from(limit))], |row| {
        Ok(ConfigRanking {
            config_id: row.get(0)?,
            config: json_column(row, 1)?,
            is_active: row.get(2)?,
            metric_value: row.get(3)?,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{jobs, models, training};
    use crate::ConnectionManager;
    use forecast_core::StoreError;
    use serde_json::json;

    fn seed(conn: &Connection, config_id: &str, val_mic: f64, val_loss: f64) {
        create_config(conn, config_id, &json!({"lr": val_loss})).unwrap();
        let job_id = format!("job-{config_id}");
        let model_id = format!("model-{config_id}");
        jobs::create_job(conn, &job_id, "training", None).unwrap();
        models::create_model_record(conn, &model_id, &job_id, "/srv/models/m.bin", None).unwrap();
        training::create_training_result(
            conn,
            &format!("tr-{config_id}"),
            &job_id,
            &model_id,
            config_id,
            &json!({"val_MIC": val_mic, "val_loss": val_loss}),
            Some(12.5),
        )
        .unwrap();
    }

    #[test]
    fn coverage_metrics_rank_descending() {
        let conn = ConnectionManager::open_in_memory().unwrap();
        seed(&conn, "a", 0.4, 0.9);
        seed(&conn, "b", 0.8, 0.5);
        seed(&conn, "c", 0.6, 0.1);

        let top = get_top_configs(&conn, "val_MIC", 2, true).unwrap();
        let ids: Vec<_> = top.iter().map(|r| r.config_id.as_str()).collect();
        assert_eq!(ids, ["b", "c"]);
        assert_eq!(top[0].metric_value, Some(0.8));
    }

    #[test]
    fn loss_metrics_rank_ascending() {
        let conn = ConnectionManager::open_in_memory().unwrap();
        seed(&conn, "a", 0.4, 0.9);
        seed(&conn, "b", 0.8, 0.5);
        seed(&conn, "c", 0.6, 0.1);

        let top = get_top_configs(&conn, "val_loss", 3, true).unwrap();
        let ids: Vec<_> = top.iter().map(|r| r.config_id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[test]
    fn active_config_is_excluded_on_request() {
        let conn = ConnectionManager::open_in_memory().unwrap();
        seed(&conn, "a", 0.4, 0.9);
        seed(&conn, "b", 0.8, 0.5);
        assert!(set_config_active(&conn, "b").unwrap());

        let top = get_top_configs(&conn, "val_MIC", 5, false).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].config_id, "a");
    }

    #[test]
    fn empty_store_ranks_nothing() {
        let conn = ConnectionManager::open_in_memory().unwrap();
        assert!(get_top_configs(&conn, "val_MIWS", 5, true).unwrap().is_empty());
    }

    #[test]
    fn unknown_metric_is_rejected() {
        let conn = ConnectionManager::open_in_memory().unwrap();
        let err = get_top_configs(&conn, "val_MIC; DROP TABLE configs", 5, true).unwrap_err();
        assert!(matches!(err, StoreError::InvalidMetric));
    }

    #[test]
    fn only_one_config_is_active() {
        let conn = ConnectionManager::open_in_memory().unwrap();
        create_config(&conn, "a", &json!({})).unwrap();
        create_config(&conn, "b", &json!({})).unwrap();
        set_config_active(&conn, "a").unwrap();
        set_config_active(&conn, "b").unwrap();

        assert!(!get_config(&conn, "a").unwrap().unwrap().is_active);
        assert!(get_config(&conn, "b").unwrap().unwrap().is_active);
        assert!(!set_config_active(&conn, "missing").unwrap());
    }
}
