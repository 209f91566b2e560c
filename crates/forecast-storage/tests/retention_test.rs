use std::path::{Path, PathBuf};

use forecast_core::{PredictionRow, RetentionConfig, MULTIINDEX_COLUMNS};
use forecast_storage::queries::exec::{execute, text};
use forecast_storage::queries::historical::{count_facts, insert_fact, HistoricalFamily};
use forecast_storage::queries::predictions::{
    count_prediction_results, count_prediction_rows, insert_prediction_result,
    insert_prediction_row,
};
use forecast_storage::queries::{jobs, models};
use forecast_storage::{ConnectionManager, RetentionEngine};
use rusqlite::Connection;
use serde_json::json;
use tempfile::TempDir;

const LONG_AGO: &str = "2001-01-01T00:00:00Z";

struct Fixture {
    conn: Connection,
    root: TempDir,
    engine: RetentionEngine,
}

fn fixture() -> Fixture {
    let conn = ConnectionManager::open_in_memory().unwrap();
    let root = tempfile::tempdir().unwrap();
    let engine = RetentionEngine::new(RetentionConfig::default(), root.path());
    jobs::create_job(&conn, "job-1", "training", None).unwrap();
    Fixture { conn, root, engine }
}

fn add_model(conn: &Connection, root: &Path, model_id: &str, last_used_at: &str) -> PathBuf {
    let path = root.join(format!("{model_id}.bin"));
    std::fs::write(&path, b"weights").unwrap();
    models::create_model_record(conn, model_id, "job-1", &path.display().to_string(), None)
        .unwrap();
    execute(
        conn,
        "UPDATE models SET last_used_at = ?2 WHERE model_id = ?1",
        &[text(model_id), text(last_used_at)],
    )
    .unwrap();
    path
}

fn add_predictions(conn: &Connection, result_id: &str, model_id: &str, date: &str, rows: usize) {
    insert_prediction_result(conn, result_id, "job-1", model_id, date, "2024-01-01", None, &json!({}))
        .unwrap();
    for i in 0..rows {
        let mut entity: Vec<String> = MULTIINDEX_COLUMNS.iter().map(|c| c.to_string()).collect();
        entity[0] = format!("{result_id}-{i}");
        let row = PredictionRow {
            entity,
            prediction_month: "2024-01-01".to_string(),
            point_forecast: 3.0,
            quantiles: [1.0, 2.0, 3.0, 4.0, 5.0],
        };
        insert_prediction_row(conn, result_id, &row).unwrap();
    }
}

fn recent() -> String {
    forecast_core::models::timestamps::now_timestamp()
}

#[test]
fn predictions_older_than_cutoff_are_removed() {
    let f = fixture();
    add_model(&f.conn, f.root.path(), "m1", &recent());
    add_predictions(&f.conn, "old", "m1", LONG_AGO, 3);
    add_predictions(&f.conn, "new", "m1", &recent(), 2);

    assert_eq!(f.engine.cleanup_predictions(&f.conn, Some(30)).unwrap(), 3);
    assert_eq!(count_prediction_rows(&f.conn).unwrap(), 2);
    assert_eq!(count_prediction_results(&f.conn).unwrap(), 1);

    // Second pass over a clean dataset is a no-op.
    assert_eq!(f.engine.cleanup_predictions(&f.conn, Some(30)).unwrap(), 0);
    assert_eq!(count_prediction_rows(&f.conn).unwrap(), 2);
}

#[test]
fn empty_store_cleans_up_to_zero() {
    let f = fixture();
    assert_eq!(f.engine.cleanup_predictions(&f.conn, None).unwrap(), 0);
    assert_eq!(f.engine.cleanup_historical_data(&f.conn, None, None).unwrap().total(), 0);
    assert!(f.engine.cleanup_models(&f.conn, None, None).unwrap().is_empty());
    f.engine.run_cleanup_job(&f.conn).unwrap();
}

#[test]
fn failed_step_rolls_back_whole_batch() {
    let f = fixture();
    add_model(&f.conn, f.root.path(), "m1", &recent());
    add_predictions(&f.conn, "old", "m1", LONG_AGO, 4);
    f.conn
        .execute_batch(
            "CREATE TRIGGER block_summary_delete BEFORE DELETE ON prediction_results
             BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
        )
        .unwrap();

    let err = f.engine.cleanup_predictions(&f.conn, Some(30)).unwrap_err();
    assert!(err.as_database_error().is_some());
    // The row deletions that ran before the failing step were undone.
    assert_eq!(count_prediction_rows(&f.conn).unwrap(), 4);
    assert_eq!(count_prediction_results(&f.conn).unwrap(), 1);
    assert!(f.conn.is_autocommit());
}

#[test]
fn failed_model_delete_keeps_every_row_and_file() {
    let f = fixture();
    let paths = [
        add_model(&f.conn, f.root.path(), "a", "2001-01-03T00:00:00Z"),
        add_model(&f.conn, f.root.path(), "b", "2001-01-02T00:00:00Z"),
        add_model(&f.conn, f.root.path(), "c", "2001-01-01T00:00:00Z"),
    ];
    add_predictions(&f.conn, "ra", "a", &recent(), 2);
    forecast_storage::queries::configs::create_config(&f.conn, "cfg", &json!({})).unwrap();
    forecast_storage::queries::training::create_training_result(
        &f.conn, "tr-a", "job-1", "a", "cfg", &json!({}), None,
    )
    .unwrap();
    // "a" goes first, so its dependents are already deleted when "b" fails.
    f.conn
        .execute_batch(
            "CREATE TRIGGER block_model_b BEFORE DELETE ON models
             WHEN OLD.model_id = 'b'
             BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
        )
        .unwrap();

    let err = f.engine.cleanup_models(&f.conn, Some(0), Some(30)).unwrap_err();
    assert!(err.as_database_error().is_some());
    assert!(f.conn.is_autocommit());

    assert_eq!(models::list_models(&f.conn).unwrap().len(), 3);
    assert_eq!(count_prediction_rows(&f.conn).unwrap(), 2);
    assert_eq!(count_prediction_results(&f.conn).unwrap(), 1);
    assert_eq!(
        forecast_storage::queries::training::get_training_results_for_model(&f.conn, "a")
            .unwrap()
            .len(),
        1
    );
    assert!(paths.iter().all(|p| p.exists()));
}

#[test]
fn failed_historical_step_restores_earlier_families() {
    let f = fixture();
    for family in HistoricalFamily::ALL {
        insert_fact(&f.conn, family, 1, "2001-01-01", 1.0).unwrap();
    }
    // Prices are deleted last, after the other three families.
    f.conn
        .execute_batch(
            "CREATE TRIGGER block_prices BEFORE DELETE ON fact_prices
             BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
        )
        .unwrap();

    let err = f.engine.cleanup_historical_data(&f.conn, Some(30), Some(30)).unwrap_err();
    assert!(err.as_database_error().is_some());
    assert!(f.conn.is_autocommit());
    for family in HistoricalFamily::ALL {
        assert_eq!(count_facts(&f.conn, family).unwrap(), 1, "{family:?} lost rows");
    }
}

#[test]
fn historical_families_use_their_own_cutoffs() {
    let f = fixture();
    for family in HistoricalFamily::ALL {
        insert_fact(&f.conn, family, 1, "2001-01-01", 1.0).unwrap();
        insert_fact(&f.conn, family, 1, "2099-01-01", 1.0).unwrap();
    }
    let removed = f.engine.cleanup_historical_data(&f.conn, Some(400), Some(500)).unwrap();
    assert_eq!(removed.sales, 1);
    assert_eq!(removed.prices, 1);
    assert_eq!(removed.stock, 1);
    assert_eq!(removed.stock_changes, 1);
    assert_eq!(removed.total(), 4);

    let again = f.engine.cleanup_historical_data(&f.conn, Some(400), Some(500)).unwrap();
    assert_eq!(again.total(), 0);
    for family in HistoricalFamily::ALL {
        assert_eq!(count_facts(&f.conn, family).unwrap(), 1);
    }
}

#[test]
fn stock_cutoff_does_not_touch_sales() {
    let f = fixture();
    let recentish = (chrono::Utc::now() - chrono::Duration::days(100))
        .format("%Y-%m-%d")
        .to_string();
    for family in HistoricalFamily::ALL {
        insert_fact(&f.conn, family, 1, &recentish, 1.0).unwrap();
    }

    let removed = f.engine.cleanup_historical_data(&f.conn, Some(365), Some(30)).unwrap();
    assert_eq!(removed.sales, 0);
    assert_eq!(removed.prices, 0);
    assert_eq!(removed.stock, 1);
    assert_eq!(removed.stock_changes, 1);
}

#[test]
fn keeps_the_most_recently_used_models() {
    let f = fixture();
    let mut paths = Vec::new();
    for i in 0..7 {
        let used = (chrono::Utc::now() - chrono::Duration::hours(i64::from(i)))
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();
        paths.push(add_model(&f.conn, f.root.path(), &format!("m{i}"), &used));
    }

    let mut removed = f.engine.cleanup_models(&f.conn, Some(5), Some(30)).unwrap();
    removed.sort();
    assert_eq!(removed, ["m5", "m6"]);
    assert!(!paths[5].exists());
    assert!(!paths[6].exists());
    assert!(paths[..5].iter().all(|p| p.exists()));
    assert_eq!(models::list_models(&f.conn).unwrap().len(), 5);

    assert!(f.engine.cleanup_models(&f.conn, Some(5), Some(30)).unwrap().is_empty());
}

#[test]
fn inactive_models_are_removed_but_active_model_is_kept() {
    let f = fixture();
    add_model(&f.conn, f.root.path(), "stale", LONG_AGO);
    add_model(&f.conn, f.root.path(), "fresh", &recent());
    add_model(&f.conn, f.root.path(), "serving", LONG_AGO);
    execute(&f.conn, "UPDATE models SET is_active = 1 WHERE model_id = 'serving'", &[]).unwrap();

    let removed = f.engine.cleanup_models(&f.conn, Some(10), Some(30)).unwrap();
    assert_eq!(removed, ["stale"]);
    assert!(models::get_model(&f.conn, "serving").unwrap().is_some());
}

#[test]
fn removing_a_model_removes_its_dependents() {
    let f = fixture();
    add_model(&f.conn, f.root.path(), "stale", LONG_AGO);
    add_predictions(&f.conn, "r1", "stale", &recent(), 2);
    forecast_storage::queries::configs::create_config(&f.conn, "cfg", &json!({})).unwrap();
    forecast_storage::queries::training::create_training_result(
        &f.conn, "tr", "job-1", "stale", "cfg", &json!({}), None,
    )
    .unwrap();

    assert_eq!(f.engine.cleanup_models(&f.conn, None, Some(30)).unwrap(), ["stale"]);
    assert_eq!(count_prediction_rows(&f.conn).unwrap(), 0);
    assert_eq!(count_prediction_results(&f.conn).unwrap(), 0);
    assert!(forecast_storage::queries::training::get_training_results_for_model(&f.conn, "stale")
        .unwrap()
        .is_empty());
}

#[test]
fn unsafe_model_path_keeps_file_during_cleanup() {
    let f = fixture();
    let elsewhere = tempfile::tempdir().unwrap();
    let outside = elsewhere.path().join("outside.bin");
    std::fs::write(&outside, b"x").unwrap();
    models::create_model_record(&f.conn, "rogue", "job-1", &outside.display().to_string(), None)
        .unwrap();
    execute(
        &f.conn,
        "UPDATE models SET last_used_at = ?1 WHERE model_id = 'rogue'",
        &[text(LONG_AGO)],
    )
    .unwrap();

    assert_eq!(f.engine.cleanup_models(&f.conn, None, Some(30)).unwrap(), ["rogue"]);
    assert!(outside.exists());
}

#[test]
fn zero_day_retention_is_rejected() {
    let f = fixture();
    assert!(f.engine.cleanup_predictions(&f.conn, Some(0)).unwrap_err().is_validation());
}

#[test]
fn cleanup_job_sweeps_orphaned_artifacts() {
    let f = fixture();
    let kept = add_model(&f.conn, f.root.path(), "m1", &recent());
    let nested = f.root.path().join("old-run");
    std::fs::create_dir(&nested).unwrap();
    let orphan = nested.join("leftover.bin");
    std::fs::write(&orphan, b"x").unwrap();

    let engine = RetentionEngine::new(
        RetentionConfig {
            orphan_grace_hours: 0,
            ..RetentionConfig::default()
        },
        f.root.path(),
    );
    engine.run_cleanup_job(&f.conn).unwrap();

    assert!(kept.exists());
    assert!(!orphan.exists());
}

#[test]
fn engine_and_connections_come_from_one_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let models_dir = dir.path().join("models");
    std::fs::create_dir(&models_dir).unwrap();
    let config_path = dir.path().join("store.toml");
    std::fs::write(
        &config_path,
        format!(
            "[storage]\ndatabase_path = '{}'\nmodels_dir = '{}'\n\n[retention]\nmodels_to_keep = 2\n",
            dir.path().join("store.db").display(),
            models_dir.display(),
        ),
    )
    .unwrap();

    let config = forecast_core::StoreConfig::load(&config_path).unwrap();
    let engine = RetentionEngine::from_config(&config);
    assert_eq!(engine.config().models_to_keep, 2);
    assert_eq!(engine.models_root(), models_dir.as_path());

    let conn = ConnectionManager::new(config.storage.clone()).connect().unwrap();
    engine.run_cleanup_job(&conn).unwrap();
}
