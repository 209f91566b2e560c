//! Table definitions.
//!
//! Every relationship is declared `ON DELETE RESTRICT`. Nothing cascades:
//! removing a parent requires removing its dependents first, explicitly, which
//! only the retention engine does.

/// Version 1 of the store schema.
pub const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS jobs (
    job_id        TEXT PRIMARY KEY,
    job_type      TEXT NOT NULL,
    status        TEXT NOT NULL DEFAULT 'pending'
                  CHECK (status IN ('pending', 'running', 'completed', 'failed')),
    created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    updated_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    parameters    TEXT,
    progress      REAL NOT NULL DEFAULT 0 CHECK (progress >= 0 AND progress <= 100),
    error_message TEXT
) STRICT;

CREATE TABLE IF NOT EXISTS job_status_history (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    job_id         TEXT NOT NULL REFERENCES jobs(job_id) ON DELETE RESTRICT,
    status         TEXT NOT NULL
                   CHECK (status IN ('pending', 'running', 'completed', 'failed')),
    progress       REAL NOT NULL DEFAULT 0 CHECK (progress >= 0 AND progress <= 100),
    status_message TEXT,
    updated_at     TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
) STRICT;
CREATE INDEX IF NOT EXISTS idx_job_status_history_job ON job_status_history(job_id);

CREATE TABLE IF NOT EXISTS configs (
    config_id  TEXT PRIMARY KEY,
    config     TEXT NOT NULL,
    is_active  INTEGER NOT NULL DEFAULT 0 CHECK (is_active IN (0, 1)),
    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
) STRICT;
CREATE UNIQUE INDEX IF NOT EXISTS idx_configs_single_active
    ON configs(is_active) WHERE is_active = 1;

CREATE TABLE IF NOT EXISTS models (
    model_id     TEXT PRIMARY KEY,
    job_id       TEXT NOT NULL REFERENCES jobs(job_id) ON DELETE RESTRICT,
    model_path   TEXT NOT NULL,
    created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    last_used_at TEXT,
    is_active    INTEGER NOT NULL DEFAULT 0 CHECK (is_active IN (0, 1)),
    metadata     TEXT
) STRICT;
CREATE UNIQUE INDEX IF NOT EXISTS idx_models_single_active
    ON models(is_active) WHERE is_active = 1;
CREATE INDEX IF NOT EXISTS idx_models_job ON models(job_id);

CREATE TABLE IF NOT EXISTS training_results (
    result_id TEXT PRIMARY KEY,
    job_id    TEXT NOT NULL REFERENCES jobs(job_id) ON DELETE RESTRICT,
    model_id  TEXT NOT NULL REFERENCES models(model_id) ON DELETE RESTRICT,
    config_id TEXT NOT NULL REFERENCES configs(config_id) ON DELETE RESTRICT,
    metrics   TEXT NOT NULL,
    duration  REAL
) STRICT;
CREATE INDEX IF NOT EXISTS idx_training_results_model ON training_results(model_id);
CREATE INDEX IF NOT EXISTS idx_training_results_config ON training_results(config_id);

CREATE TABLE IF NOT EXISTS prediction_results (
    result_id        TEXT PRIMARY KEY,
    job_id           TEXT NOT NULL REFERENCES jobs(job_id) ON DELETE RESTRICT,
    model_id         TEXT NOT NULL REFERENCES models(model_id) ON DELETE RESTRICT,
    prediction_date  TEXT NOT NULL,
    prediction_month TEXT NOT NULL,
    output_path      TEXT,
    summary_metrics  TEXT
) STRICT;
CREATE INDEX IF NOT EXISTS idx_prediction_results_date ON prediction_results(prediction_date);
CREATE INDEX IF NOT EXISTS idx_prediction_results_model ON prediction_results(model_id);

CREATE TABLE IF NOT EXISTS dim_multiindex_mapping (
    multiindex_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    barcode          TEXT NOT NULL,
    artist           TEXT NOT NULL,
    album            TEXT NOT NULL,
    cover_type       TEXT NOT NULL,
    price_category   TEXT NOT NULL,
    release_type     TEXT NOT NULL,
    recording_decade TEXT NOT NULL,
    release_decade   TEXT NOT NULL,
    style            TEXT NOT NULL,
    record_year      TEXT NOT NULL,
    UNIQUE (barcode, artist, album, cover_type, price_category, release_type,
            recording_decade, release_decade, style, record_year)
) STRICT;

CREATE TABLE IF NOT EXISTS fact_predictions (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    result_id        TEXT NOT NULL REFERENCES prediction_results(result_id) ON DELETE RESTRICT,
    multiindex_id    INTEGER NOT NULL
                     REFERENCES dim_multiindex_mapping(multiindex_id) ON DELETE RESTRICT,
    prediction_month TEXT NOT NULL,
    point_forecast   REAL NOT NULL,
    quantile_05      REAL NOT NULL,
    quantile_25      REAL NOT NULL,
    quantile_50      REAL NOT NULL,
    quantile_75      REAL NOT NULL,
    quantile_95      REAL NOT NULL,
    created_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
    UNIQUE (result_id, multiindex_id, prediction_month)
) STRICT;
CREATE INDEX IF NOT EXISTS idx_fact_predictions_result ON fact_predictions(result_id);

CREATE TABLE IF NOT EXISTS fact_sales (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    multiindex_id INTEGER NOT NULL,
    data_date     TEXT NOT NULL,
    value         REAL NOT NULL
) STRICT;
CREATE INDEX IF NOT EXISTS idx_fact_sales_date ON fact_sales(data_date);

CREATE TABLE IF NOT EXISTS fact_stock (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    multiindex_id INTEGER NOT NULL,
    data_date     TEXT NOT NULL,
    value         REAL NOT NULL
) STRICT;
CREATE INDEX IF NOT EXISTS idx_fact_stock_date ON fact_stock(data_date);

CREATE TABLE IF NOT EXISTS fact_stock_changes (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    multiindex_id INTEGER NOT NULL,
    data_date     TEXT NOT NULL,
    value         REAL NOT NULL
) STRICT;
CREATE INDEX IF NOT EXISTS idx_fact_stock_changes_date ON fact_stock_changes(data_date);

CREATE TABLE IF NOT EXISTS fact_prices (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    multiindex_id INTEGER NOT NULL,
    data_date     TEXT NOT NULL,
    value         REAL NOT NULL
) STRICT;
CREATE INDEX IF NOT EXISTS idx_fact_prices_date ON fact_prices(data_date);
";

/// Every table created by [`SCHEMA_V1`].
pub const TABLE_NAMES: [&str; 12] = [
    "jobs",
    "job_status_history",
    "configs",
    "models",
    "training_results",
    "prediction_results",
    "dim_multiindex_mapping",
    "fact_predictions",
    "fact_sales",
    "fact_stock",
    "fact_stock_changes",
    "fact_prices",
];
