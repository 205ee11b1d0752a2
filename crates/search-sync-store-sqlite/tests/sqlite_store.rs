// search-sync-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Validate SQLite AnalysisStore behavior.
// Purpose: Ensure registry layout, durable appends, and per-day transactions.
// Dependencies: search-sync-store-sqlite, search-sync-core, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed analysis store, including tables
//! created by other tools and inserts rejected by the engine mid-transaction.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use search_sync_core::AnalysisRecord;
use search_sync_core::AnalysisStore;
use search_sync_core::StoreError;
use search_sync_core::TableRow;
use search_sync_core::column_names;
use search_sync_store_sqlite::SqliteAnalysisStore;
use search_sync_store_sqlite::SqliteStoreConfig;
use search_sync_store_sqlite::SqliteStoreError;
use search_sync_store_sqlite::SqliteStoreMode;
use tempfile::TempDir;
use time::Date;
use time::macros::date;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn record(date: Date, query: &str) -> AnalysisRecord {
    AnalysisRecord {
        date,
        query: query.to_string(),
        page: "https://example.com/blog".to_string(),
        country: "fra".to_string(),
        device: "TABLET".to_string(),
        clicks: 5,
        impressions: 80,
        position: 3.0,
    }
}

fn config(dir: &TempDir) -> SqliteStoreConfig {
    SqliteStoreConfig::new(dir.path().join("nested").join("storage.sqlite"))
}

fn queries(rows: &[TableRow]) -> Vec<String> {
    rows.iter()
        .filter_map(TableRow::cells)
        .map(|cells| AnalysisRecord::from_cells(cells).unwrap().query)
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies the table is created lazily in registry column order.
#[test]
fn open_creates_registry_shaped_table() {
    let dir = TempDir::new().unwrap();
    let store = SqliteAnalysisStore::new(config(&dir)).unwrap();
    let connection = Connection::open(store.path()).unwrap();
    let mut statement = connection.prepare("PRAGMA table_info(analysis)").unwrap();
    let columns: Vec<(String, String, bool)> = statement
        .query_map([], |row| Ok((row.get(1)?, row.get(2)?, row.get::<_, i64>(3)? == 1)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let names: Vec<&str> = columns.iter().map(|(name, _, _)| name.as_str()).collect();
    assert_eq!(names, column_names());
    assert_eq!(columns[0].1, "TEXT");
    assert_eq!(columns[5].1, "INTEGER");
    assert_eq!(columns[7].1, "REAL");
    assert!(columns.iter().all(|(_, _, not_null)| *not_null));
    assert_eq!(store.first_date().unwrap(), None);
}

/// Verifies rows persist across reopen and select keeps insertion order.
#[test]
fn rows_persist_and_select_in_insertion_order() {
    let dir = TempDir::new().unwrap();
    {
        let store = SqliteAnalysisStore::new(config(&dir)).unwrap();
        store.insert(&record(date!(2024 - 01 - 02), "b").to_row().unwrap()).unwrap();
        store.insert(&record(date!(2024 - 01 - 01), "a").to_row().unwrap()).unwrap();
    }
    let store = SqliteAnalysisStore::new(config(&dir)).unwrap();
    store.insert(&record(date!(2024 - 01 - 03), "c").to_row().unwrap()).unwrap();

    let rows = store.select(date!(2024 - 01 - 01), date!(2024 - 01 - 03), true).unwrap();
    assert!(rows[0].is_header());
    assert_eq!(queries(&rows), vec!["b", "a", "c"]);
    assert_eq!(store.first_date().unwrap(), Some(date!(2024 - 01 - 01)));
    assert_eq!(store.last_date().unwrap(), Some(date!(2024 - 01 - 03)));

    let middle = store.select(date!(2024 - 01 - 02), date!(2024 - 01 - 02), false).unwrap();
    assert_eq!(queries(&middle), vec!["b"]);
}

/// Verifies a pre-existing table with another layout is rejected.
#[test]
fn foreign_table_layout_is_schema_mismatch() {
    let dir = TempDir::new().unwrap();
    let cfg = config(&dir);
    std::fs::create_dir_all(cfg.path.parent().unwrap()).unwrap();
    let connection = Connection::open(&cfg.path).unwrap();
    connection
        .execute_batch("CREATE TABLE analysis (date TEXT NOT NULL, clicks INTEGER NOT NULL);")
        .unwrap();
    drop(connection);

    let err = SqliteAnalysisStore::new(cfg).err().unwrap();
    assert!(matches!(err, SqliteStoreError::SchemaMismatch(_)));
}

/// Verifies a failure inside the day transaction rolls the whole day back.
#[test]
fn failed_day_rolls_back_every_row() {
    let dir = TempDir::new().unwrap();
    let store = SqliteAnalysisStore::new(config(&dir)).unwrap();
    let connection = Connection::open(store.path()).unwrap();
    connection
        .execute_batch(
            "CREATE TRIGGER reject_marker BEFORE INSERT ON analysis WHEN NEW.query = 'reject' \
             BEGIN SELECT RAISE(ABORT, 'rejected row'); END;",
        )
        .unwrap();
    drop(connection);

    let day = date!(2024 - 04 - 01);
    let rows = vec![
        record(day, "kept").to_row().unwrap(),
        record(day, "reject").to_row().unwrap(),
    ];
    let err = store.insert_day(day, &rows).unwrap_err();
    assert!(matches!(err, StoreError::Io(_)), "unexpected error: {err}");
    assert_eq!(store.last_date().unwrap(), None);

    store.insert_day(day, &rows[.. 1]).unwrap();
    assert_eq!(store.last_date().unwrap(), Some(day));
}

/// Verifies a day batch with a foreign date never reaches the database.
#[test]
fn insert_day_rejects_mixed_dates() {
    let dir = TempDir::new().unwrap();
    let store = SqliteAnalysisStore::new(config(&dir)).unwrap();
    let rows = vec![
        record(date!(2024 - 04 - 01), "a").to_row().unwrap(),
        record(date!(2024 - 04 - 02), "b").to_row().unwrap(),
    ];
    let err = store.insert_day(date!(2024 - 04 - 01), &rows).unwrap_err();
    assert!(matches!(err, StoreError::SchemaMismatch(_)));
    assert_eq!(store.first_date().unwrap(), None);
}

/// Verifies the legacy delete journal mode is accepted.
#[test]
fn delete_journal_mode_opens() {
    let dir = TempDir::new().unwrap();
    let mut cfg = config(&dir);
    cfg.journal_mode = SqliteStoreMode::Delete;
    let store = SqliteAnalysisStore::new(cfg).unwrap();
    store.insert(&record(date!(2024 - 05 - 05), "x").to_row().unwrap()).unwrap();
    assert_eq!(store.last_date().unwrap(), Some(date!(2024 - 05 - 05)));
}

/// Verifies a directory path is reported as unavailable.
#[test]
fn directory_path_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let err = SqliteAnalysisStore::new(SqliteStoreConfig::new(dir.path())).err().unwrap();
    assert!(matches!(StoreError::from(err), StoreError::Unavailable(_)));
}
