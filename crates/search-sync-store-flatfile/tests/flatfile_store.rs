// crates/search-sync-store-flatfile/tests/flatfile_store.rs
// ============================================================================
// Module: Flat-File Store Tests
// Description: Tests for the JSON-lines analysis store.
// Purpose: Validate header handling, durability, ordering, and rejection paths.
// Dependencies: search-sync-store-flatfile, search-sync-core, tempfile
// ============================================================================
//! ## Overview
//! Exercises the flat-file store on real files in temporary directories.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::fs;

use search_sync_core::AnalysisRecord;
use search_sync_core::AnalysisRow;
use search_sync_core::AnalysisStore;
use search_sync_core::CellValue;
use search_sync_core::StoreError;
use search_sync_core::TableRow;
use search_sync_core::column_names;
use search_sync_store_flatfile::FlatFileAnalysisStore;
use search_sync_store_flatfile::FlatFileStoreConfig;
use search_sync_store_flatfile::FlatFileStoreError;
use tempfile::TempDir;
use time::Date;
use time::macros::date;

fn record(date: Date, query: &str, position: f64) -> AnalysisRecord {
    AnalysisRecord {
        date,
        query: query.to_string(),
        page: "https://example.com/docs".to_string(),
        country: "usa".to_string(),
        device: "DESKTOP".to_string(),
        clicks: 2,
        impressions: 25,
        position,
    }
}

fn open(dir: &TempDir) -> FlatFileAnalysisStore {
    let config = FlatFileStoreConfig {
        path: dir.path().join("data").join("analysis.jsonl"),
    };
    FlatFileAnalysisStore::open(&config).unwrap()
}

/// Verifies a new file receives the registry header as its first line.
#[test]
fn open_writes_header_line() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let contents = fs::read_to_string(store.path()).unwrap();
    let header: Vec<String> = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
    assert_eq!(header, column_names());
    assert_eq!(store.first_date().unwrap(), None);
    assert_eq!(store.last_date().unwrap(), None);
}

/// Verifies rows survive reopening and keep insertion order.
#[test]
fn rows_persist_across_reopen_in_insertion_order() {
    let dir = TempDir::new().unwrap();
    {
        let store = open(&dir);
        store.insert(&record(date!(2024 - 01 - 03), "third", 3.0).to_row().unwrap()).unwrap();
        store.insert(&record(date!(2024 - 01 - 01), "first", 1.5).to_row().unwrap()).unwrap();
    }
    let store = open(&dir);
    store.insert(&record(date!(2024 - 01 - 02), "second", 2.25).to_row().unwrap()).unwrap();

    let rows = store.select(date!(2024 - 01 - 01), date!(2024 - 01 - 03), false).unwrap();
    let queries: Vec<String> = rows
        .iter()
        .map(|row| AnalysisRecord::from_cells(row.cells().unwrap()).unwrap().query)
        .collect();
    assert_eq!(queries, vec!["third", "first", "second"]);
    assert_eq!(store.first_date().unwrap(), Some(date!(2024 - 01 - 01)));
    assert_eq!(store.last_date().unwrap(), Some(date!(2024 - 01 - 03)));
}

/// Verifies whole-number ranks read back as reals.
#[test]
fn integral_positions_round_trip_as_reals() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let inserted = record(date!(2024 - 01 - 01), "q", 4.0);
    store.insert(&inserted.to_row().unwrap()).unwrap();
    let rows = store.select(date!(2024 - 01 - 01), date!(2024 - 01 - 01), true).unwrap();
    assert!(rows[0].is_header());
    let cells = rows[1].cells().unwrap();
    assert_eq!(cells[7], CellValue::Real(4.0));
    assert_eq!(AnalysisRecord::from_cells(cells).unwrap(), inserted);
}

/// Verifies fractional ranks read back bit for bit after reopening.
#[test]
fn fractional_positions_round_trip_exactly() {
    let dir = TempDir::new().unwrap();
    let positions = [15.215_055_755_150_559, 7.333_333_333_333_333, 0.1 + 0.2];
    {
        let store = open(&dir);
        for (index, position) in positions.iter().enumerate() {
            let inserted = record(date!(2024 - 01 - 01), &format!("q{index}"), *position);
            store.insert(&inserted.to_row().unwrap()).unwrap();
        }
    }
    let store = open(&dir);
    let rows = store.select(date!(2024 - 01 - 01), date!(2024 - 01 - 01), false).unwrap();
    let stored: Vec<u64> = rows
        .iter()
        .map(|row| AnalysisRecord::from_cells(row.cells().unwrap()).unwrap().position.to_bits())
        .collect();
    let expected: Vec<u64> = positions.iter().map(|position| position.to_bits()).collect();
    assert_eq!(stored, expected);
}

/// Verifies a non-calendar date is rejected before anything reaches the file.
#[test]
fn malformed_date_is_rejected_without_writing() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let before = fs::read_to_string(store.path()).unwrap();
    let mut fields = record(date!(2024 - 01 - 01), "q", 1.0).to_row().unwrap().fields().to_vec();
    fields[0].1 = CellValue::Text("yesterday".to_string());

    let err = store.insert(&AnalysisRow::new(fields)).unwrap_err();
    assert!(matches!(err, StoreError::SchemaMismatch(_)), "unexpected error: {err}");
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    assert_eq!(store.last_date().unwrap(), None);
}

/// Verifies a header that disagrees with the registry is rejected.
#[test]
fn foreign_header_is_schema_mismatch() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("analysis.jsonl");
    fs::write(&path, "[\"date\",\"clicks\"]\n").unwrap();
    let err = FlatFileAnalysisStore::open(&FlatFileStoreConfig {
        path,
    })
    .unwrap_err();
    assert!(matches!(err, FlatFileStoreError::SchemaMismatch(_)));
}

/// Verifies a directory path cannot be opened as a table.
#[test]
fn directory_path_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let err = FlatFileAnalysisStore::open(&FlatFileStoreConfig {
        path: dir.path().to_path_buf(),
    })
    .unwrap_err();
    assert!(matches!(StoreError::from(err), StoreError::Unavailable(_)));
}

/// Verifies garbage lines surface as corruption instead of being skipped.
#[test]
fn undecodable_line_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let mut contents = fs::read_to_string(store.path()).unwrap();
    contents.push_str("not json\n");
    fs::write(store.path(), contents).unwrap();
    assert!(matches!(store.last_date(), Err(StoreError::Corrupt(_))));
}

/// Verifies an invalid batch writes nothing.
#[test]
fn insert_day_is_all_or_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir);
    let before = fs::read_to_string(store.path()).unwrap();

    let good = record(date!(2024 - 02 - 01), "ok", 1.0).to_row().unwrap();
    let mut fields = good.fields().to_vec();
    fields[6].1 = CellValue::Text("many".to_string());
    let bad = AnalysisRow::new(fields);
    let err = store.insert_day(date!(2024 - 02 - 01), &[good.clone(), bad]).unwrap_err();
    assert!(matches!(err, StoreError::SchemaMismatch(_)));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);

    store.insert_day(date!(2024 - 02 - 01), &[good.clone(), good]).unwrap();
    let rows = store.select(date!(2024 - 02 - 01), date!(2024 - 02 - 01), false).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| matches!(row, TableRow::Record(_))));
}
