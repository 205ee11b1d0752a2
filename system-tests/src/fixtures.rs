// system-tests/src/fixtures.rs
// ============================================================================
// Module: System Test Fixtures
// Description: Backend factories, sample records, and a scripted source.
// Purpose: Run identical scenarios against every storage backend.
// Dependencies: search-sync-core, search-sync-cli, search-sync-config
// ============================================================================

//! ## Overview
//! [`BackendKind`] opens a store inside a caller-owned directory through the
//! same configuration path the CLI uses, so scenarios exercise production
//! wiring. [`ScriptedSource`] answers day queries deterministically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Mutex;
use std::sync::PoisonError;

use search_sync_cli::backend::StoreBackend;
use search_sync_cli::backend::open_store;
use search_sync_config::StorageConfig;
use search_sync_core::AnalysisRecord;
use search_sync_core::DayQuery;
use search_sync_core::SearchAnalyticsSource;
use search_sync_core::SourceError;
use search_sync_core::SourceRow;
use search_sync_core::StoreError;
use search_sync_store_flatfile::FlatFileStoreConfig;
use search_sync_store_sqlite::SqliteStoreConfig;
use time::Date;

// ============================================================================
// SECTION: Backends
// ============================================================================

/// Storage backends under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// JSON-lines table file.
    FlatFile,
    /// Embedded `SQLite` database.
    Sqlite,
}

impl BackendKind {
    /// Every backend, in a stable order.
    pub const ALL: [Self; 2] = [Self::FlatFile, Self::Sqlite];

    /// Returns a short label for assertion messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FlatFile => "flat_file",
            Self::Sqlite => "sqlite",
        }
    }

    /// Returns the storage configuration rooted at `dir`.
    #[must_use]
    pub fn storage_config(self, dir: &Path) -> StorageConfig {
        match self {
            Self::FlatFile => StorageConfig::FlatFile(FlatFileStoreConfig {
                path: dir.join("store").join("analysis.jsonl"),
            }),
            Self::Sqlite => StorageConfig::Sqlite(SqliteStoreConfig::new(
                dir.join("store").join("storage.sqlite"),
            )),
        }
    }

    /// Opens (or reopens) the backend rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be opened.
    pub fn open(self, dir: &Path) -> Result<StoreBackend, StoreError> {
        open_store(&self.storage_config(dir))
    }
}

// ============================================================================
// SECTION: Records
// ============================================================================

/// Builds a record with fixed page, country, and device values.
#[must_use]
pub fn sample_record(date: Date, query: &str, clicks: u64) -> AnalysisRecord {
    AnalysisRecord {
        date,
        query: query.to_string(),
        page: "https://example.com/guide".to_string(),
        country: "deu".to_string(),
        device: "MOBILE".to_string(),
        clicks,
        impressions: clicks * 10 + 1,
        position: 1.25,
    }
}

// ============================================================================
// SECTION: Scripted Source
// ============================================================================

/// Reporting source answering every day with `rows_per_day` rows.
pub struct ScriptedSource {
    /// Rows returned per day.
    rows_per_day: u64,
    /// Day that fails with a quota error.
    fail_on: Option<Date>,
    /// Requested days, in call order.
    calls: Mutex<Vec<Date>>,
}

impl ScriptedSource {
    /// Creates a source returning `rows_per_day` rows for each day.
    #[must_use]
    pub const fn new(rows_per_day: u64) -> Self {
        Self {
            rows_per_day,
            fail_on: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes requests for `date` fail.
    #[must_use]
    pub fn failing_on(mut self, date: Date) -> Self {
        self.fail_on = Some(date);
        self
    }

    /// Returns the requested days, in call order.
    #[must_use]
    pub fn requested(&self) -> Vec<Date> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SearchAnalyticsSource for ScriptedSource {
    fn fetch_day(&self, query: &DayQuery) -> Result<Vec<SourceRow>, SourceError> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(query.date);
        if self.fail_on == Some(query.date) {
            return Err(SourceError::Status {
                status: 429,
                message: "quota exceeded".to_string(),
            });
        }
        Ok((0 .. self.rows_per_day)
            .map(|index| SourceRow {
                keys: vec![
                    format!("query {index}"),
                    "https://example.com/guide".to_string(),
                    "deu".to_string(),
                    "MOBILE".to_string(),
                ],
                clicks: index,
                impressions: index * 10 + 1,
                position: 1.25,
            })
            .collect())
    }
}
