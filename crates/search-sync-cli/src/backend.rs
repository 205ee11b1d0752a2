// search-sync-cli/src/backend.rs
// ============================================================================
// Module: Storage Backend Selection
// Description: Opens the analysis store named by the storage configuration.
// Purpose: Give commands one store type regardless of the configured backend.
// Dependencies: search-sync-core, search-sync-config, search-sync-store-*
// ============================================================================

//! ## Overview
//! Backends are interchangeable: [`StoreBackend`] forwards every
//! [`AnalysisStore`] operation to whichever backend the configuration picked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use search_sync_config::StorageConfig;
use search_sync_core::AnalysisRow;
use search_sync_core::AnalysisStore;
use search_sync_core::StoreError;
use search_sync_core::TableRow;
use search_sync_store_flatfile::FlatFileAnalysisStore;
use search_sync_store_sqlite::SqliteAnalysisStore;
use time::Date;

// ============================================================================
// SECTION: Backend
// ============================================================================

/// Configured analysis store.
#[derive(Clone)]
pub enum StoreBackend {
    /// JSON-lines table file.
    FlatFile(FlatFileAnalysisStore),
    /// Embedded `SQLite` database.
    Sqlite(SqliteAnalysisStore),
}

impl StoreBackend {
    /// Returns the backend label used in diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::FlatFile(_) => "flat_file",
            Self::Sqlite(_) => "sqlite",
        }
    }

    /// Returns the store as a trait object.
    fn inner(&self) -> &dyn AnalysisStore {
        match self {
            Self::FlatFile(store) => store,
            Self::Sqlite(store) => store,
        }
    }
}

impl AnalysisStore for StoreBackend {
    fn first_date(&self) -> Result<Option<Date>, StoreError> {
        self.inner().first_date()
    }

    fn last_date(&self) -> Result<Option<Date>, StoreError> {
        self.inner().last_date()
    }

    fn insert(&self, row: &AnalysisRow) -> Result<(), StoreError> {
        self.inner().insert(row)
    }

    fn insert_day(&self, date: Date, rows: &[AnalysisRow]) -> Result<(), StoreError> {
        self.inner().insert_day(date, rows)
    }

    fn select(
        &self,
        start: Date,
        end: Date,
        include_header: bool,
    ) -> Result<Vec<TableRow>, StoreError> {
        self.inner().select(start, end, include_header)
    }
}

/// Opens the store named by `config`, creating its medium when absent.
///
/// # Errors
///
/// Returns [`StoreError`] when the medium cannot be opened or its layout
/// disagrees with the schema registry.
pub fn open_store(config: &StorageConfig) -> Result<StoreBackend, StoreError> {
    match config {
        StorageConfig::FlatFile(flat_file) => {
            Ok(StoreBackend::FlatFile(FlatFileAnalysisStore::open(flat_file)?))
        }
        StorageConfig::Sqlite(sqlite) => {
            Ok(StoreBackend::Sqlite(SqliteAnalysisStore::new(sqlite.clone())?))
        }
    }
}
