// search-sync-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Analysis Store
// Description: Durable AnalysisStore backed by SQLite.
// Purpose: Persist analysis rows in a registry-shaped relational table.
// Dependencies: search-sync-core, rusqlite, serde, thiserror, time
// ============================================================================

//! ## Overview
//! This module implements [`AnalysisStore`] over a single `SQLite` table named
//! `analysis` with one column per registry entry, in registry order. The
//! table is created if absent and never altered; an existing table whose
//! columns differ from the registry is rejected on open. Dates are stored as
//! ISO text, so range filters compare lexically. Selects return rows in
//! insertion order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::params;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use rusqlite::types::ValueRef;
use search_sync_core::ANALYSIS_COLUMNS;
use search_sync_core::ANALYSIS_TABLE;
use search_sync_core::AnalysisRow;
use search_sync_core::AnalysisStore;
use search_sync_core::CellValue;
use search_sync_core::ColumnAffinity;
use search_sync_core::DATE_COLUMN;
use search_sync_core::SchemaMismatch;
use search_sync_core::StoreError;
use search_sync_core::TableRow;
use search_sync_core::column_names;
use search_sync_core::format_report_date;
use search_sync_core::header_row;
use search_sync_core::parse_report_date;
use search_sync_core::validate_day;
use search_sync_core::validate_header;
use search_sync_core::validate_row;
use serde::Deserialize;
use thiserror::Error;
use time::Date;

// ============================================================================//
// SECTION: Constants
// ============================================================================//

/// Default database location.
pub const DEFAULT_SQLITE_PATH: &str = "/var/lib/search-sync/storage.sqlite";
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================//
// SECTION: Config
// ============================================================================//

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` analysis store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    #[serde(default = "default_sqlite_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default pragmas.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self::new(default_sqlite_path())
    }
}

/// Returns the default database location.
fn default_sqlite_path() -> PathBuf {
    PathBuf::from(DEFAULT_SQLITE_PATH)
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================//
// SECTION: Errors
// ============================================================================//

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Database could not be created or opened.
    #[error("sqlite store unavailable: {0}")]
    Unavailable(String),
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored values could not be decoded.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Row or table layout does not follow the registry.
    #[error("sqlite store {0}")]
    SchemaMismatch(SchemaMismatch),
}

impl From<SchemaMismatch> for SqliteStoreError {
    fn from(error: SchemaMismatch) -> Self {
        Self::SchemaMismatch(error)
    }
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Unavailable(message) => Self::Unavailable(message),
            SqliteStoreError::Io(message) | SqliteStoreError::Db(message) => Self::Io(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::SchemaMismatch(mismatch) => Self::SchemaMismatch(mismatch),
        }
    }
}

// ============================================================================//
// SECTION: Store
// ============================================================================//

/// `SQLite`-backed analysis store.
#[derive(Clone)]
pub struct SqliteAnalysisStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteAnalysisStore {
    /// Opens an `SQLite`-backed analysis store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Unavailable`] when the database cannot be
    /// opened, and [`SqliteStoreError::SchemaMismatch`] when an existing
    /// `analysis` table is laid out differently from the registry.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the database location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Inserts pre-validated rows in one transaction.
    fn insert_rows(&self, rows: &[AnalysisRow]) -> Result<(), SqliteStoreError> {
        let sql = insert_sql();
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        {
            let mut statement =
                tx.prepare_cached(&sql).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            for row in rows {
                statement
                    .execute(params_from_iter(row.cells().into_iter().map(to_sql_value)))
                    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            }
        }
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok(())
    }

    /// Returns the earliest and latest stored date.
    fn date_bounds(&self) -> Result<(Option<Date>, Option<Date>), SqliteStoreError> {
        let sql = format!("SELECT MIN({DATE_COLUMN}), MAX({DATE_COLUMN}) FROM {ANALYSIS_TABLE}");
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let (first, last): (Option<String>, Option<String>) = guard
            .query_row(&sql, params![], |row| Ok((row.get(0)?, row.get(1)?)))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        Ok((parse_stored_date(first)?, parse_stored_date(last)?))
    }

    /// Selects stored cells with `start <= date <= end` in insertion order.
    fn select_cells(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<Vec<CellValue>>, SqliteStoreError> {
        let sql = format!(
            "SELECT {} FROM {ANALYSIS_TABLE} WHERE {DATE_COLUMN} BETWEEN ?1 AND ?2 ORDER BY rowid",
            column_names().join(", ")
        );
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let mut statement =
            guard.prepare(&sql).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut rows = statement
            .query(params![format_report_date(start), format_report_date(end)])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut selected = Vec::new();
        while let Some(row) = rows.next().map_err(|err| SqliteStoreError::Db(err.to_string()))? {
            let mut cells = Vec::with_capacity(ANALYSIS_COLUMNS.len());
            for (index, column) in ANALYSIS_COLUMNS.iter().enumerate() {
                let value =
                    row.get_ref(index).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                cells.push(from_sql_value(column.name, column.affinity, value)?);
            }
            selected.push(cells);
        }
        drop(rows);
        drop(statement);
        drop(guard);
        Ok(selected)
    }
}

impl AnalysisStore for SqliteAnalysisStore {
    fn first_date(&self) -> Result<Option<Date>, StoreError> {
        Ok(self.date_bounds()?.0)
    }

    fn last_date(&self) -> Result<Option<Date>, StoreError> {
        Ok(self.date_bounds()?.1)
    }

    fn insert(&self, row: &AnalysisRow) -> Result<(), StoreError> {
        validate_row(row)?;
        self.insert_rows(std::slice::from_ref(row)).map_err(StoreError::from)
    }

    fn insert_day(&self, date: Date, rows: &[AnalysisRow]) -> Result<(), StoreError> {
        validate_day(date, rows)?;
        self.insert_rows(rows).map_err(StoreError::from)
    }

    fn select(
        &self,
        start: Date,
        end: Date,
        include_header: bool,
    ) -> Result<Vec<TableRow>, StoreError> {
        let cells = self.select_cells(start, end)?;
        let mut selected = Vec::with_capacity(cells.len() + usize::from(include_header));
        if include_header {
            selected.push(TableRow::Header(header_row()));
        }
        selected.extend(cells.into_iter().map(TableRow::Record));
        Ok(selected)
    }
}

// ============================================================================//
// SECTION: Helpers
// ============================================================================//

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|err| SqliteStoreError::Unavailable(err.to_string())),
        _ => Ok(()),
    }
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.is_empty() {
        return Err(SqliteStoreError::Unavailable("store path is empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Unavailable("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Unavailable(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Unavailable(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with durable defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags).map_err(|err| {
        SqliteStoreError::Unavailable(format!("{}: {err}", config.path.display()))
    })?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Unavailable(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Unavailable(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Unavailable(err.to_string()))?;
    Ok(())
}

/// Creates the analysis table if absent and checks its column layout.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch(&create_table_sql()).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let existing: Vec<String> = {
        let mut statement = tx
            .prepare(&format!("PRAGMA table_info({ANALYSIS_TABLE})"))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        statement
            .query_map(params![], |row| row.get::<_, String>(1))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?
    };
    validate_header(&existing)?;
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Builds the table and index definition from the registry.
fn create_table_sql() -> String {
    let columns: Vec<String> = ANALYSIS_COLUMNS
        .iter()
        .map(|column| format!("    {} {}", column.name, column.constraint()))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {ANALYSIS_TABLE} (\n{}\n);\nCREATE INDEX IF NOT EXISTS \
         idx_{ANALYSIS_TABLE}_{DATE_COLUMN} ON {ANALYSIS_TABLE} ({DATE_COLUMN});",
        columns.join(",\n")
    )
}

/// Builds the insert statement from the registry.
fn insert_sql() -> String {
    let placeholders: Vec<String> =
        (1 ..= ANALYSIS_COLUMNS.len()).map(|index| format!("?{index}")).collect();
    format!(
        "INSERT INTO {ANALYSIS_TABLE} ({}) VALUES ({})",
        column_names().join(", "),
        placeholders.join(", ")
    )
}

/// Converts a cell into an owned `SQLite` value.
fn to_sql_value(cell: CellValue) -> Value {
    match cell {
        CellValue::Integer(value) => Value::Integer(value),
        CellValue::Real(value) => Value::Real(value),
        CellValue::Text(value) => Value::Text(value),
    }
}

/// Converts a stored value into a registry-typed cell.
fn from_sql_value(
    name: &str,
    affinity: ColumnAffinity,
    value: ValueRef<'_>,
) -> Result<CellValue, SqliteStoreError> {
    match (affinity, value) {
        (ColumnAffinity::Text, ValueRef::Text(bytes)) => std::str::from_utf8(bytes)
            .map(|text| CellValue::Text(text.to_string()))
            .map_err(|err| SqliteStoreError::Corrupt(format!("{name}: {err}"))),
        (ColumnAffinity::Integer, ValueRef::Integer(number)) => Ok(CellValue::Integer(number)),
        (ColumnAffinity::Real, ValueRef::Real(number)) => Ok(CellValue::Real(number)),
        (ColumnAffinity::Real, ValueRef::Integer(number)) => Ok(CellValue::Real(widen(number))),
        (_, other) => Err(SqliteStoreError::Corrupt(format!(
            "{name} holds an unexpected {} value",
            other.data_type()
        ))),
    }
}

/// Reads an integral rank stored without a fractional part.
#[allow(clippy::cast_precision_loss, reason = "Stored ranks are far below 2^52.")]
const fn widen(value: i64) -> f64 {
    value as f64
}

/// Parses an optional stored date.
fn parse_stored_date(value: Option<String>) -> Result<Option<Date>, SqliteStoreError> {
    value
        .map(|text| {
            parse_report_date(&text).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))
        })
        .transpose()
}
