// search-sync-store-flatfile/src/store.rs
// ============================================================================
// Module: Flat-File Analysis Store
// Description: Append-only AnalysisStore backed by a JSON-lines table file.
// Purpose: Persist analysis rows in registry column order, one row per line.
// Dependencies: search-sync-core, serde, serde_json, thiserror, time
// ============================================================================

//! ## Overview
//! The table file is created on open when absent and receives the registry
//! header as its first line. An existing header must match the registry
//! exactly. Each insert is appended and flushed to disk before returning; a
//! day batch is written with a single append and truncated back to its
//! previous length when the write fails, so a failed day never leaves rows.
//! Reads scan the file in insertion order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use search_sync_core::ANALYSIS_COLUMNS;
use search_sync_core::AnalysisRow;
use search_sync_core::AnalysisStore;
use search_sync_core::CellValue;
use search_sync_core::ColumnAffinity;
use search_sync_core::SchemaMismatch;
use search_sync_core::StoreError;
use search_sync_core::TableRow;
use search_sync_core::header_row;
use search_sync_core::parse_report_date;
use search_sync_core::validate_day;
use search_sync_core::validate_header;
use search_sync_core::validate_row;
use serde::Deserialize;
use thiserror::Error;
use time::Date;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default table file location.
pub const DEFAULT_FLAT_FILE_PATH: &str = "analysis.jsonl";
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the flat-file analysis store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlatFileStoreConfig {
    /// Path to the table file.
    #[serde(default = "default_flat_file_path")]
    pub path: PathBuf,
}

impl Default for FlatFileStoreConfig {
    fn default() -> Self {
        Self {
            path: default_flat_file_path(),
        }
    }
}

/// Returns the default table file location.
fn default_flat_file_path() -> PathBuf {
    PathBuf::from(DEFAULT_FLAT_FILE_PATH)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Flat-file store errors.
#[derive(Debug, Error)]
pub enum FlatFileStoreError {
    /// Table file could not be created or opened.
    #[error("flat-file store unavailable: {0}")]
    Unavailable(String),
    /// Read or write failure.
    #[error("flat-file store io error: {0}")]
    Io(String),
    /// A stored line could not be decoded.
    #[error("flat-file store corruption: {0}")]
    Corrupt(String),
    /// Row or header does not follow the registry.
    #[error("flat-file store {0}")]
    SchemaMismatch(SchemaMismatch),
}

impl From<SchemaMismatch> for FlatFileStoreError {
    fn from(error: SchemaMismatch) -> Self {
        Self::SchemaMismatch(error)
    }
}

impl From<FlatFileStoreError> for StoreError {
    fn from(error: FlatFileStoreError) -> Self {
        match error {
            FlatFileStoreError::Unavailable(message) => Self::Unavailable(message),
            FlatFileStoreError::Io(message) => Self::Io(message),
            FlatFileStoreError::Corrupt(message) => Self::Corrupt(message),
            FlatFileStoreError::SchemaMismatch(mismatch) => Self::SchemaMismatch(mismatch),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Append-only analysis store backed by a JSON-lines table file.
#[derive(Debug, Clone)]
pub struct FlatFileAnalysisStore {
    /// Table file location.
    path: PathBuf,
    /// Append handle guarded by a mutex; reads also take the lock.
    file: Arc<Mutex<File>>,
}

impl FlatFileAnalysisStore {
    /// Opens the table file, creating it with a header when absent or empty.
    ///
    /// # Errors
    ///
    /// Returns [`FlatFileStoreError::Unavailable`] when the file cannot be
    /// created or opened, and [`FlatFileStoreError::SchemaMismatch`] when an
    /// existing header differs from the registry.
    pub fn open(config: &FlatFileStoreConfig) -> Result<Self, FlatFileStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&config.path)
            .map_err(|err| {
                FlatFileStoreError::Unavailable(format!("{}: {err}", config.path.display()))
            })?;
        let length = file.metadata().map_err(|err| FlatFileStoreError::Io(err.to_string()))?.len();
        if length == 0 {
            let mut header = serde_json::to_vec(&header_row())
                .map_err(|err| FlatFileStoreError::Io(err.to_string()))?;
            header.push(b'\n');
            append_durably(&mut file, &header)?;
        } else {
            check_header(&config.path)?;
        }
        Ok(Self {
            path: config.path.clone(),
            file: Arc::new(Mutex::new(file)),
        })
    }

    /// Returns the table file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends pre-validated rows as one durable write.
    fn append_rows(&self, rows: &[AnalysisRow]) -> Result<(), FlatFileStoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut buffer = Vec::new();
        for row in rows {
            serde_json::to_writer(&mut buffer, &row.cells())
                .map_err(|err| FlatFileStoreError::Io(err.to_string()))?;
            buffer.push(b'\n');
        }
        let mut guard = self
            .file
            .lock()
            .map_err(|_| FlatFileStoreError::Io("mutex poisoned".to_string()))?;
        let committed =
            guard.metadata().map_err(|err| FlatFileStoreError::Io(err.to_string()))?.len();
        if let Err(err) = append_durably(&mut guard, &buffer) {
            guard
                .set_len(committed)
                .and_then(|()| guard.sync_data())
                .map_err(|rollback| {
                    FlatFileStoreError::Io(format!("{err}; rollback failed: {rollback}"))
                })?;
            return Err(err);
        }
        drop(guard);
        Ok(())
    }

    /// Scans every stored row in insertion order.
    fn scan<F>(&self, mut visit: F) -> Result<(), FlatFileStoreError>
    where
        F: FnMut(Vec<CellValue>) -> Result<(), FlatFileStoreError>,
    {
        let guard = self
            .file
            .lock()
            .map_err(|_| FlatFileStoreError::Io("mutex poisoned".to_string()))?;
        let reader = File::open(&self.path)
            .map(BufReader::new)
            .map_err(|err| FlatFileStoreError::Io(err.to_string()))?;
        for (index, line) in reader.lines().enumerate().skip(1) {
            let line = line.map_err(|err| FlatFileStoreError::Io(err.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            visit(decode_line(index + 1, &line)?)?;
        }
        drop(guard);
        Ok(())
    }

    /// Returns the earliest and latest stored dates.
    fn date_bounds(&self) -> Result<Option<(Date, Date)>, FlatFileStoreError> {
        let mut bounds: Option<(Date, Date)> = None;
        self.scan(|cells| {
            let date = row_date(&cells)?;
            bounds = Some(match bounds {
                None => (date, date),
                Some((first, last)) => (first.min(date), last.max(date)),
            });
            Ok(())
        })?;
        Ok(bounds)
    }
}

impl AnalysisStore for FlatFileAnalysisStore {
    fn first_date(&self) -> Result<Option<Date>, StoreError> {
        Ok(self.date_bounds()?.map(|(first, _)| first))
    }

    fn last_date(&self) -> Result<Option<Date>, StoreError> {
        Ok(self.date_bounds()?.map(|(_, last)| last))
    }

    fn insert(&self, row: &AnalysisRow) -> Result<(), StoreError> {
        validate_row(row)?;
        self.append_rows(std::slice::from_ref(row)).map_err(StoreError::from)
    }

    fn insert_day(&self, date: Date, rows: &[AnalysisRow]) -> Result<(), StoreError> {
        validate_day(date, rows)?;
        self.append_rows(rows).map_err(StoreError::from)
    }

    fn select(
        &self,
        start: Date,
        end: Date,
        include_header: bool,
    ) -> Result<Vec<TableRow>, StoreError> {
        let mut selected = Vec::new();
        if include_header {
            selected.push(TableRow::Header(header_row()));
        }
        self.scan(|cells| {
            let date = row_date(&cells)?;
            if start <= date && date <= end {
                selected.push(TableRow::Record(cells));
            }
            Ok(())
        })?;
        Ok(selected)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes `bytes` at the end of the file and flushes them to disk.
fn append_durably(file: &mut File, bytes: &[u8]) -> Result<(), FlatFileStoreError> {
    file.write_all(bytes).map_err(|err| FlatFileStoreError::Io(err.to_string()))?;
    file.flush().map_err(|err| FlatFileStoreError::Io(err.to_string()))?;
    file.sync_data().map_err(|err| FlatFileStoreError::Io(err.to_string()))
}

/// Validates the header line of an existing table file.
fn check_header(path: &Path) -> Result<(), FlatFileStoreError> {
    let mut reader = File::open(path)
        .map(BufReader::new)
        .map_err(|err| FlatFileStoreError::Unavailable(err.to_string()))?;
    let mut line = String::new();
    reader.read_line(&mut line).map_err(|err| FlatFileStoreError::Io(err.to_string()))?;
    let names: Vec<String> = serde_json::from_str(line.trim_end()).map_err(|err| {
        FlatFileStoreError::Corrupt(format!("header line is not a column list: {err}"))
    })?;
    validate_header(&names)?;
    Ok(())
}

/// Decodes one data line into registry-typed cells.
fn decode_line(line_number: usize, line: &str) -> Result<Vec<CellValue>, FlatFileStoreError> {
    let cells: Vec<CellValue> = serde_json::from_str(line).map_err(|err| {
        FlatFileStoreError::Corrupt(format!("line {line_number} is not a row: {err}"))
    })?;
    if cells.len() != ANALYSIS_COLUMNS.len() {
        return Err(FlatFileStoreError::Corrupt(format!(
            "line {line_number} has {} cells, expected {}",
            cells.len(),
            ANALYSIS_COLUMNS.len()
        )));
    }
    Ok(cells
        .into_iter()
        .zip(ANALYSIS_COLUMNS.iter())
        .map(|(cell, column)| match (column.affinity, cell) {
            (ColumnAffinity::Real, CellValue::Integer(value)) => CellValue::Real(widen(value)),
            (_, cell) => cell,
        })
        .collect())
}

/// Reads an integral rank written without a fractional part.
#[allow(clippy::cast_precision_loss, reason = "Stored ranks are far below 2^52.")]
const fn widen(value: i64) -> f64 {
    value as f64
}

/// Extracts the reporting date of a decoded row.
fn row_date(cells: &[CellValue]) -> Result<Date, FlatFileStoreError> {
    let text = cells
        .first()
        .and_then(CellValue::as_text)
        .ok_or_else(|| FlatFileStoreError::Corrupt("row is missing its date".to_string()))?;
    parse_report_date(text).map_err(|err| FlatFileStoreError::Corrupt(err.to_string()))
}

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), FlatFileStoreError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|err| FlatFileStoreError::Unavailable(err.to_string())),
        _ => Ok(()),
    }
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), FlatFileStoreError> {
    let path_string = path.display().to_string();
    if path_string.is_empty() {
        return Err(FlatFileStoreError::Unavailable("store path is empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(FlatFileStoreError::Unavailable("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(FlatFileStoreError::Unavailable(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(FlatFileStoreError::Unavailable(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}
