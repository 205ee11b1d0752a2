// search-sync-core/src/runtime/store.rs
// ============================================================================
// Module: Search Sync In-Memory Store
// Description: Simple in-memory analysis store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::{core, interfaces}, time
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of [`AnalysisStore`] for
//! tests and local demos. Rows keep insertion order and are validated exactly
//! like the durable backends validate them. It is not intended for production
//! use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use time::Date;

use crate::core::AnalysisRow;
use crate::core::CellValue;
use crate::core::TableRow;
use crate::core::format_report_date;
use crate::core::header_row;
use crate::core::parse_report_date;
use crate::core::validate_day;
use crate::core::validate_row;
use crate::interfaces::AnalysisStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory analysis store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAnalysisStore {
    /// Stored cells in insertion order.
    rows: Arc<Mutex<Vec<Vec<CellValue>>>>,
}

impl InMemoryAnalysisStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the number of stored rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the store mutex is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// Returns true when nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the store mutex is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    /// Locks the row list.
    fn lock(&self) -> Result<MutexGuard<'_, Vec<Vec<CellValue>>>, StoreError> {
        self.rows.lock().map_err(|_| StoreError::Io("analysis store mutex poisoned".to_string()))
    }

    /// Returns every stored date, in insertion order.
    fn stored_dates(&self) -> Result<Vec<Date>, StoreError> {
        self.lock()?
            .iter()
            .map(|cells| {
                let text = cells.first().and_then(CellValue::as_text).ok_or_else(|| {
                    StoreError::Corrupt("stored row is missing its date".to_string())
                })?;
                parse_report_date(text).map_err(|err| StoreError::Corrupt(err.to_string()))
            })
            .collect()
    }
}

impl AnalysisStore for InMemoryAnalysisStore {
    fn first_date(&self) -> Result<Option<Date>, StoreError> {
        Ok(self.stored_dates()?.into_iter().min())
    }

    fn last_date(&self) -> Result<Option<Date>, StoreError> {
        Ok(self.stored_dates()?.into_iter().max())
    }

    fn insert(&self, row: &AnalysisRow) -> Result<(), StoreError> {
        validate_row(row)?;
        self.lock()?.push(row.cells());
        Ok(())
    }

    fn insert_day(&self, date: Date, rows: &[AnalysisRow]) -> Result<(), StoreError> {
        validate_day(date, rows)?;
        let mut guard = self.lock()?;
        guard.extend(rows.iter().map(AnalysisRow::cells));
        drop(guard);
        Ok(())
    }

    fn select(
        &self,
        start: Date,
        end: Date,
        include_header: bool,
    ) -> Result<Vec<TableRow>, StoreError> {
        let start_text = format_report_date(start);
        let end_text = format_report_date(end);
        let mut selected = Vec::new();
        if include_header {
            selected.push(TableRow::Header(header_row()));
        }
        let guard = self.lock()?;
        for cells in guard.iter() {
            let in_range = cells
                .first()
                .and_then(CellValue::as_text)
                .is_some_and(|date| date >= start_text.as_str() && date <= end_text.as_str());
            if in_range {
                selected.push(TableRow::Record(cells.clone()));
            }
        }
        drop(guard);
        Ok(selected)
    }
}
