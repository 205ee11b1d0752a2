// search-sync-core/src/runtime/reader.rs
// ============================================================================
// Module: Range Reader
// Description: Date-range reads over an analysis store.
// Purpose: Map caller-local dates onto reporting dates before selecting.
// Dependencies: crate::{core, interfaces}, time
// ============================================================================

//! ## Overview
//! Callers think in their own (application) timezone while rows are keyed by
//! reporting date. The range reader converts both bounds and delegates to the
//! store. An inverted range is not an error; it simply has no rows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Date;
use time::UtcOffset;

use crate::core::DEFAULT_APPLICATION_OFFSET;
use crate::core::DEFAULT_REPORTING_OFFSET;
use crate::core::TableRow;
use crate::core::convert_local_date;
use crate::interfaces::AnalysisStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Timezones used to interpret read ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadSettings {
    /// Timezone the caller's dates are expressed in.
    pub application_offset: UtcOffset,
    /// Timezone stored dates are expressed in.
    pub reporting_offset: UtcOffset,
}

impl Default for ReadSettings {
    fn default() -> Self {
        Self {
            application_offset: DEFAULT_APPLICATION_OFFSET,
            reporting_offset: DEFAULT_REPORTING_OFFSET,
        }
    }
}

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Reads stored rows for a caller-local date range.
pub struct RangeReader<S> {
    /// Store being read.
    store: S,
    /// Timezone settings.
    settings: ReadSettings,
}

impl<S: AnalysisStore> RangeReader<S> {
    /// Creates a range reader over `store`.
    #[must_use]
    pub const fn new(store: S, settings: ReadSettings) -> Self {
        Self {
            store,
            settings,
        }
    }

    /// Returns the reporting date for a caller-local date.
    #[must_use]
    pub fn to_reporting(&self, local: Date) -> Date {
        convert_local_date(local, self.settings.application_offset, self.settings.reporting_offset)
    }

    /// Returns rows between the converted bounds, inclusive.
    ///
    /// When the converted end precedes the converted start the result is
    /// empty, even if `include_header` is set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    pub fn read(
        &self,
        start_local: Date,
        end_local: Date,
        include_header: bool,
    ) -> Result<Vec<TableRow>, StoreError> {
        let start = self.to_reporting(start_local);
        let end = self.to_reporting(end_local);
        if end < start {
            return Ok(Vec::new());
        }
        self.store.select(start, end, include_header)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
