// search-sync-core/src/interfaces/mod.rs
// ============================================================================
// Module: Search Sync Interfaces
// Description: Backend-agnostic interfaces for storage, reporting, and time.
// Purpose: Define the contract surfaces used by the sync runtime.
// Dependencies: crate::core, thiserror, time
// ============================================================================

//! ## Overview
//! Interfaces define how Search Sync reaches external systems without
//! embedding backend-specific details: the analysis store, the reporting
//! service, the wall clock, the pacing delay, and the event log.
//! Implementations must surface failures instead of retrying them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;
use time::Date;
use time::OffsetDateTime;

use crate::core::AnalysisRow;
use crate::core::SchemaMismatch;
use crate::core::SyncEvent;
use crate::core::TableRow;

// ============================================================================
// SECTION: Analysis Store
// ============================================================================

/// Analysis store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage medium could not be created or opened.
    #[error("analysis store unavailable: {0}")]
    Unavailable(String),
    /// Medium-level read or write failure.
    #[error("analysis store io error: {0}")]
    Io(String),
    /// Row or stored layout does not match the schema registry.
    #[error("analysis store {0}")]
    SchemaMismatch(SchemaMismatch),
    /// Stored data could not be decoded.
    #[error("analysis store corruption: {0}")]
    Corrupt(String),
}

impl From<SchemaMismatch> for StoreError {
    fn from(error: SchemaMismatch) -> Self {
        Self::SchemaMismatch(error)
    }
}

/// Append-only store of analysis rows keyed by reporting date.
pub trait AnalysisStore {
    /// Returns the earliest stored date, or `None` when empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn first_date(&self) -> Result<Option<Date>, StoreError>;

    /// Returns the latest stored date, or `None` when empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn last_date(&self) -> Result<Option<Date>, StoreError>;

    /// Appends one row. The row is durable when this returns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SchemaMismatch`] for rows that do not follow the
    /// registry, or [`StoreError::Io`] on medium failures.
    fn insert(&self, row: &AnalysisRow) -> Result<(), StoreError>;

    /// Appends every row for `date` as one unit: either all rows become
    /// visible or none do.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SchemaMismatch`] when any row is invalid or
    /// belongs to a different date, or [`StoreError::Io`] on medium failures.
    fn insert_day(&self, date: Date, rows: &[AnalysisRow]) -> Result<(), StoreError>;

    /// Returns rows with `start <= date <= end`, optionally led by a header.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store cannot be read.
    fn select(
        &self,
        start: Date,
        end: Date,
        include_header: bool,
    ) -> Result<Vec<TableRow>, StoreError>;
}

impl<T: AnalysisStore + ?Sized> AnalysisStore for &T {
    fn first_date(&self) -> Result<Option<Date>, StoreError> {
        (**self).first_date()
    }

    fn last_date(&self) -> Result<Option<Date>, StoreError> {
        (**self).last_date()
    }

    fn insert(&self, row: &AnalysisRow) -> Result<(), StoreError> {
        (**self).insert(row)
    }

    fn insert_day(&self, date: Date, rows: &[AnalysisRow]) -> Result<(), StoreError> {
        (**self).insert_day(date, rows)
    }

    fn select(
        &self,
        start: Date,
        end: Date,
        include_header: bool,
    ) -> Result<Vec<TableRow>, StoreError> {
        (**self).select(start, end, include_header)
    }
}

// ============================================================================
// SECTION: Reporting Source
// ============================================================================

/// Report dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Search query.
    Query,
    /// Landing page.
    Page,
    /// Searcher country.
    Country,
    /// Searcher device.
    Device,
}

impl Dimension {
    /// Returns the wire name of the dimension.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Page => "page",
            Self::Country => "country",
            Self::Device => "device",
        }
    }
}

/// Dimensions requested for every day, in key order.
pub const REPORT_DIMENSIONS: [Dimension; 4] =
    [Dimension::Query, Dimension::Page, Dimension::Country, Dimension::Device];

/// Request for a single reporting day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayQuery {
    /// Site identifier.
    pub site: String,
    /// Reporting day (start and end of the request).
    pub date: Date,
    /// Dimensions, in the order keys come back.
    pub dimensions: Vec<Dimension>,
    /// Maximum rows to return.
    pub row_limit: u32,
}

/// One reported row.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// Dimension values, ordered as requested.
    pub keys: Vec<String>,
    /// Click count.
    pub clicks: u64,
    /// Impression count.
    pub impressions: u64,
    /// Average rank.
    pub position: f64,
}

/// Reporting source errors.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport-level failure.
    #[error("reporting request failed: {0}")]
    Request(String),
    /// Service answered with a failure status.
    #[error("reporting service returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response detail.
        message: String,
    },
    /// Response could not be decoded.
    #[error("reporting response invalid: {0}")]
    Decode(String),
    /// Credentials were rejected or unavailable.
    #[error("reporting credentials unavailable: {0}")]
    Credentials(String),
}

/// External reporting service, consumed one day at a time.
pub trait SearchAnalyticsSource {
    /// Fetches up to `query.row_limit` rows for `query.date`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on any failure; callers do not retry.
    fn fetch_day(&self, query: &DayQuery) -> Result<Vec<SourceRow>, SourceError>;
}

impl<T: SearchAnalyticsSource + ?Sized> SearchAnalyticsSource for &T {
    fn fetch_day(&self, query: &DayQuery) -> Result<Vec<SourceRow>, SourceError> {
        (**self).fetch_day(query)
    }
}

// ============================================================================
// SECTION: Clock / Pacer
// ============================================================================

/// Wall-clock source.
pub trait Clock {
    /// Returns the current instant.
    fn now_utc(&self) -> OffsetDateTime;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_utc(&self) -> OffsetDateTime {
        (**self).now_utc()
    }
}

/// Fixed delay between consecutive reporting requests.
pub trait Pacer {
    /// Blocks for `interval`.
    fn pause(&self, interval: Duration);
}

impl<T: Pacer + ?Sized> Pacer for &T {
    fn pause(&self, interval: Duration) {
        (**self).pause(interval);
    }
}

// ============================================================================
// SECTION: Event Sink
// ============================================================================

/// Destination for operational sync events.
pub trait SyncEventSink {
    /// Records an event. Sinks must not fail the run.
    fn record(&self, event: &SyncEvent);
}

impl<T: SyncEventSink + ?Sized> SyncEventSink for &T {
    fn record(&self, event: &SyncEvent) {
        (**self).record(event);
    }
}

impl<T: SyncEventSink + ?Sized> SyncEventSink for Box<T> {
    fn record(&self, event: &SyncEvent) {
        (**self).record(event);
    }
}
