// search-sync-core/src/runtime/engine.rs
// ============================================================================
// Module: Search Sync Engine
// Description: Incremental, paced, day-by-day sync into an analysis store.
// Purpose: Fetch every missing reporting day exactly once, oldest first.
// Dependencies: crate::{core, interfaces}, thiserror, time
// ============================================================================

//! ## Overview
//! The sync engine is the single write path into an analysis store. A run
//! reads the latest stored date, plans the window of days still missing up to
//! (but excluding) today in the reporting timezone, and then fetches, normalizes,
//! and commits those days one at a time with a fixed pause between requests.
//!
//! ## Invariants
//! - The first fetched day is `last_date + 1`, or `today - lookback_days` on an
//!   empty store.
//! - Today and later days are never fetched.
//! - A run processes at most `max_days_per_run` days.
//! - A day is committed as a unit; a failed day leaves no rows behind.
//! - Any failure aborts the run; days already committed stay committed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;
use time::Date;
use time::UtcOffset;

use crate::core::AnalysisRecord;
use crate::core::AnalysisRow;
use crate::core::DEFAULT_REPORTING_OFFSET;
use crate::core::SchemaMismatch;
use crate::core::SyncEvent;
use crate::core::date_in_offset;
use crate::core::format_report_date;
use crate::core::validate_row;
use crate::interfaces::AnalysisStore;
use crate::interfaces::Clock;
use crate::interfaces::DayQuery;
use crate::interfaces::Pacer;
use crate::interfaces::REPORT_DIMENSIONS;
use crate::interfaces::SearchAnalyticsSource;
use crate::interfaces::SourceRow;
use crate::interfaces::StoreError;
use crate::interfaces::SyncEventSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum rows requested per day.
pub const DEFAULT_ROW_LIMIT: u32 = 5_000;
/// Largest row limit the reporting service honors.
pub const MAX_ROW_LIMIT: u32 = 25_000;
/// Default maximum days fetched by one run.
pub const DEFAULT_MAX_DAYS_PER_RUN: u32 = 10;
/// Default pause between consecutive requests, in seconds.
pub const DEFAULT_INTERVAL_SECONDS: u64 = 2;
/// Default lookback window for an empty store, in days.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 90;
/// Upper bound on the lookback window, in days.
pub const MAX_LOOKBACK_DAYS: u32 = 3_650;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Fully resolved sync settings. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Site identifier passed to the reporting service.
    pub site: String,
    /// Maximum rows requested per day.
    pub row_limit: u32,
    /// Maximum days processed by one run.
    pub max_days_per_run: u32,
    /// Pause between consecutive requests.
    pub interval: Duration,
    /// Days before today to start from on an empty store.
    pub lookback_days: u32,
    /// Timezone the reporting service uses to delimit days.
    pub reporting_offset: UtcOffset,
}

impl SyncSettings {
    /// Creates settings for `site` with every other field at its default.
    #[must_use]
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            row_limit: DEFAULT_ROW_LIMIT,
            max_days_per_run: DEFAULT_MAX_DAYS_PER_RUN,
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECONDS),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            reporting_offset: DEFAULT_REPORTING_OFFSET,
        }
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidSettings`] when a value is out of range.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.site.trim().is_empty() {
            return Err(SyncError::InvalidSettings("site must be set".to_string()));
        }
        if self.row_limit == 0 || self.row_limit > MAX_ROW_LIMIT {
            return Err(SyncError::InvalidSettings(format!(
                "row_limit must be between 1 and {MAX_ROW_LIMIT}"
            )));
        }
        if self.max_days_per_run == 0 {
            return Err(SyncError::InvalidSettings(
                "max_days_per_run must be greater than zero".to_string(),
            ));
        }
        if self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(SyncError::InvalidSettings(format!(
                "lookback_days must not exceed {MAX_LOOKBACK_DAYS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Sync run errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Settings are out of range.
    #[error("invalid sync settings: {0}")]
    InvalidSettings(String),
    /// The store claims coverage past today.
    #[error("inconsistent store state: last stored date {last_date} is after today ({today})")]
    InconsistentState {
        /// Latest stored date.
        last_date: String,
        /// Today in the reporting timezone.
        today: String,
    },
    /// The reporting service call failed or returned an unusable row.
    #[error("external fetch failed for {date}: {message}")]
    ExternalFetch {
        /// Reporting date being fetched.
        date: String,
        /// Failure detail.
        message: String,
    },
    /// A normalized row violates the schema registry.
    #[error("{0}")]
    SchemaMismatch(SchemaMismatch),
    /// The store could not be opened.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    /// The store failed to read or write.
    #[error("storage io error: {0}")]
    StorageIo(String),
    /// Stored data could not be decoded.
    #[error("storage corruption: {0}")]
    Corrupt(String),
}

impl From<StoreError> for SyncError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Unavailable(message) => Self::StorageUnavailable(message),
            StoreError::Io(message) => Self::StorageIo(message),
            StoreError::SchemaMismatch(mismatch) => Self::SchemaMismatch(mismatch),
            StoreError::Corrupt(message) => Self::Corrupt(message),
        }
    }
}

impl From<SchemaMismatch> for SyncError {
    fn from(error: SchemaMismatch) -> Self {
        Self::SchemaMismatch(error)
    }
}

// ============================================================================
// SECTION: Window Planning
// ============================================================================

/// Days a run may fetch: `start` inclusive to `today` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    /// First day to fetch.
    pub start: Date,
    /// Today in the reporting timezone; never fetched.
    pub today: Date,
}

impl SyncWindow {
    /// Returns true when there is nothing to fetch.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.start >= self.today
    }

    /// Returns the number of fetchable days before today.
    #[must_use]
    pub fn pending_days(&self) -> i64 {
        (self.today - self.start).whole_days().max(0)
    }

    /// Returns the days a run fetches, oldest first, capped at `max_days`.
    #[must_use]
    pub fn dates(&self, max_days: u32) -> Vec<Date> {
        let cap = usize::try_from(max_days).unwrap_or(usize::MAX);
        let mut dates = Vec::new();
        let mut current = self.start;
        while dates.len() < cap && current < self.today {
            dates.push(current);
            match current.next_day() {
                Some(next) => current = next,
                None => break,
            }
        }
        dates
    }
}

/// Plans the fetch window from the latest stored date.
///
/// # Errors
///
/// Returns [`SyncError::InconsistentState`] when the store claims coverage of
/// today or later days beyond `today - 1`, and [`SyncError::InvalidSettings`]
/// when the lookback window underflows the calendar.
pub fn plan_window(
    last_date: Option<Date>,
    today: Date,
    lookback_days: u32,
) -> Result<SyncWindow, SyncError> {
    let inconsistent = |last: Date| SyncError::InconsistentState {
        last_date: format_report_date(last),
        today: format_report_date(today),
    };
    let start = match last_date {
        Some(last) => last.next_day().ok_or_else(|| inconsistent(last))?,
        None => today.checked_sub(time::Duration::days(i64::from(lookback_days))).ok_or_else(
            || SyncError::InvalidSettings("lookback window precedes the calendar".to_string()),
        )?,
    };
    if start > today {
        return Err(match last_date {
            Some(last) => inconsistent(last),
            None => SyncError::InvalidSettings("lookback window starts after today".to_string()),
        });
    }
    Ok(SyncWindow {
        start,
        today,
    })
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Builds a storable row from one reported row for `date`.
///
/// # Errors
///
/// Returns [`SyncError::ExternalFetch`] for malformed reported rows and
/// [`SyncError::SchemaMismatch`] when the result violates the registry.
pub fn normalize_row(date: Date, row: SourceRow) -> Result<AnalysisRow, SyncError> {
    let malformed = |message: String| SyncError::ExternalFetch {
        date: format_report_date(date),
        message,
    };
    let key_count = row.keys.len();
    let [query, page, country, device]: [String; 4] = row.keys.try_into().map_err(|_| {
        malformed(format!(
            "row carries {key_count} dimension keys, expected {}",
            REPORT_DIMENSIONS.len()
        ))
    })?;
    if !row.position.is_finite() || row.position < 0.0 {
        return Err(malformed(format!("row position {} is not a valid rank", row.position)));
    }
    let record = AnalysisRecord {
        date,
        query,
        page,
        country,
        device,
        clicks: row.clicks,
        impressions: row.impressions,
        position: row.position,
    };
    let normalized = record.to_row()?;
    validate_row(&normalized)?;
    Ok(normalized)
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Incremental sync engine.
pub struct SyncEngine<S, F, C, P, E> {
    /// Resolved settings.
    settings: SyncSettings,
    /// Destination store.
    store: S,
    /// Reporting service.
    source: F,
    /// Wall clock.
    clock: C,
    /// Inter-request pacing.
    pacer: P,
    /// Operational event sink.
    events: E,
}

impl<S, F, C, P, E> SyncEngine<S, F, C, P, E>
where
    S: AnalysisStore,
    F: SearchAnalyticsSource,
    C: Clock,
    P: Pacer,
    E: SyncEventSink,
{
    /// Creates a sync engine.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidSettings`] when the settings fail validation.
    pub fn new(
        settings: SyncSettings,
        store: S,
        source: F,
        clock: C,
        pacer: P,
        events: E,
    ) -> Result<Self, SyncError> {
        settings.validate()?;
        Ok(Self {
            settings,
            store,
            source,
            clock,
            pacer,
            events,
        })
    }

    /// Returns the resolved settings.
    #[must_use]
    pub const fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Returns the destination store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns today's date in the reporting timezone.
    #[must_use]
    pub fn today(&self) -> Date {
        date_in_offset(self.clock.now_utc(), self.settings.reporting_offset)
    }

    /// Plans the window the next run would fetch.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the store cannot be read or is inconsistent.
    pub fn plan(&self) -> Result<SyncWindow, SyncError> {
        let last_date = self.store.last_date()?;
        plan_window(last_date, self.today(), self.settings.lookback_days)
    }

    /// Runs one sync pass and returns the number of days processed.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when planning, fetching, or storing fails. Days
    /// committed before the failure remain stored.
    pub fn run(&self) -> Result<u32, SyncError> {
        let mut processed = 0;
        match self.run_window(&mut processed) {
            Ok(()) => Ok(processed),
            Err(err) => {
                self.events.record(&SyncEvent::run_failed(
                    &self.settings.site,
                    processed,
                    err.to_string(),
                ));
                Err(err)
            }
        }
    }

    /// Plans the window and processes each day in it.
    fn run_window(&self, processed: &mut u32) -> Result<(), SyncError> {
        let last_date = self.store.last_date()?;
        let window = plan_window(last_date, self.today(), self.settings.lookback_days)?;
        if window.is_current() {
            let last_text = last_date.map(format_report_date);
            self.events
                .record(&SyncEvent::already_current(&self.settings.site, last_text.as_deref()));
            return Ok(());
        }
        for (index, date) in window.dates(self.settings.max_days_per_run).into_iter().enumerate() {
            if index > 0 {
                self.pacer.pause(self.settings.interval);
            }
            let rows = self.sync_day(date)?;
            *processed += 1;
            self.events.record(&SyncEvent::day_stored(
                &self.settings.site,
                &format_report_date(date),
                rows,
            ));
        }
        self.events.record(&SyncEvent::run_completed(&self.settings.site, *processed));
        Ok(())
    }

    /// Fetches, normalizes, and commits one reporting day.
    fn sync_day(&self, date: Date) -> Result<usize, SyncError> {
        let query = DayQuery {
            site: self.settings.site.clone(),
            date,
            dimensions: REPORT_DIMENSIONS.to_vec(),
            row_limit: self.settings.row_limit,
        };
        let reported = self.source.fetch_day(&query).map_err(|err| SyncError::ExternalFetch {
            date: format_report_date(date),
            message: err.to_string(),
        })?;
        let rows = reported
            .into_iter()
            .map(|row| normalize_row(date, row))
            .collect::<Result<Vec<_>, _>>()?;
        self.store.insert_day(date, &rows)?;
        Ok(rows.len())
    }
}
