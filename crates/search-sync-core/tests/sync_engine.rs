// crates/search-sync-core/tests/sync_engine.rs
// ============================================================================
// Module: Sync Engine Tests
// Description: Scenario coverage for incremental day-by-day syncing.
// Purpose: Validate window planning, pacing, boundaries, and failure handling.
// Dependencies: search-sync-core
// ============================================================================
//! ## Overview
//! Drives the sync engine against the in-memory store with a scripted
//! reporting source and a pinned clock.

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

use std::sync::Mutex;
use std::time::Duration;

use search_sync_core::AnalysisRecord;
use search_sync_core::AnalysisStore;
use search_sync_core::DayQuery;
use search_sync_core::FixedClock;
use search_sync_core::InMemoryAnalysisStore;
use search_sync_core::REPORT_DIMENSIONS;
use search_sync_core::RecordingPacer;
use search_sync_core::RecordingSyncEventSink;
use search_sync_core::SearchAnalyticsSource;
use search_sync_core::SourceError;
use search_sync_core::SourceRow;
use search_sync_core::SyncEngine;
use search_sync_core::SyncError;
use search_sync_core::SyncEventKind;
use search_sync_core::SyncSettings;
use time::Date;
use time::OffsetDateTime;
use time::macros::date;
use time::macros::datetime;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Noon UTC; 04:00 on the same day at -08:00.
const NOW: OffsetDateTime = datetime!(2024-03-15 12:00 UTC);
/// Reporting "today" for [`NOW`].
const TODAY: Date = date!(2024 - 03 - 15);

/// Reporting source that answers from a script and records every request.
#[derive(Default)]
struct ScriptedSource {
    rows_per_day: usize,
    fail_on: Option<Date>,
    short_keys_on: Option<Date>,
    calls: Mutex<Vec<DayQuery>>,
}

impl ScriptedSource {
    fn with_rows(rows_per_day: usize) -> Self {
        Self {
            rows_per_day,
            ..Self::default()
        }
    }

    fn dates(&self) -> Vec<Date> {
        self.calls.lock().unwrap().iter().map(|query| query.date).collect()
    }
}

impl SearchAnalyticsSource for ScriptedSource {
    fn fetch_day(&self, query: &DayQuery) -> Result<Vec<SourceRow>, SourceError> {
        self.calls.lock().unwrap().push(query.clone());
        if self.fail_on == Some(query.date) {
            return Err(SourceError::Status {
                status: 429,
                message: "quota exceeded".to_string(),
            });
        }
        let short = self.short_keys_on == Some(query.date);
        Ok((0 .. self.rows_per_day)
            .map(|index| {
                let mut keys = vec![
                    format!("query {index}"),
                    "https://example.com/".to_string(),
                    "usa".to_string(),
                    "MOBILE".to_string(),
                ];
                if short && index > 0 {
                    keys.pop();
                }
                SourceRow {
                    keys,
                    clicks: u64::try_from(index).unwrap(),
                    impressions: 10,
                    position: 1.5,
                }
            })
            .collect())
    }
}

fn seed(store: &InMemoryAnalysisStore, date: Date) {
    let record = AnalysisRecord {
        date,
        query: "seed".to_string(),
        page: "https://example.com/".to_string(),
        country: "usa".to_string(),
        device: "DESKTOP".to_string(),
        clicks: 3,
        impressions: 30,
        position: 4.0,
    };
    store.insert(&record.to_row().unwrap()).unwrap();
}

fn settings() -> SyncSettings {
    SyncSettings::new("sc-domain:example.com")
}

// ============================================================================
// SECTION: Window Scenarios
// ============================================================================

/// Verifies an empty store starts at the lookback window and stops at the cap.
#[test]
fn cold_start_begins_at_lookback_window() {
    let store = InMemoryAnalysisStore::new();
    let source = ScriptedSource::with_rows(2);
    let pacer = RecordingPacer::new();
    let events = RecordingSyncEventSink::new();
    let engine =
        SyncEngine::new(settings(), &store, &source, FixedClock(NOW), &pacer, &events).unwrap();

    let processed = engine.run().unwrap();

    assert_eq!(processed, 10);
    let dates = source.dates();
    assert_eq!(dates.first(), Some(&date!(2023 - 12 - 16)));
    assert_eq!(dates.last(), Some(&date!(2023 - 12 - 25)));
    assert_eq!(store.len().unwrap(), 20);
    assert_eq!(store.last_date().unwrap(), Some(date!(2023 - 12 - 25)));
    assert_eq!(pacer.pauses(), vec![Duration::from_secs(2); 9]);
}

/// Verifies a store covering yesterday makes no external calls.
#[test]
fn already_current_store_returns_zero_without_fetching() {
    let store = InMemoryAnalysisStore::new();
    seed(&store, date!(2024 - 03 - 14));
    let source = ScriptedSource::with_rows(1);
    let pacer = RecordingPacer::new();
    let events = RecordingSyncEventSink::new();
    let engine =
        SyncEngine::new(settings(), &store, &source, FixedClock(NOW), &pacer, &events).unwrap();

    assert_eq!(engine.run().unwrap(), 0);
    assert!(source.dates().is_empty());
    assert!(pacer.pauses().is_empty());
    let recorded = events.events();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].event, SyncEventKind::AlreadyCurrent);
    assert_eq!(recorded[0].date.as_deref(), Some("2024-03-14"));
}

/// Verifies a store claiming future coverage is rejected.
#[test]
fn future_coverage_is_inconsistent_state() {
    let store = InMemoryAnalysisStore::new();
    seed(&store, date!(2024 - 03 - 20));
    let source = ScriptedSource::with_rows(1);
    let events = RecordingSyncEventSink::new();
    let engine = SyncEngine::new(
        settings(),
        &store,
        &source,
        FixedClock(NOW),
        RecordingPacer::new(),
        &events,
    )
    .unwrap();

    let err = engine.run().unwrap_err();
    assert!(matches!(err, SyncError::InconsistentState { .. }), "unexpected error: {err}");
    assert!(source.dates().is_empty());
    assert_eq!(events.events()[0].event, SyncEventKind::RunFailed);
}

/// Verifies coverage of today itself is also inconsistent.
#[test]
fn coverage_of_today_is_inconsistent_state() {
    let store = InMemoryAnalysisStore::new();
    seed(&store, TODAY);
    let engine = SyncEngine::new(
        settings(),
        &store,
        ScriptedSource::with_rows(1),
        FixedClock(NOW),
        RecordingPacer::new(),
        RecordingSyncEventSink::new(),
    )
    .unwrap();

    assert!(matches!(engine.run(), Err(SyncError::InconsistentState { .. })));
}

/// Verifies the run resumes at the day after the latest stored date and never
/// reaches today.
#[test]
fn run_resumes_after_last_date_and_stops_before_today() {
    let store = InMemoryAnalysisStore::new();
    seed(&store, date!(2024 - 03 - 12));
    let source = ScriptedSource::with_rows(3);
    let events = RecordingSyncEventSink::new();
    let engine = SyncEngine::new(
        settings(),
        &store,
        &source,
        FixedClock(NOW),
        RecordingPacer::new(),
        &events,
    )
    .unwrap();

    assert_eq!(engine.run().unwrap(), 2);
    assert_eq!(source.dates(), vec![date!(2024 - 03 - 13), date!(2024 - 03 - 14)]);
    assert!(source.dates().iter().all(|date| *date < TODAY));

    let kinds: Vec<SyncEventKind> = events.events().iter().map(|event| event.event).collect();
    assert_eq!(
        kinds,
        vec![SyncEventKind::DayStored, SyncEventKind::DayStored, SyncEventKind::RunCompleted]
    );
    assert_eq!(events.events()[0].rows, Some(3));
    assert_eq!(events.events()[2].days_processed, Some(2));
}

/// Verifies days with no reported rows still count as processed while the
/// store stays unchanged, so the next run asks for them again.
#[test]
fn empty_days_count_as_processed_without_storing() {
    let store = InMemoryAnalysisStore::new();
    seed(&store, date!(2024 - 03 - 12));
    let source = ScriptedSource::with_rows(0);
    let events = RecordingSyncEventSink::new();
    let engine = SyncEngine::new(
        settings(),
        &store,
        &source,
        FixedClock(NOW),
        RecordingPacer::new(),
        &events,
    )
    .unwrap();

    assert_eq!(engine.run().unwrap(), 2);
    assert_eq!(source.dates(), vec![date!(2024 - 03 - 13), date!(2024 - 03 - 14)]);
    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(store.last_date().unwrap(), Some(date!(2024 - 03 - 12)));
    assert_eq!(events.events()[0].event, SyncEventKind::DayStored);
    assert_eq!(events.events()[0].rows, Some(0));

    assert_eq!(engine.run().unwrap(), 2);
    assert_eq!(source.dates().len(), 4);
    assert_eq!(source.dates()[2], date!(2024 - 03 - 13));
}

/// Verifies a cold start over empty days is still capped at the per-run limit.
#[test]
fn empty_cold_start_is_capped_by_max_days() {
    let store = InMemoryAnalysisStore::new();
    let source = ScriptedSource::with_rows(0);
    let engine = SyncEngine::new(
        settings(),
        &store,
        &source,
        FixedClock(NOW),
        RecordingPacer::new(),
        RecordingSyncEventSink::new(),
    )
    .unwrap();

    let pending = engine.plan().unwrap().pending_days();
    assert_eq!(i64::from(engine.run().unwrap()), pending.min(10));
    assert_eq!(source.dates().len(), 10);
    assert!(store.is_empty().unwrap());
}

/// Verifies "today" depends on the reporting timezone, not UTC.
#[test]
fn today_is_computed_in_reporting_timezone() {
    let store = InMemoryAnalysisStore::new();
    let engine = SyncEngine::new(
        settings(),
        &store,
        ScriptedSource::with_rows(0),
        FixedClock(datetime!(2024-03-15 06:00 UTC)),
        RecordingPacer::new(),
        RecordingSyncEventSink::new(),
    )
    .unwrap();

    assert_eq!(engine.today(), date!(2024 - 03 - 14));
    let window = engine.plan().unwrap();
    assert_eq!(window.start, date!(2023 - 12 - 15));
    assert_eq!(window.pending_days(), 90);
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Verifies each request carries the site, fixed dimensions, and row limit.
#[test]
fn requests_carry_dimensions_and_row_limit() {
    let store = InMemoryAnalysisStore::new();
    seed(&store, date!(2024 - 03 - 13));
    let source = ScriptedSource::with_rows(1);
    let mut configured = settings();
    configured.row_limit = 250;
    let engine = SyncEngine::new(
        configured,
        &store,
        &source,
        FixedClock(NOW),
        RecordingPacer::new(),
        RecordingSyncEventSink::new(),
    )
    .unwrap();

    engine.run().unwrap();
    let calls = source.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].site, "sc-domain:example.com");
    assert_eq!(calls[0].row_limit, 250);
    assert_eq!(calls[0].dimensions, REPORT_DIMENSIONS.to_vec());
    drop(calls);
}

/// Verifies invalid settings are rejected before a run can start.
#[test]
fn invalid_settings_are_rejected() {
    let mut configured = settings();
    configured.row_limit = 0;
    let result = SyncEngine::new(
        configured,
        InMemoryAnalysisStore::new(),
        ScriptedSource::with_rows(1),
        FixedClock(NOW),
        RecordingPacer::new(),
        RecordingSyncEventSink::new(),
    );
    assert!(matches!(result, Err(SyncError::InvalidSettings(_))));

    let blank = SyncSettings::new("   ");
    assert!(matches!(blank.validate(), Err(SyncError::InvalidSettings(_))));
}

// ============================================================================
// SECTION: Failures
// ============================================================================

/// Verifies a fetch failure aborts the run but keeps prior days.
#[test]
fn fetch_failure_keeps_committed_days() {
    let store = InMemoryAnalysisStore::new();
    seed(&store, date!(2024 - 03 - 10));
    let source = ScriptedSource {
        rows_per_day: 2,
        fail_on: Some(date!(2024 - 03 - 12)),
        ..ScriptedSource::default()
    };
    let events = RecordingSyncEventSink::new();
    let engine = SyncEngine::new(
        settings(),
        &store,
        &source,
        FixedClock(NOW),
        RecordingPacer::new(),
        &events,
    )
    .unwrap();

    let err = engine.run().unwrap_err();
    assert!(matches!(err, SyncError::ExternalFetch { .. }), "unexpected error: {err}");
    assert_eq!(store.last_date().unwrap(), Some(date!(2024 - 03 - 11)));
    assert_eq!(store.len().unwrap(), 3);

    let failed = events.events().into_iter().last().unwrap();
    assert_eq!(failed.event, SyncEventKind::RunFailed);
    assert_eq!(failed.days_processed, Some(1));
    assert!(failed.message.unwrap().contains("quota exceeded"));
}

/// Verifies a malformed row discards the whole day.
#[test]
fn malformed_row_leaves_no_partial_day() {
    let store = InMemoryAnalysisStore::new();
    seed(&store, date!(2024 - 03 - 12));
    let source = ScriptedSource {
        rows_per_day: 3,
        short_keys_on: Some(date!(2024 - 03 - 13)),
        ..ScriptedSource::default()
    };
    let engine = SyncEngine::new(
        settings(),
        &store,
        &source,
        FixedClock(NOW),
        RecordingPacer::new(),
        RecordingSyncEventSink::new(),
    )
    .unwrap();

    assert!(matches!(engine.run(), Err(SyncError::ExternalFetch { .. })));
    assert_eq!(store.len().unwrap(), 1);
    assert_eq!(store.last_date().unwrap(), Some(date!(2024 - 03 - 12)));

    // A later run retries the same day from scratch.
    let retry = ScriptedSource::with_rows(3);
    let engine = SyncEngine::new(
        settings(),
        &store,
        &retry,
        FixedClock(NOW),
        RecordingPacer::new(),
        RecordingSyncEventSink::new(),
    )
    .unwrap();
    assert_eq!(engine.run().unwrap(), 2);
    assert_eq!(retry.dates()[0], date!(2024 - 03 - 13));
    assert_eq!(store.len().unwrap(), 7);
}
