// search-sync-core/src/core/events.rs
// ============================================================================
// Module: Sync Events
// Description: Structured operational events emitted by the sync engine.
// Purpose: Report per-day progress and run outcomes without a logging dependency.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Sync events are small serializable payloads routed to a
//! [`SyncEventSink`](crate::interfaces::SyncEventSink). Deployments decide
//! where they go (stderr, an append-only file, or nowhere).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Event severity, mirroring syslog levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    /// Routine progress.
    Info,
    /// Normal but noteworthy condition.
    Notice,
    /// Run-aborting failure.
    Error,
}

/// Event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEventKind {
    /// All rows for one reporting day were stored.
    DayStored,
    /// The store already covers every fetchable day.
    AlreadyCurrent,
    /// A run finished.
    RunCompleted,
    /// A run aborted.
    RunFailed,
}

/// Sync event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncEvent {
    /// Event kind.
    pub event: SyncEventKind,
    /// Severity.
    pub level: EventLevel,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Site identifier being synced.
    pub site: String,
    /// Reporting date the event refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Rows stored for the date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    /// Days processed by the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_processed: Option<u32>,
    /// Human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SyncEvent {
    /// Creates an event with a consistent timestamp and no optional fields.
    fn base(event: SyncEventKind, level: EventLevel, site: &str) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            level,
            timestamp_ms,
            site: site.to_string(),
            date: None,
            rows: None,
            days_processed: None,
            message: None,
        }
    }

    /// A day's rows were committed.
    #[must_use]
    pub fn day_stored(site: &str, date: &str, rows: usize) -> Self {
        Self {
            date: Some(date.to_string()),
            rows: Some(rows),
            message: Some(format!("data for {date} stored")),
            ..Self::base(SyncEventKind::DayStored, EventLevel::Info, site)
        }
    }

    /// Nothing left to fetch.
    #[must_use]
    pub fn already_current(site: &str, last_date: Option<&str>) -> Self {
        Self {
            date: last_date.map(str::to_string),
            days_processed: Some(0),
            message: Some("the dump is already up to date; skipping".to_string()),
            ..Self::base(SyncEventKind::AlreadyCurrent, EventLevel::Notice, site)
        }
    }

    /// The run finished after processing `days` days.
    #[must_use]
    pub fn run_completed(site: &str, days: u32) -> Self {
        Self {
            days_processed: Some(days),
            ..Self::base(SyncEventKind::RunCompleted, EventLevel::Info, site)
        }
    }

    /// The run aborted.
    #[must_use]
    pub fn run_failed(site: &str, days: u32, message: String) -> Self {
        Self {
            days_processed: Some(days),
            message: Some(message),
            ..Self::base(SyncEventKind::RunFailed, EventLevel::Error, site)
        }
    }
}
