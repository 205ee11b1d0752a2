// search-sync-core/src/lib.rs
// ============================================================================
// Module: Search Sync Core Library
// Description: Public API surface for the Search Sync core.
// Purpose: Expose the data model, storage contract, and sync runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Search Sync core incrementally copies daily search analytics from an
//! external reporting service into an append-only analysis store and answers
//! date-range reads over that store. It is backend-agnostic: storage, the
//! reporting service, wall-clock time, pacing, and operational events are all
//! reached through the traits in [`interfaces`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::AnalysisStore;
pub use interfaces::Clock;
pub use interfaces::DayQuery;
pub use interfaces::Dimension;
pub use interfaces::Pacer;
pub use interfaces::REPORT_DIMENSIONS;
pub use interfaces::SearchAnalyticsSource;
pub use interfaces::SourceError;
pub use interfaces::SourceRow;
pub use interfaces::StoreError;
pub use interfaces::SyncEventSink;
pub use runtime::DEFAULT_INTERVAL_SECONDS;
pub use runtime::DEFAULT_LOOKBACK_DAYS;
pub use runtime::DEFAULT_MAX_DAYS_PER_RUN;
pub use runtime::DEFAULT_ROW_LIMIT;
pub use runtime::FixedClock;
pub use runtime::InMemoryAnalysisStore;
pub use runtime::MAX_LOOKBACK_DAYS;
pub use runtime::MAX_ROW_LIMIT;
pub use runtime::NoopSyncEventSink;
pub use runtime::RangeReader;
pub use runtime::ReadSettings;
pub use runtime::RecordingPacer;
pub use runtime::RecordingSyncEventSink;
pub use runtime::SyncEngine;
pub use runtime::SyncError;
pub use runtime::SyncSettings;
pub use runtime::SyncWindow;
pub use runtime::SystemClock;
pub use runtime::ThreadPacer;
pub use runtime::normalize_row;
pub use runtime::plan_window;
