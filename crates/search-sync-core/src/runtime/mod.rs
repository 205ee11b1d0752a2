// search-sync-core/src/runtime/mod.rs
// ============================================================================
// Module: Search Sync Runtime
// Description: Sync engine, range reader, and reference implementations.
// Purpose: Execute incremental syncs and date-range reads over a store.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime holds the only business logic in the crate: the sync engine
//! that decides which reporting days still need fetching and the range reader
//! that maps caller-local dates onto reporting dates. Reference clocks, pacers,
//! sinks, and an in-memory store round out the module for tests and demos.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod engine;
pub mod reader;
pub mod store;
pub mod support;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use engine::DEFAULT_INTERVAL_SECONDS;
pub use engine::DEFAULT_LOOKBACK_DAYS;
pub use engine::DEFAULT_MAX_DAYS_PER_RUN;
pub use engine::DEFAULT_ROW_LIMIT;
pub use engine::MAX_LOOKBACK_DAYS;
pub use engine::MAX_ROW_LIMIT;
pub use engine::SyncEngine;
pub use engine::SyncError;
pub use engine::SyncSettings;
pub use engine::SyncWindow;
pub use engine::normalize_row;
pub use engine::plan_window;
pub use reader::RangeReader;
pub use reader::ReadSettings;
pub use store::InMemoryAnalysisStore;
pub use support::FixedClock;
pub use support::NoopSyncEventSink;
pub use support::RecordingPacer;
pub use support::RecordingSyncEventSink;
pub use support::SystemClock;
pub use support::ThreadPacer;
