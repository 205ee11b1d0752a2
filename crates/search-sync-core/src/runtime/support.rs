// search-sync-core/src/runtime/support.rs
// ============================================================================
// Module: Search Sync Runtime Support
// Description: Clocks, pacers, and event sinks for the sync engine.
// Purpose: Provide production and test implementations of collaborator traits.
// Dependencies: crate::{core, interfaces}, time
// ============================================================================

//! ## Overview
//! Production runs use [`SystemClock`] and [`ThreadPacer`]; tests pin time
//! with [`FixedClock`] and capture pauses and events with the recording
//! variants instead of sleeping.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::time::Duration;

use time::OffsetDateTime;

use crate::core::SyncEvent;
use crate::interfaces::Clock;
use crate::interfaces::Pacer;
use crate::interfaces::SyncEventSink;

// ============================================================================
// SECTION: Clocks
// ============================================================================

/// Wall clock backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now_utc(&self) -> OffsetDateTime {
        self.0
    }
}

// ============================================================================
// SECTION: Pacers
// ============================================================================

/// Pacer that blocks the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, interval: Duration) {
        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }
}

/// Pacer that records requested pauses without sleeping.
#[derive(Debug, Default)]
pub struct RecordingPacer {
    /// Pauses requested so far.
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    /// Creates an empty recording pacer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the pauses requested so far.
    #[must_use]
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, interval: Duration) {
        if let Ok(mut guard) = self.pauses.lock() {
            guard.push(interval);
        }
    }
}

// ============================================================================
// SECTION: Event Sinks
// ============================================================================

/// Event sink that discards events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSyncEventSink;

impl SyncEventSink for NoopSyncEventSink {
    fn record(&self, _event: &SyncEvent) {}
}

/// Event sink that keeps events in memory.
#[derive(Debug, Default)]
pub struct RecordingSyncEventSink {
    /// Events recorded so far.
    events: Mutex<Vec<SyncEvent>>,
}

impl RecordingSyncEventSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl SyncEventSink for RecordingSyncEventSink {
    fn record(&self, event: &SyncEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}
