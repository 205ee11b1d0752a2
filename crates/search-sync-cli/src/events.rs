// search-sync-cli/src/events.rs
// ============================================================================
// Module: Sync Event Sinks
// Description: JSON-line sinks for operational sync events.
// Purpose: Route engine events to stderr, an append-only file, or nowhere.
// Dependencies: search-sync-core, search-sync-config, serde_json
// ============================================================================

//! ## Overview
//! Each event is serialized as one JSON object per line. Sinks never fail the
//! run: serialization or write errors drop the event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use search_sync_config::LogSinkKind;
use search_sync_config::LoggingConfig;
use search_sync_core::NoopSyncEventSink;
use search_sync_core::SyncEvent;
use search_sync_core::SyncEventSink;

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Event sink that writes JSON lines to stderr.
pub struct StderrSyncEventSink;

impl SyncEventSink for StderrSyncEventSink {
    fn record(&self, event: &SyncEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Event sink that appends JSON lines to a file.
pub struct FileSyncEventSink {
    /// File handle used for append-only logging.
    file: Mutex<File>,
}

impl FileSyncEventSink {
    /// Opens the log file in append mode, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl SyncEventSink for FileSyncEventSink {
    fn record(&self, event: &SyncEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Builds the sink selected by the logging configuration.
///
/// # Errors
///
/// Returns an error when the file sink cannot be opened.
pub fn open_event_sink(config: &LoggingConfig) -> io::Result<Box<dyn SyncEventSink>> {
    match (config.sink, config.path.as_deref()) {
        (LogSinkKind::Stderr, _) => Ok(Box::new(StderrSyncEventSink)),
        (LogSinkKind::None, _) => Ok(Box::new(NoopSyncEventSink)),
        (LogSinkKind::File, Some(path)) => Ok(Box::new(FileSyncEventSink::new(path)?)),
        (LogSinkKind::File, None) => {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "logging.path is required"))
        }
    }
}
