// search-sync-cli/src/lib.rs
// ============================================================================
// Module: Search Sync CLI Library
// Description: Shared helpers for the Search Sync command-line interface.
// Purpose: Provide reusable components for the CLI binary and its tests.
// Dependencies: search-sync-core, search-sync-config, search-sync-providers, search-sync-store-*
// ============================================================================

//! ## Overview
//! This library houses the pieces the `search-sync` binary wires together:
//! the localized message catalog, event sinks selected by the `[logging]`
//! section, the storage backend selected by `[storage]`, the reporting client
//! that resolves credentials on first fetch, and row rendering for the `read`
//! command. Keeping them here lets integration tests use them
//! without spawning the binary.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Storage backend selection.
pub mod backend;
/// Operational event sinks.
pub mod events;
/// Internationalization helpers and message catalog.
pub mod i18n;
/// Row rendering for range reads.
pub mod output;
/// Reporting client with deferred credential lookup.
pub mod source;
