// search-sync-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Analysis Store
// Description: Durable AnalysisStore backend using an embedded SQLite table.
// Purpose: Serve range reads efficiently over long synced histories.
// Dependencies: search-sync-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`AnalysisStore`](search_sync_core::AnalysisStore)
//! implementation. Rows live in a single `analysis` table laid out from the
//! schema registry and created lazily with `IF NOT EXISTS` semantics. Each
//! reporting day is committed in one transaction.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::DEFAULT_SQLITE_PATH;
pub use store::SqliteAnalysisStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
