// search-sync-store-flatfile/src/lib.rs
// ============================================================================
// Module: Flat-File Analysis Store
// Description: Append-only AnalysisStore backend using a JSON-lines table.
// Purpose: Keep synced analytics in a portable, inspectable single file.
// Dependencies: search-sync-core, serde_json
// ============================================================================

//! ## Overview
//! This crate provides a flat-file [`AnalysisStore`](search_sync_core::AnalysisStore)
//! implementation. The file is a table: its first line is the JSON array of
//! column names from the schema registry and every following line is one row
//! as a JSON array in the same order. Rows are only ever appended.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::DEFAULT_FLAT_FILE_PATH;
pub use store::FlatFileAnalysisStore;
pub use store::FlatFileStoreConfig;
pub use store::FlatFileStoreError;
