// search-sync-core/src/core/mod.rs
// ============================================================================
// Module: Search Sync Core Types
// Description: Canonical analysis records, schema registry, and date helpers.
// Purpose: Provide the stable types shared by every storage backend.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Core types define the analysis record, the column registry every backend
//! lays its storage out from, reporting-date helpers, and the operational
//! events emitted while syncing.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod dates;
pub mod events;
pub mod record;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use dates::DEFAULT_APPLICATION_OFFSET;
pub use dates::DEFAULT_REPORTING_OFFSET;
pub use dates::DateError;
pub use dates::convert_local_date;
pub use dates::date_in_offset;
pub use dates::format_report_date;
pub use dates::format_utc_offset;
pub use dates::parse_report_date;
pub use dates::parse_utc_offset;
pub use events::EventLevel;
pub use events::SyncEvent;
pub use events::SyncEventKind;
pub use record::AnalysisRecord;
pub use record::AnalysisRow;
pub use record::CellValue;
pub use record::TableRow;
pub use record::count_records;
pub use schema::ANALYSIS_COLUMNS;
pub use schema::ANALYSIS_TABLE;
pub use schema::ColumnAffinity;
pub use schema::ColumnDef;
pub use schema::DATE_COLUMN;
pub use schema::SchemaMismatch;
pub use schema::column_names;
pub use schema::columns;
pub use schema::header_row;
pub use schema::validate_day;
pub use schema::validate_header;
pub use schema::validate_row;
