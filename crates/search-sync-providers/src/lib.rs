// crates/search-sync-providers/src/lib.rs
// ============================================================================
// Module: Search Sync Providers
// Description: Reporting service clients for Search Sync.
// Purpose: Implement the day-fetch contract against the Search Console API.
// Dependencies: search-sync-core, reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! This crate ships the HTTP client that answers
//! [`search_sync_core::SearchAnalyticsSource`] queries from the Search Console
//! search analytics endpoint. Responses are untrusted: bodies are size limited,
//! redirects are refused, and metrics are checked before conversion.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod search_console;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use search_console::DEFAULT_MAX_RESPONSE_BYTES;
pub use search_console::SearchConsoleConfig;
pub use search_console::SearchConsoleSource;
pub use search_console::decode_rows;
pub use search_console::query_url;
