// search-sync-config/src/lib.rs
// ============================================================================
// Module: Search Sync Config Library
// Description: Canonical config model, validation, and settings resolution.
// Purpose: Single source of truth for search-sync.toml semantics.
// Dependencies: search-sync-core, serde, toml
// ============================================================================

//! ## Overview
//! `search-sync-config` defines the configuration model for Search Sync. A
//! configuration file is parsed and validated once, then resolved into the
//! immutable settings values the sync engine and range reader consume.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
