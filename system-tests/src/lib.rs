// system-tests/src/lib.rs
// ============================================================================
// Module: Search Sync System Tests Library
// Description: Shared fixtures for cross-crate system tests.
// Purpose: Provide backend factories and scripted collaborators.
// Dependencies: search-sync-core, search-sync-cli, search-sync-config
// ============================================================================

//! ## Overview
//! This crate hosts fixtures used by the system-test binaries in
//! `system-tests/tests`: a factory that opens every storage backend the same
//! way the CLI does, and a scripted reporting source.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod fixtures;
