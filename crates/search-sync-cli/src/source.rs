// search-sync-cli/src/source.rs
// ============================================================================
// Module: Deferred Reporting Source
// Description: Reporting client that resolves credentials on first fetch.
// Purpose: Let an already-current sync succeed without reporting credentials.
// Dependencies: search-sync-core, search-sync-providers
// ============================================================================

//! ## Overview
//! The sync engine only calls the reporting service when its window has
//! pending days. Wrapping the client so that the access token is read and the
//! HTTP client is built on the first fetch keeps an up-to-date store usable
//! with no token in the environment. A missing token still fails the run as
//! soon as a day is actually requested.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::OnceLock;

use search_sync_core::DayQuery;
use search_sync_core::SearchAnalyticsSource;
use search_sync_core::SourceError;
use search_sync_core::SourceRow;
use search_sync_providers::SearchConsoleConfig;
use search_sync_providers::SearchConsoleSource;

// ============================================================================
// SECTION: Source
// ============================================================================

/// Search Console client built from the environment on first use.
pub struct DeferredSearchConsoleSource {
    /// Client configuration, including the token variable name.
    config: SearchConsoleConfig,
    /// Client, once credentials have been resolved.
    client: OnceLock<SearchConsoleSource>,
}

impl DeferredSearchConsoleSource {
    /// Creates a deferred client; no environment lookup happens here.
    #[must_use]
    pub const fn new(config: SearchConsoleConfig) -> Self {
        Self {
            config,
            client: OnceLock::new(),
        }
    }

    /// Returns true once the underlying client has been built.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }

    /// Returns the client, building it from the environment if needed.
    fn client(&self) -> Result<&SearchConsoleSource, SourceError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let built = SearchConsoleSource::from_env(self.config.clone())?;
        Ok(self.client.get_or_init(|| built))
    }
}

impl SearchAnalyticsSource for DeferredSearchConsoleSource {
    fn fetch_day(&self, query: &DayQuery) -> Result<Vec<SourceRow>, SourceError> {
        self.client()?.fetch_day(query)
    }
}
