// search-sync-config/src/config.rs
// ============================================================================
// Module: Search Sync Configuration
// Description: Configuration loading and validation for Search Sync.
// Purpose: Provide strict config parsing with hard limits and full defaults.
// Dependencies: search-sync-core, search-sync-store-*, serde, time, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every optional field carries an explicit default, so a parsed config is
//! complete; [`SearchSyncConfig::resolve`] then turns it into immutable
//! [`SyncSettings`] and [`ReadSettings`]. Nothing is mutated after loading.
//! A missing `source.site` is a configuration error and stops startup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use search_sync_core::DEFAULT_INTERVAL_SECONDS;
use search_sync_core::DEFAULT_LOOKBACK_DAYS;
use search_sync_core::DEFAULT_MAX_DAYS_PER_RUN;
use search_sync_core::DEFAULT_ROW_LIMIT;
use search_sync_core::MAX_LOOKBACK_DAYS;
use search_sync_core::MAX_ROW_LIMIT;
use search_sync_core::ReadSettings;
use search_sync_core::SyncSettings;
use search_sync_core::parse_utc_offset;
use search_sync_store_flatfile::FlatFileStoreConfig;
use search_sync_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;
use time::Date;
use time::UtcOffset;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "search-sync.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SEARCH_SYNC_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default reporting service endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/webmasters/v3";
/// Default environment variable holding the OAuth access token.
pub const DEFAULT_ACCESS_TOKEN_ENV: &str = "SEARCH_SYNC_ACCESS_TOKEN";
/// Default reporting request timeout in milliseconds.
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Minimum reporting request timeout in milliseconds.
pub(crate) const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum reporting request timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 300_000;
/// Default user agent for reporting requests.
pub(crate) const DEFAULT_USER_AGENT: &str = concat!("search-sync/", env!("CARGO_PKG_VERSION"));
/// Maximum pacing interval in seconds.
pub(crate) const MAX_INTERVAL_SECONDS: u64 = 3_600;
/// Default reporting timezone.
pub(crate) const DEFAULT_REPORTING_UTC_OFFSET: &str = "-08:00";
/// Default application timezone.
pub(crate) const DEFAULT_APPLICATION_UTC_OFFSET: &str = "+00:00";
/// Default read window start, in days before today.
pub(crate) const DEFAULT_START_DAYS_AGO: u32 = 30;
/// Default read window end, in days before today.
pub(crate) const DEFAULT_END_DAYS_AGO: u32 = 1;
/// Maximum `SQLite` busy timeout in milliseconds.
pub(crate) const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Search Sync configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSyncConfig {
    /// Reporting source configuration.
    #[serde(default)]
    pub source: SourceConfig,
    /// Sync run configuration.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Range read configuration.
    #[serde(default)]
    pub read: ReadConfig,
    /// Storage backend selection.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Operational event logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings resolved from a validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    /// Sync engine settings.
    pub sync: SyncSettings,
    /// Range reader settings.
    pub read: ReadSettings,
}

impl SearchSyncConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.source.validate()?;
        self.sync.validate()?;
        self.read.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Resolves immutable engine and reader settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a timezone offset cannot be parsed.
    pub fn resolve(&self) -> Result<ResolvedSettings, ConfigError> {
        Ok(ResolvedSettings {
            sync: self.sync_settings()?,
            read: self.read_settings()?,
        })
    }

    /// Resolves sync engine settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the reporting offset cannot be parsed.
    pub fn sync_settings(&self) -> Result<SyncSettings, ConfigError> {
        Ok(SyncSettings {
            site: self.source.site.trim().to_string(),
            row_limit: self.source.row_limit,
            max_days_per_run: self.sync.max_days_per_run,
            interval: Duration::from_secs(self.sync.interval_seconds),
            lookback_days: self.sync.lookback_days,
            reporting_offset: self.sync.reporting_offset()?,
        })
    }

    /// Resolves range reader settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a timezone offset cannot be parsed.
    pub fn read_settings(&self) -> Result<ReadSettings, ConfigError> {
        Ok(ReadSettings {
            application_offset: self.read.application_offset()?,
            reporting_offset: self.sync.reporting_offset()?,
        })
    }
}

// ============================================================================
// SECTION: Source
// ============================================================================

/// Reporting source configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Site identifier, e.g. `https://example.com/` or `sc-domain:example.com`.
    #[serde(default)]
    pub site: String,
    /// Maximum rows requested per day.
    #[serde(default = "default_row_limit")]
    pub row_limit: u32,
    /// Reporting API base URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Environment variable holding the OAuth access token.
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent sent with each request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Allow a non-TLS endpoint (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            site: String::new(),
            row_limit: default_row_limit(),
            endpoint: default_endpoint(),
            access_token_env: default_access_token_env(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            allow_http: false,
        }
    }
}

impl SourceConfig {
    /// Validates source configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.site.trim().is_empty() {
            return Err(ConfigError::Invalid("source.site must be set".to_string()));
        }
        if self.row_limit == 0 || self.row_limit > MAX_ROW_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "source.row_limit must be between 1 and {MAX_ROW_LIMIT}"
            )));
        }
        let endpoint = self.endpoint.trim();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ConfigError::Invalid(
                "source.endpoint must include http:// or https://".to_string(),
            ));
        }
        if endpoint.starts_with("http://") && !self.allow_http {
            return Err(ConfigError::Invalid(
                "source.endpoint uses http:// without allow_http".to_string(),
            ));
        }
        if self.access_token_env.trim().is_empty() {
            return Err(ConfigError::Invalid("source.access_token_env must be set".to_string()));
        }
        if !(MIN_TIMEOUT_MS ..= MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "source.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("source.user_agent must be set".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Sync
// ============================================================================

/// Sync run configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Maximum days processed by one run.
    #[serde(default = "default_max_days_per_run")]
    pub max_days_per_run: u32,
    /// Pause between consecutive requests, in seconds.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// Days before today to start from on an empty store.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Reporting timezone as a fixed UTC offset (`-08:00`).
    #[serde(default = "default_reporting_utc_offset")]
    pub reporting_utc_offset: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_days_per_run: default_max_days_per_run(),
            interval_seconds: default_interval_seconds(),
            lookback_days: default_lookback_days(),
            reporting_utc_offset: default_reporting_utc_offset(),
        }
    }
}

impl SyncConfig {
    /// Validates sync configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_days_per_run == 0 || self.max_days_per_run > MAX_LOOKBACK_DAYS {
            return Err(ConfigError::Invalid(format!(
                "sync.max_days_per_run must be between 1 and {MAX_LOOKBACK_DAYS}"
            )));
        }
        if self.interval_seconds > MAX_INTERVAL_SECONDS {
            return Err(ConfigError::Invalid(format!(
                "sync.interval_seconds must not exceed {MAX_INTERVAL_SECONDS}"
            )));
        }
        if self.lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ConfigError::Invalid(format!(
                "sync.lookback_days must not exceed {MAX_LOOKBACK_DAYS}"
            )));
        }
        self.reporting_offset()?;
        Ok(())
    }

    /// Parses the reporting timezone.
    fn reporting_offset(&self) -> Result<UtcOffset, ConfigError> {
        parse_utc_offset(&self.reporting_utc_offset)
            .map_err(|err| ConfigError::Invalid(format!("sync.reporting_utc_offset: {err}")))
    }
}

// ============================================================================
// SECTION: Read
// ============================================================================

/// Range read configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadConfig {
    /// Application timezone as a fixed UTC offset (`+00:00`).
    #[serde(default = "default_application_utc_offset")]
    pub timezone_utc_offset: String,
    /// Default range start, in days before today.
    #[serde(default = "default_start_days_ago")]
    pub default_start_days_ago: u32,
    /// Default range end, in days before today.
    #[serde(default = "default_end_days_ago")]
    pub default_end_days_ago: u32,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            timezone_utc_offset: default_application_utc_offset(),
            default_start_days_ago: default_start_days_ago(),
            default_end_days_ago: default_end_days_ago(),
        }
    }
}

impl ReadConfig {
    /// Validates read configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.application_offset()?;
        for (field, value) in [
            ("read.default_start_days_ago", self.default_start_days_ago),
            ("read.default_end_days_ago", self.default_end_days_ago),
        ] {
            if value > MAX_LOOKBACK_DAYS {
                return Err(ConfigError::Invalid(format!(
                    "{field} must not exceed {MAX_LOOKBACK_DAYS}"
                )));
            }
        }
        Ok(())
    }

    /// Parses the application timezone.
    fn application_offset(&self) -> Result<UtcOffset, ConfigError> {
        parse_utc_offset(&self.timezone_utc_offset)
            .map_err(|err| ConfigError::Invalid(format!("read.timezone_utc_offset: {err}")))
    }

    /// Returns the default `(start, end)` range relative to `today`.
    ///
    /// Bounds that would precede the calendar clamp to `today`.
    #[must_use]
    pub fn default_range(&self, today: Date) -> (Date, Date) {
        let days_before = |days: u32| {
            today.checked_sub(time::Duration::days(i64::from(days))).unwrap_or(today)
        };
        (days_before(self.default_start_days_ago), days_before(self.default_end_days_ago))
    }
}

// ============================================================================
// SECTION: Storage
// ============================================================================

/// Storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// JSON-lines table file.
    FlatFile(FlatFileStoreConfig),
    /// Embedded `SQLite` database.
    Sqlite(SqliteStoreConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::FlatFile(FlatFileStoreConfig::default())
    }
}

impl StorageConfig {
    /// Returns the configured storage location.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::FlatFile(config) => &config.path,
            Self::Sqlite(config) => &config.path,
        }
    }

    /// Validates storage configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("storage.path", &self.path().to_string_lossy())?;
        if let Self::Sqlite(config) = self
            && config.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS
        {
            return Err(ConfigError::Invalid(format!(
                "storage.busy_timeout_ms must not exceed {MAX_BUSY_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Operational event sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard events.
    None,
}

/// Operational event logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Sink selection.
    #[serde(default)]
    pub sink: LogSinkKind,
    /// Log file path when `sink = "file"`.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl LoggingConfig {
    /// Validates logging configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkKind::File, None) => {
                Err(ConfigError::Invalid("logging.path is required for the file sink".to_string()))
            }
            (LogSinkKind::File, Some(path)) => {
                validate_path_string("logging.path", &path.to_string_lossy())
            }
            (LogSinkKind::Stderr | LogSinkKind::None, _) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default row limit.
const fn default_row_limit() -> u32 {
    DEFAULT_ROW_LIMIT
}

/// Returns the default reporting endpoint.
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Returns the default access token variable.
fn default_access_token_env() -> String {
    DEFAULT_ACCESS_TOKEN_ENV.to_string()
}

/// Returns the default request timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Returns the default user agent.
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Returns the default per-run day cap.
const fn default_max_days_per_run() -> u32 {
    DEFAULT_MAX_DAYS_PER_RUN
}

/// Returns the default pacing interval.
const fn default_interval_seconds() -> u64 {
    DEFAULT_INTERVAL_SECONDS
}

/// Returns the default lookback window.
const fn default_lookback_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

/// Returns the default reporting offset text.
fn default_reporting_utc_offset() -> String {
    DEFAULT_REPORTING_UTC_OFFSET.to_string()
}

/// Returns the default application offset text.
fn default_application_utc_offset() -> String {
    DEFAULT_APPLICATION_UTC_OFFSET.to_string()
}

/// Returns the default read start offset.
const fn default_start_days_ago() -> u32 {
    DEFAULT_START_DAYS_AGO
}

/// Returns the default read end offset.
const fn default_end_days_ago() -> u32 {
    DEFAULT_END_DAYS_AGO
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions are permitted."
    )]

    use super::*;

    #[test]
    fn validate_path_string_rejects_whitespace_only() {
        let result = validate_path_string("storage.path", "   ");
        assert!(result.unwrap_err().to_string().contains("non-empty"));
    }

    #[test]
    fn validate_path_string_rejects_overlong_component() {
        let component = "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        let result = validate_path_string("storage.path", &format!("data/{component}"));
        assert!(result.unwrap_err().to_string().contains("component too long"));
    }

    #[test]
    fn resolve_path_prefers_explicit_argument() {
        let explicit = Path::new("custom.toml");
        assert_eq!(resolve_path(Some(explicit)).unwrap(), PathBuf::from("custom.toml"));
    }
}
