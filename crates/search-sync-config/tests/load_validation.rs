//! Config load validation tests for search-sync-config.
// crates/search-sync-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, syntax).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use search_sync_config::ConfigError;
use search_sync_config::SearchSyncConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<SearchSyncConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(contents: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(contents).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(SearchSyncConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(SearchSyncConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(SearchSyncConfig::load(Some(&path)), "config io error")?;
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'a'; 1_048_577])?;
    assert_invalid(SearchSyncConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(SearchSyncConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_invalid_toml() -> TestResult {
    let file = write_config(b"[source\nsite = ")?;
    assert_invalid(SearchSyncConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    let file = write_config(b"[source]\nsite = \"sc-domain:example.com\"\nsiteurl = \"x\"\n")?;
    assert_invalid(SearchSyncConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_requires_site() -> TestResult {
    let file = write_config(b"[sync]\nmax_days_per_run = 3\n")?;
    assert_invalid(SearchSyncConfig::load(Some(file.path())), "source.site must be set")?;
    Ok(())
}

#[test]
fn load_accepts_minimal_file() -> TestResult {
    let file = write_config(b"[source]\nsite = \"https://example.com/\"\n")?;
    let config = SearchSyncConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.source.site != "https://example.com/" {
        return Err(format!("unexpected site {}", config.source.site));
    }
    Ok(())
}
