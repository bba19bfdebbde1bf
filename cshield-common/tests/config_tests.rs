//! Integration tests for configuration resolution
//!
//! Covers the resolution priority (CLI → environment → file → defaults)
//! and graceful fallback when no config file exists.
//!
//! Note: Uses serial_test to prevent environment variable races. Tests that
//! touch CSHIELD_CONFIG or CSHIELD_SERVER_URL are marked #[serial].

use cshield_common::config::{ClientConfig, ConfigResolver, CONFIG_ENV_VAR, SERVER_URL_ENV_VAR};
use cshield_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn clear_env() {
    env::remove_var(CONFIG_ENV_VAR);
    env::remove_var(SERVER_URL_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_config_file_is_loaded() {
    clear_env();
    let file = write_config(
        r#"
        server_url = "http://10.0.0.5:5000"
        [playback]
        countdown_interval_ms = 250
        "#,
    );

    let config = ConfigResolver::new("test")
        .resolve(Some(file.path()), None)
        .unwrap();
    assert_eq!(config.server_url, "http://10.0.0.5:5000");
    assert_eq!(config.playback.countdown_interval_ms, 250);
}

#[test]
#[serial]
fn test_env_config_file_used_without_cli() {
    clear_env();
    let file = write_config(r#"server_url = "http://env-file:5000""#);
    env::set_var(CONFIG_ENV_VAR, file.path());

    let config = ConfigResolver::new("test").resolve(None, None).unwrap();
    assert_eq!(config.server_url, "http://env-file:5000");

    clear_env();
}

#[test]
#[serial]
fn test_cli_server_url_beats_env_and_file() {
    clear_env();
    let file = write_config(r#"server_url = "http://from-file:5000""#);
    env::set_var(SERVER_URL_ENV_VAR, "http://from-env:5000");

    let config = ConfigResolver::new("test")
        .resolve(Some(file.path()), Some("http://from-cli:5000"))
        .unwrap();
    assert_eq!(config.server_url, "http://from-cli:5000");

    let config = ConfigResolver::new("test")
        .resolve(Some(file.path()), None)
        .unwrap();
    assert_eq!(config.server_url, "http://from-env:5000");

    clear_env();
}

#[test]
#[serial]
fn test_missing_explicit_config_is_an_error() {
    clear_env();
    let result = ConfigResolver::new("test").resolve(
        Some(std::path::Path::new("/nonexistent/cshield/config.toml")),
        None,
    );
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_invalid_file_values_rejected_after_merge() {
    clear_env();
    let file = write_config(
        r#"
        [playback]
        warning_threshold_secs = 30
        danger_threshold_secs = 60
        "#,
    );
    let result = ConfigResolver::new("test").resolve(Some(file.path()), None);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_toml_reports_config_error() {
    let result = ClientConfig::from_toml_str("server_url = ");
    assert!(matches!(result, Err(Error::Config(_))));
}
