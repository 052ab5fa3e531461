//! Tests for configuration file resolution
//!
//! Uses serial_test to prevent environment variable races: tests that touch
//! PREVIEW_TEST_CONFIG are marked #[serial].

use preview_common::config::{read_config_file, resolve_config_path, ConfigSource};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::Path;

const ENV_VAR: &str = "PREVIEW_TEST_CONFIG";
const APP: &str = "preview-common-test-app-that-does-not-exist";

#[test]
#[serial]
fn test_cli_argument_wins_over_environment() {
    env::set_var(ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/from-cli.toml")), ENV_VAR, APP);

    env::remove_var(ENV_VAR);

    let (path, source) = resolved.expect("CLI path should resolve");
    assert_eq!(path, Path::new("/tmp/from-cli.toml"));
    assert_eq!(source, ConfigSource::CommandLine);
}

#[test]
#[serial]
fn test_environment_used_without_cli_argument() {
    env::set_var(ENV_VAR, "/tmp/from-env.toml");

    let resolved = resolve_config_path(None, ENV_VAR, APP);

    env::remove_var(ENV_VAR);

    let (path, source) = resolved.expect("env path should resolve");
    assert_eq!(path, Path::new("/tmp/from-env.toml"));
    assert_eq!(source, ConfigSource::Environment);
}

#[test]
#[serial]
fn test_blank_environment_is_ignored() {
    env::set_var(ENV_VAR, "   ");

    let resolved = resolve_config_path(None, ENV_VAR, APP);

    env::remove_var(ENV_VAR);

    assert!(resolved.is_none());
}

#[test]
#[serial]
fn test_nothing_configured_resolves_to_none() {
    env::remove_var(ENV_VAR);
    assert!(resolve_config_path(None, ENV_VAR, APP).is_none());
}

#[test]
fn test_read_missing_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let content = read_config_file(&dir.path().join("absent.toml")).unwrap();
    assert!(content.is_none());
}

#[test]
fn test_read_existing_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[fade]\nduration_ms = 300").unwrap();

    let content = read_config_file(file.path()).unwrap().unwrap();
    assert!(content.contains("duration_ms = 300"));
}

#[test]
fn test_read_directory_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(read_config_file(dir.path()).is_err());
}
