//! Unit tests for bootstrap configuration resolution
//!
//! Tests cover:
//! - Missing TOML file falls back to defaults
//! - Priority order CLI > environment > TOML > compiled default
//! - Recommendation quota parsing and validation
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate ESL_ROOT_FOLDER or ESL_BIND_ADDR are marked with
//! #[serial] to ensure they run sequentially.

use esl_common::config::{
    get_default_root_folder, resolve_bind_addr, resolve_root_folder, RecommendationConfig,
    TomlConfig, BIND_ADDR_ENV, DEFAULT_BIND_ADDR, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_parse_full_config() {
    let toml = r#"
        root_folder = "/srv/esl"
        bind_addr = "0.0.0.0:8080"

        [logging]
        level = "debug"

        [recommendation]
        batch_size = 12
        fresh_quota = 8
        reinforce_quota = 4
        reinforce_min_count = 1
        reinforce_max_count = 5
    "#;

    let config = TomlConfig::from_toml_str(toml).expect("Should parse");
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/esl")));
    assert_eq!(config.bind_addr.as_deref(), Some("0.0.0.0:8080"));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.recommendation.batch_size, 12);
    assert_eq!(config.recommendation.reinforce_max_count, 5);
}

#[test]
fn test_parse_empty_config_uses_defaults() {
    let config = TomlConfig::from_toml_str("").expect("Empty TOML is valid");
    assert!(config.root_folder.is_none());
    assert!(config.bind_addr.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.recommendation, RecommendationConfig::default());
}

#[test]
fn test_partial_recommendation_section_keeps_other_defaults() {
    let config = TomlConfig::from_toml_str("[recommendation]\nbatch_size = 5\n").unwrap();
    assert_eq!(config.recommendation.batch_size, 5);
    assert_eq!(config.recommendation.fresh_quota, 7);
    assert_eq!(config.recommendation.reinforce_quota, 3);
}

#[test]
fn test_invalid_recommendation_rejected() {
    let result = TomlConfig::from_toml_str(
        "[recommendation]\nreinforce_min_count = 0\n",
    );
    assert!(result.is_err());
}

#[test]
fn test_malformed_toml_rejected() {
    assert!(TomlConfig::from_toml_str("root_folder = ").is_err());
}

#[test]
fn test_load_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "bind_addr = \"127.0.0.1:9999\"\n").unwrap();

    let config = TomlConfig::load(Some(&path)).expect("Should load explicit file");
    assert_eq!(config.bind_addr.as_deref(), Some("127.0.0.1:9999"));
}

#[test]
fn test_load_missing_explicit_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.toml");
    assert!(TomlConfig::load(Some(&path)).is_err());
}

#[test]
#[serial]
fn test_root_folder_cli_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = resolve_root_folder(Some(Path::new("/from/cli")), &toml);
    assert_eq!(resolved, PathBuf::from("/from/cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_root_folder_env_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    assert_eq!(resolve_root_folder(None, &toml), PathBuf::from("/from/env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_root_folder_toml_then_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };
    assert_eq!(resolve_root_folder(None, &toml), PathBuf::from("/from/toml"));

    let empty = TomlConfig::default();
    assert_eq!(resolve_root_folder(None, &empty), get_default_root_folder());
}

#[test]
#[serial]
fn test_bind_addr_resolution() {
    env::remove_var(BIND_ADDR_ENV);
    let empty = TomlConfig::default();
    assert_eq!(resolve_bind_addr(None, &empty), DEFAULT_BIND_ADDR);

    let toml = TomlConfig {
        bind_addr: Some("127.0.0.1:7000".to_string()),
        ..Default::default()
    };
    assert_eq!(resolve_bind_addr(None, &toml), "127.0.0.1:7000");

    env::set_var(BIND_ADDR_ENV, "127.0.0.1:7001");
    assert_eq!(resolve_bind_addr(None, &toml), "127.0.0.1:7001");
    assert_eq!(resolve_bind_addr(Some("127.0.0.1:7002"), &toml), "127.0.0.1:7002");
    env::remove_var(BIND_ADDR_ENV);
}
