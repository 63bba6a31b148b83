//! Configuration system tests
//!
//! Tests for config paths and surface config loading/saving.

use sigil::config::{SurfaceConfig, DEFAULT_IGNORE_ATTRIBUTE};
use sigil::config_paths;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_file_ends_with_yaml() {
    if let Some(path) = config_paths::config_file() {
        assert!(path.to_string_lossy().ends_with("config.yaml"));
        assert!(path.to_string_lossy().contains("sigil"));
    }
}

#[test]
fn test_logs_dir_is_subdir_of_config() {
    if let (Some(config), Some(logs)) = (config_paths::config_dir(), config_paths::logs_dir()) {
        assert!(logs.starts_with(&config));
    }
}

#[test]
fn test_latest_log_file_picks_newest_date() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["sigil.log.2026-10-01", "sigil.log.2026-10-19", "other.txt"] {
        std::fs::write(dir.path().join(name), "").unwrap();
    }
    assert_eq!(
        config_paths::latest_log_file(dir.path()),
        dir.path().join("sigil.log.2026-10-19")
    );
}

#[test]
fn test_latest_log_file_falls_back_to_prefix() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        config_paths::latest_log_file(dir.path()),
        dir.path().join(config_paths::LOG_FILE_PREFIX)
    );
}

// ========================================================================
// Surface Config Tests
// ========================================================================

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let config = SurfaceConfig {
        default_content: "Hello <b>there</b>".into(),
        auto_focus: true,
        ignore_attribute: "data-keep-open".into(),
        break_chars: vec![',', '.'],
        clear_on_blur_when_empty: false,
    };
    config.save_to(&path).unwrap();
    assert_eq!(SurfaceConfig::load_from(&path), config);
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = SurfaceConfig::load_from(&dir.path().join("absent.yaml"));
    assert_eq!(config, SurfaceConfig::default());
}

#[test]
fn test_invalid_yaml_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "auto_focus: [not, a, bool\n").unwrap();
    assert_eq!(SurfaceConfig::load_from(&path), SurfaceConfig::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "clear_on_blur_when_empty: false\n").unwrap();

    let config = SurfaceConfig::load_from(&path);
    assert!(!config.clear_on_blur_when_empty);
    assert_eq!(config.ignore_attribute, DEFAULT_IGNORE_ATTRIBUTE);
}
