// Tests for configuration loading

use std::fs;
use std::time::Duration;

use tempfile::TempDir;
use zukii::api::DEFAULT_API_BASE;
use zukii::config::Config;

#[test]
fn test_missing_config_creates_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.yml");
    let path_str = path.to_string_lossy().to_string();

    let config = Config::load(Some(&path_str)).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.api_base_url, DEFAULT_API_BASE);
    assert_eq!(config.polling.interval(), Duration::from_secs(5));
    assert!(config.polling.max_ticks.is_none());
    assert!(path.exists());
}

#[test]
fn test_partial_config_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yml");
    fs::write(
        &path,
        r#"
api_base_url: http://localhost:4000/api
polling:
  max_ticks: 120
"#,
    )
    .unwrap();

    let config = Config::load(path.to_str()).unwrap();

    assert_eq!(config.api_base_url, "http://localhost:4000/api");
    assert_eq!(config.polling.interval_secs, 5);
    assert_eq!(config.polling.max_ticks, Some(120));
    assert_eq!(config.http.timeout(), Duration::from_secs(30));
}

#[test]
fn test_invalid_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yml");
    fs::write(&path, "polling: [not, a, map]").unwrap();

    assert!(Config::load(path.to_str()).is_err());
}

#[test]
fn test_save_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yml");
    let path_str = path.to_string_lossy().to_string();

    let mut config = Config::default();
    config.database_path = temp_dir.path().join("zukii.db").to_string_lossy().to_string();
    config.polling.interval_secs = 2;
    config.save(Some(&path_str)).unwrap();

    let loaded = Config::load(Some(&path_str)).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.resolve_db_path().unwrap(), temp_dir.path().join("zukii.db"));
}

#[test]
fn test_zero_interval_is_clamped() {
    let mut config = Config::default();
    config.polling.interval_secs = 0;
    assert_eq!(config.polling.interval(), Duration::from_secs(1));
}
