// Unit tests for configuration loading

use super::*;
use serial_test::serial;

fn clear_env() {
    // SAFETY: env-touching tests run under #[serial]
    unsafe {
        std::env::remove_var("JOBFILL_API_BASE");
        std::env::remove_var("JOBFILL_MODELS");
        std::env::remove_var("JOBFILL_TEMPERATURE");
    }
}

#[test]
fn test_defaults() {
    let config = FillerConfig::default();
    assert_eq!(config.api_base, DEFAULT_API_BASE);
    assert_eq!(
        config.models,
        vec!["gemini-2.5-flash", "gemini-2.0-flash", "gemini-2.5-flash-lite"]
    );
    assert_eq!(config.temperature, 0.8);
    assert_eq!(config.max_output_tokens, 4096);
    assert_eq!(config.default_text_limit, 500);
    assert_eq!(config.writer.field_delay(), Duration::from_millis(200));
    assert_eq!(config.writer.widget_delay(), Duration::from_millis(1000));
}

#[test]
fn test_immediate_writer_settings() {
    let settings = WriterSettings::immediate();
    assert_eq!(settings.field_delay(), Duration::ZERO);
    assert_eq!(settings.widget_open_delay(), Duration::ZERO);
    assert!(settings.highlight);
}

#[test]
fn test_load_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = FillerConfig::load_from(&dir.path().join("config.json")).unwrap();
    assert_eq!(config, FillerConfig::default());
}

#[test]
fn test_partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"models": ["gemini-2.0-flash"], "writer": {"field_delay_ms": 50}}"#,
    )
    .unwrap();

    let config = FillerConfig::load_from(&path).unwrap();
    assert_eq!(config.models, vec!["gemini-2.0-flash"]);
    assert_eq!(config.writer.field_delay_ms, 50);
    assert_eq!(config.writer.widget_delay_ms, 1000);
    assert_eq!(config.temperature, 0.8);
}

#[test]
fn test_invalid_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(FillerConfig::load_from(&path).is_err());
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    unsafe {
        std::env::set_var("JOBFILL_API_BASE", "http://127.0.0.1:9999/v1beta/");
        std::env::set_var("JOBFILL_MODELS", " model-a , ,model-b");
        std::env::set_var("JOBFILL_TEMPERATURE", "0.2");
    }

    let config = FillerConfig::default().with_env_overrides().unwrap();
    clear_env();

    assert_eq!(config.api_base, "http://127.0.0.1:9999/v1beta");
    assert_eq!(config.models, vec!["model-a", "model-b"]);
    assert_eq!(config.temperature, 0.2);
}

#[test]
#[serial]
fn test_env_override_errors() {
    clear_env();
    unsafe { std::env::set_var("JOBFILL_MODELS", " , ") };
    assert!(FillerConfig::default().with_env_overrides().is_err());
    clear_env();

    unsafe { std::env::set_var("JOBFILL_TEMPERATURE", "warm") };
    assert!(FillerConfig::default().with_env_overrides().is_err());
    clear_env();
}

#[test]
fn test_model_calls_have_no_timeout_setting() {
    let json = serde_json::to_value(FillerConfig::default()).unwrap();
    assert!(json.get("request_timeout_secs").is_none());

    // Files written by older versions still load
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"request_timeout_secs": 300, "temperature": 0.5}"#).unwrap();
    let config = FillerConfig::load_from(&path).unwrap();
    assert_eq!(config.temperature, 0.5);
}
