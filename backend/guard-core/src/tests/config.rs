// Unit tests for configuration loading, overrides and validation

use crate::config::{
    CONFIG_FILE_NAME, ENV_API_BASE, ENV_AUTH_MAX_ATTEMPTS, ENV_ERROR_SINK_URL,
    ENV_ERROR_TRACKING, ENV_MODE, ENV_STORAGE_DIR, GuardConfig,
};
use crate::error::config::ConfigError;
use crate::rate_limiter::RateLimitConfig;
use crate::retry::RetryConfig;

use models::AppMode;

use std::collections::HashMap;
use std::path::PathBuf;

use serial_test::serial;
use tempfile::TempDir;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn given_defaults_when_inspected_then_match_documented_values() {
    let config = GuardConfig::default();

    assert_eq!(config.mode, AppMode::Development);
    assert!(!config.error_tracking_enabled);
    assert_eq!(config.error_sink_url, None);
    assert_eq!(config.rate_limits.auth, RateLimitConfig::AUTH);
    assert_eq!(config.rate_limits.api, RateLimitConfig::API);
    assert_eq!(config.retry, RetryConfig::default());
    assert!(config.validate().is_ok());
}

// ============================================
// TOML
// ============================================

#[test]
fn given_no_config_file_when_loading_then_defaults() {
    let dir = TempDir::new().unwrap();

    let config = GuardConfig::load(dir.path()).unwrap();

    assert_eq!(config, GuardConfig::default());
}

/// **VALUE**: Verifies a partial TOML file overrides only what it names.
///
/// **WHY THIS MATTERS**: Operators set one or two values; everything else
/// must keep its default rather than zeroing out (a zero rate limit would
/// lock every user out).
#[test]
fn given_partial_config_file_when_loading_then_missing_values_defaulted() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
mode = "production"
error_tracking_enabled = true
error_sink_url = "https://errors.example.com/ingest"

[rate_limits.auth]
max_attempts = 3
window_ms = 60000

[retry]
retries = 5
"#,
    )
    .unwrap();

    // WHEN
    let config = GuardConfig::load(dir.path()).unwrap();

    // THEN
    assert_eq!(config.mode, AppMode::Production);
    assert!(config.error_tracking_enabled);
    assert_eq!(
        config.error_sink_url.as_deref(),
        Some("https://errors.example.com/ingest")
    );
    assert_eq!(config.rate_limits.auth.max_attempts, 3);
    assert_eq!(config.rate_limits.api, RateLimitConfig::API);
    assert_eq!(config.retry.retries, 5);
    assert_eq!(config.retry.delay_ms, 1000);
    assert_eq!(config.retry.backoff_multiplier, 2.0);
}

#[test]
fn given_corrupt_config_file_when_loading_then_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "mode = [unterminated").unwrap();

    let err = GuardConfig::load(dir.path()).unwrap_err();

    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert!(err.to_string().contains("Config Parse Error"));
}

#[test]
fn given_invalid_values_in_file_when_loading_then_validation_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[retry]\nbackoff_multiplier = 0.5\n",
    )
    .unwrap();

    let err = GuardConfig::load(dir.path()).unwrap_err();

    assert!(matches!(err, ConfigError::ValidationError { .. }));
}

// ============================================
// OVERRIDES
// ============================================

#[test]
fn given_override_variables_when_applied_then_fields_replaced() {
    let config = GuardConfig::default()
        .apply_overrides(lookup(&[
            (ENV_MODE, "prod"),
            (ENV_ERROR_TRACKING, "yes"),
            (ENV_API_BASE, "https://api.example.com"),
            (ENV_STORAGE_DIR, "/var/lib/guard"),
            (ENV_AUTH_MAX_ATTEMPTS, " 10 "),
        ]))
        .unwrap();

    assert_eq!(config.mode, AppMode::Production);
    assert!(config.error_tracking_enabled);
    assert_eq!(config.api_base, "https://api.example.com");
    assert_eq!(config.storage_dir, Some(PathBuf::from("/var/lib/guard")));
    assert_eq!(config.rate_limits.auth.max_attempts, 10);
    assert_eq!(config.rate_limits.auth.window_ms, RateLimitConfig::AUTH.window_ms);
}

#[test]
fn given_blank_sink_url_override_when_applied_then_sink_disabled() {
    let base = GuardConfig {
        error_sink_url: Some("https://errors.example.com".to_string()),
        ..GuardConfig::default()
    };

    let config = base.apply_overrides(lookup(&[(ENV_ERROR_SINK_URL, "")])).unwrap();

    assert_eq!(config.error_sink_url, None);
}

#[test]
fn given_unparseable_override_when_applied_then_env_error_names_variable() {
    let err = GuardConfig::default()
        .apply_overrides(lookup(&[(ENV_AUTH_MAX_ATTEMPTS, "many")]))
        .unwrap_err();

    match err {
        ConfigError::EnvError { name, .. } => assert_eq!(name, ENV_AUTH_MAX_ATTEMPTS),
        other => panic!("expected env error, got {other:?}"),
    }

    assert!(
        GuardConfig::default()
            .apply_overrides(lookup(&[(ENV_ERROR_TRACKING, "maybe")]))
            .is_err()
    );
    assert!(
        GuardConfig::default()
            .apply_overrides(lookup(&[(ENV_MODE, "staging")]))
            .is_err()
    );
}

#[test]
fn given_override_breaking_invariant_when_applied_then_validation_error() {
    let err = GuardConfig::default()
        .apply_overrides(lookup(&[(ENV_AUTH_MAX_ATTEMPTS, "0")]))
        .unwrap_err();

    assert!(matches!(err, ConfigError::ValidationError { .. }));
}

#[test]
#[serial]
fn given_process_environment_when_loading_from_env_then_variables_applied() {
    // SAFETY: serialized with every other test touching the environment
    unsafe {
        std::env::set_var(ENV_MODE, "production");
        std::env::set_var(ENV_API_BASE, "https://env.example.com");
    }

    let result = GuardConfig::from_env();

    unsafe {
        std::env::remove_var(ENV_MODE);
        std::env::remove_var(ENV_API_BASE);
    }

    let config = result.unwrap();
    assert_eq!(config.mode, AppMode::Production);
    assert_eq!(config.api_base, "https://env.example.com");
}

// ============================================
// VALIDATION
// ============================================

#[test]
fn given_bad_values_when_validating_then_each_rejected() {
    let empty_api_base = GuardConfig {
        api_base: "  ".to_string(),
        ..GuardConfig::default()
    };
    assert!(empty_api_base.validate().is_err());

    let bad_sink = GuardConfig {
        error_sink_url: Some("ftp://errors".to_string()),
        ..GuardConfig::default()
    };
    assert!(bad_sink.validate().is_err());

    let mut zero_window = GuardConfig::default();
    zero_window.rate_limits.api.window_ms = 0;
    let err = zero_window.validate().unwrap_err();
    assert!(err.to_string().contains("'api'"));
}
