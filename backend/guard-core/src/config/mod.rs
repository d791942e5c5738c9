//! Startup configuration.
//!
//! Read once at startup and never mutated. Sources, later ones winning:
//!
//! 1. built-in defaults
//! 2. `{config_dir}/guard.toml` ([`GuardConfig::load`])
//! 3. `.env` + `CLIENT_GUARD_*` environment variables
//!    ([`GuardConfig::apply_env`])

use crate::ENV_PREFIX;
use crate::error::config::ConfigError;
use crate::rate_limiter::{API_LIMITER_NAME, AUTH_LIMITER_NAME, RateLimitConfig};
use crate::retry::RetryConfig;

use common::ErrorLocation;
use models::AppMode;

use std::env;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use const_format::concatcp;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "guard.toml";

pub const ENV_MODE: &str = concatcp!(ENV_PREFIX, "MODE");
pub const ENV_ERROR_TRACKING: &str = concatcp!(ENV_PREFIX, "ERROR_TRACKING");
pub const ENV_API_BASE: &str = concatcp!(ENV_PREFIX, "API_BASE");
pub const ENV_ERROR_SINK_URL: &str = concatcp!(ENV_PREFIX, "ERROR_SINK_URL");
pub const ENV_STORAGE_DIR: &str = concatcp!(ENV_PREFIX, "STORAGE_DIR");
pub const ENV_AUTH_MAX_ATTEMPTS: &str = concatcp!(ENV_PREFIX, "AUTH_MAX_ATTEMPTS");
pub const ENV_AUTH_WINDOW_MS: &str = concatcp!(ENV_PREFIX, "AUTH_WINDOW_MS");
pub const ENV_API_MAX_ATTEMPTS: &str = concatcp!(ENV_PREFIX, "API_MAX_ATTEMPTS");
pub const ENV_API_WINDOW_MS: &str = concatcp!(ENV_PREFIX, "API_WINDOW_MS");

const DEFAULT_API_BASE: &str = "http://localhost:3000";

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default = "default_auth_limit")]
    pub auth: RateLimitConfig,
    #[serde(default = "default_api_limit")]
    pub api: RateLimitConfig,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            auth: default_auth_limit(),
            api: default_api_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default)]
    pub mode: AppMode,

    #[serde(default)]
    pub error_tracking_enabled: bool,

    /// Only used to build the content security policy.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Error-tracking endpoint for production events.
    #[serde(default)]
    pub error_sink_url: Option<String>,

    /// Directory of the durable credential tier. Platform data dir if unset.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,

    #[serde(default)]
    pub rate_limits: RateLimitSettings,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            mode: AppMode::default(),
            error_tracking_enabled: false,
            api_base: default_api_base(),
            error_sink_url: None,
            storage_dir: None,
            rate_limits: RateLimitSettings::default(),
            retry: RetryConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}
fn default_auth_limit() -> RateLimitConfig {
    RateLimitConfig::AUTH
}
fn default_api_limit() -> RateLimitConfig {
    RateLimitConfig::API
}

// ============================================
// IMPLEMENTATION
// ============================================

impl GuardConfig {
    /// Load `{config_dir}/guard.toml`.
    ///
    /// A missing file yields defaults; a file that exists but does not
    /// parse or validate is an error.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: GuardConfig = toml::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config TOML: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Defaults overlaid with `.env` and process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env()
    }

    /// Overlay `.env` (if present) and `CLIENT_GUARD_*` variables.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded .env from {}", path.display()),
            Err(e) if e.not_found() => debug!("No .env file found"),
            Err(e) => warn!("Failed to parse .env: {}", e),
        }

        self.apply_overrides(|name| env::var(name).ok())
    }

    /// Overlay values from `lookup` (variable name -> value), then validate.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup(ENV_MODE) {
            self.mode = parse_var(ENV_MODE, &mode)?;
        }

        if let Some(flag) = lookup(ENV_ERROR_TRACKING) {
            self.error_tracking_enabled = parse_flag(ENV_ERROR_TRACKING, &flag)?;
        }

        if let Some(api_base) = lookup(ENV_API_BASE) {
            self.api_base = api_base;
        }

        if let Some(url) = lookup(ENV_ERROR_SINK_URL) {
            self.error_sink_url = Some(url).filter(|url| !url.trim().is_empty());
        }

        if let Some(dir) = lookup(ENV_STORAGE_DIR) {
            self.storage_dir = Some(PathBuf::from(dir));
        }

        if let Some(value) = lookup(ENV_AUTH_MAX_ATTEMPTS) {
            self.rate_limits.auth.max_attempts = parse_var(ENV_AUTH_MAX_ATTEMPTS, &value)?;
        }

        if let Some(value) = lookup(ENV_AUTH_WINDOW_MS) {
            self.rate_limits.auth.window_ms = parse_var(ENV_AUTH_WINDOW_MS, &value)?;
        }

        if let Some(value) = lookup(ENV_API_MAX_ATTEMPTS) {
            self.rate_limits.api.max_attempts = parse_var(ENV_API_MAX_ATTEMPTS, &value)?;
        }

        if let Some(value) = lookup(ENV_API_WINDOW_MS) {
            self.rate_limits.api.window_ms = parse_var(ENV_API_WINDOW_MS, &value)?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rate_limits.auth.validate(AUTH_LIMITER_NAME)?;
        self.rate_limits.api.validate(API_LIMITER_NAME)?;
        self.retry.validate()?;

        if self.api_base.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: "api_base cannot be empty".to_string(),
            });
        }

        if let Some(ref url) = self.error_sink_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::ValidationError {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!("Invalid error sink URL: {}", url),
                });
            }
        }

        Ok(())
    }
}

#[track_caller]
fn parse_var<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::EnvError {
        location: ErrorLocation::from(Location::caller()),
        name: name.to_string(),
        reason: format!("'{raw}': {e}"),
    })
}

#[track_caller]
fn parse_flag(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::EnvError {
            location: ErrorLocation::from(Location::caller()),
            name: name.to_string(),
            reason: format!("'{raw}' is not a boolean"),
        }),
    }
}
