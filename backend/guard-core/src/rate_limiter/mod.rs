//! Sliding-window admission control keyed by arbitrary strings.
//!
//! Each key owns a list of attempt timestamps. Expired timestamps are
//! dropped lazily on every check; there is no background timer.
//!
//! # Resource growth
//!
//! A key's list is bounded by `max_attempts`, but keys themselves are
//! never evicted. Callers that generate unbounded distinct keys must call
//! [`RateLimiter::reset`] or [`RateLimiter::clear_all`] themselves.

use crate::error::config::ConfigError;
use crate::logger::Logger;
use crate::time::{Clock, SystemClock};

use common::ErrorLocation;

use std::collections::{HashMap, VecDeque};
use std::panic::Location;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const AUTH_LIMITER_NAME: &str = "auth";
pub const API_LIMITER_NAME: &str = "api";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_attempts: u32,
    pub window_ms: u64,
}

impl RateLimitConfig {
    /// 5 attempts per 15 minutes.
    pub const AUTH: Self = Self {
        max_attempts: 5,
        window_ms: 15 * 60 * 1000,
    };

    /// 60 attempts per minute.
    pub const API: Self = Self {
        max_attempts: 60,
        window_ms: 60 * 1000,
    };

    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window_ms: u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    #[track_caller]
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Rate limit '{name}': max_attempts must be at least 1"),
            });
        }

        if self.window_ms == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Rate limit '{name}': window_ms must be positive"),
            });
        }

        Ok(())
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    name: String,
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, VecDeque<Instant>>>,
    clock: Arc<dyn Clock>,
    logger: Arc<Logger>,
}

impl RateLimiter {
    pub fn new(name: impl Into<String>, config: RateLimitConfig, logger: Arc<Logger>) -> Self {
        Self::with_clock(name, config, logger, Arc::new(SystemClock))
    }

    pub fn with_clock(
        name: impl Into<String>,
        config: RateLimitConfig,
        logger: Arc<Logger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            windows: Mutex::new(HashMap::new()),
            clock,
            logger,
        }
    }

    /// Limiter for login/registration attempts.
    pub fn auth(logger: Arc<Logger>) -> Self {
        Self::new(AUTH_LIMITER_NAME, RateLimitConfig::AUTH, logger)
    }

    /// Limiter for general request throttling.
    pub fn api(logger: Arc<Logger>) -> Self {
        Self::new(API_LIMITER_NAME, RateLimitConfig::API, logger)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Admit or reject one attempt for `key`.
    ///
    /// Admitted attempts are recorded; rejected ones are not.
    pub fn is_allowed(&self, key: &str) -> bool {
        let now = self.clock.now();
        let window = self.config.window();

        let rejected_count = {
            let mut windows = self.windows.lock();
            let attempts = windows.entry(key.to_owned()).or_default();
            prune(attempts, now, window);

            if attempts.len() >= self.config.max_attempts as usize {
                Some(attempts.len())
            } else {
                attempts.push_back(now);
                None
            }
        };

        match rejected_count {
            Some(count) => {
                self.logger.warn(
                    "Rate limit exceeded",
                    Some(json!({
                        "limiter": self.name,
                        "key": key,
                        "attempts": count,
                    })),
                );
                false
            }
            None => true,
        }
    }

    /// Attempts `key` may still make in the current window. Does not
    /// record anything.
    pub fn remaining(&self, key: &str) -> u32 {
        let now = self.clock.now();
        let window = self.config.window();

        let windows = self.windows.lock();
        let used = windows
            .get(key)
            .map(|attempts| {
                attempts
                    .iter()
                    .filter(|at| now.saturating_duration_since(**at) < window)
                    .count()
            })
            .unwrap_or(0);

        self.config
            .max_attempts
            .saturating_sub(u32::try_from(used).unwrap_or(u32::MAX))
    }

    pub fn reset(&self, key: &str) {
        self.windows.lock().remove(key);
    }

    pub fn clear_all(&self) {
        self.windows.lock().clear();
    }

    /// Number of keys currently holding a window.
    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().len()
    }
}

/// Drop timestamps with `now - t >= window`. Timestamps are pushed in
/// order, so expired ones are always at the front.
fn prune(attempts: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = attempts.front() {
        if now.saturating_duration_since(*oldest) >= window {
            attempts.pop_front();
        } else {
            break;
        }
    }
}

/// The two limiters every client needs.
#[derive(Debug)]
pub struct RateLimiters {
    pub auth: RateLimiter,
    pub api: RateLimiter,
}

impl RateLimiters {
    pub fn new(auth: RateLimitConfig, api: RateLimitConfig, logger: Arc<Logger>) -> Self {
        Self {
            auth: RateLimiter::new(AUTH_LIMITER_NAME, auth, Arc::clone(&logger)),
            api: RateLimiter::new(API_LIMITER_NAME, api, logger),
        }
    }
}
