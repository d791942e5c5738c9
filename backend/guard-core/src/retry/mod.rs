//! Bounded exponential-backoff retry.
//!
//! The policy is a loop with an explicit attempt counter. Delays follow
//! the exact geometric schedule `delay, delay*m, delay*m^2, ...`; the worst
//! case total wait is `delay * (m^retries - 1) / (m - 1)`.
//!
//! A failure stops the loop when retries are exhausted or when it carries
//! a 4xx transport response. The original failure is returned unchanged.

use crate::classifier::Classify;
use crate::error::config::ConfigError;
use crate::logger::Logger;

use common::ErrorLocation;
use models::RetryAttempt;

use std::fmt::{self, Display};
use std::future::Future;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::sleep as TokioSleep;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_DELAY_MS: u64 = 1000;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Longest single wait a configuration may schedule.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(retries: u32, delay: Duration, backoff_multiplier: f64) -> Self {
        Self {
            retries,
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            backoff_multiplier,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// The waits a run will perform if every attempt fails transiently.
    ///
    /// Each wait is capped at [`MAX_RETRY_DELAY`], as it is during a run.
    pub fn schedule(self) -> impl Iterator<Item = Duration> {
        (0..self.retries).map(move |step| self.wait_at(step))
    }

    /// Sum of [`RetryConfig::schedule`], saturating at [`Duration::MAX`].
    pub fn worst_case_wait(&self) -> Duration {
        let mut total = Duration::ZERO;
        for (step, wait) in (0..self.retries).zip(self.schedule()) {
            if wait == MAX_RETRY_DELAY && self.backoff_multiplier >= 1.0 {
                // Waits never shrink, so every later one is capped too.
                return total.saturating_add(MAX_RETRY_DELAY.saturating_mul(self.retries - step));
            }
            total = total.saturating_add(wait);
        }
        total
    }

    fn wait_at(&self, step: u32) -> Duration {
        let factor = self.backoff_multiplier.powf(f64::from(step));
        Duration::try_from_secs_f64(self.delay().as_secs_f64() * factor)
            .map_or(MAX_RETRY_DELAY, |wait| wait.min(MAX_RETRY_DELAY))
    }

    #[track_caller]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid backoff multiplier: {} (must be >= 1.0)",
                    self.backoff_multiplier
                ),
            });
        }

        let last_delay = self.retries.checked_sub(1).map(|step| {
            self.delay_ms as f64 * self.backoff_multiplier.powf(f64::from(step))
        });
        if last_delay.is_some_and(|ms| ms > MAX_RETRY_DELAY.as_millis() as f64) {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Retry schedule exceeds {}s per wait ({} retries from {}ms x{})",
                    MAX_RETRY_DELAY.as_secs(),
                    self.retries,
                    self.delay_ms,
                    self.backoff_multiplier
                ),
            });
        }

        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            delay_ms: default_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}
fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}
fn default_backoff_multiplier() -> f64 {
    DEFAULT_BACKOFF_MULTIPLIER
}

type Observer = Arc<dyn Fn(&RetryAttempt) + Send + Sync>;

/// Re-invokes failing async operations on a geometric schedule.
#[derive(Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    logger: Arc<Logger>,
    observer: Option<Observer>,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig, logger: Arc<Logger>) -> Self {
        Self {
            config,
            logger,
            observer: None,
        }
    }

    /// Called with a [`RetryAttempt`] right before each wait.
    pub fn with_observer(mut self, observer: impl Fn(&RetryAttempt) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `operation` until it succeeds or a terminal condition is hit.
    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        self.execute(operation, None).await
    }

    /// Like [`RetryPolicy::run`], but `cancel` is checked before every wait
    /// and aborts a wait in progress. A cancelled run returns the last
    /// failure unchanged.
    pub async fn run_cancellable<T, E, F, Fut>(
        &self,
        operation: F,
        cancel: &CancellationToken,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        self.execute(operation, Some(cancel)).await
    }

    async fn execute<T, E, F, Fut>(
        &self,
        mut operation: F,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        let mut schedule = self.schedule();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Operation succeeded on attempt {attempt}");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if attempt > self.config.retries {
                self.logger.warn(
                    "Retries exhausted",
                    Some(json!({ "attempts": attempt, "error": error.to_string() })),
                );
                return Err(error);
            }

            if !error.is_retryable() {
                debug!("Not retrying client error on attempt {attempt}: {error}");
                return Err(error);
            }

            let Some(delay) = schedule.next_backoff() else {
                return Err(error);
            };

            if cancel.is_some_and(CancellationToken::is_cancelled) {
                self.logger.info(
                    "Retry cancelled",
                    Some(json!({ "attempts": attempt })),
                );
                return Err(error);
            }

            let record = RetryAttempt {
                attempt_number: attempt,
                delay,
                last_error: error.to_string(),
            };
            self.report(&record);

            match cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => {
                            self.logger.info(
                                "Retry cancelled during backoff",
                                Some(json!({ "attempts": attempt })),
                            );
                            return Err(error);
                        }
                        _ = TokioSleep(delay) => {}
                    }
                }
                None => TokioSleep(delay).await,
            }

            trace!("Retrying after {delay:?}");
        }
    }

    /// Exact geometric delays: no jitter, no elapsed-time cap.
    fn schedule(&self) -> ExponentialBackoff {
        let delay = self.config.delay();
        ExponentialBackoff {
            current_interval: delay,
            initial_interval: delay,
            randomization_factor: 0.0,
            multiplier: self.config.backoff_multiplier,
            max_interval: MAX_RETRY_DELAY,
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    fn report(&self, record: &RetryAttempt) {
        self.logger.warn(
            "Operation failed, retrying",
            Some(json!({
                "attempt": record.attempt_number,
                "delayMs": record.delay.as_millis() as u64,
                "error": record.last_error,
            })),
        );

        if let Some(observer) = &self.observer {
            observer(record);
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
