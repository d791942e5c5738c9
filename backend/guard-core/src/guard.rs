//! The guarded action pipeline.
//!
//! [`Kernel`] owns one instance of every component, built once from a
//! [`GuardConfig`]. Each user action runs through an [`ActionGuard`]:
//!
//! ```text
//! rate limit -> validate -> retry(op) -> classify on failure
//! ```

use crate::classifier::{Classify, handle_error};
use crate::config::GuardConfig;
use crate::error::{CoreError, GuardError};
use crate::logger::{HttpErrorSink, Logger, LoggerConfig};
use crate::rate_limiter::{RateLimiter, RateLimiters};
use crate::retry::RetryPolicy;
use crate::security::{content_security_policy, generate_nonce};
use crate::storage::{AuthTokens, CredentialStore, FileStore, MemoryStore};
use crate::validation::forms::FIELD_EMAIL;
use crate::validation::{FormFields, FormValidator, login_form};

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use log::info;
use serde_json::json;

#[derive(Debug)]
pub struct Kernel {
    config: GuardConfig,
    logger: Arc<Logger>,
    limiters: RateLimiters,
    retry: RetryPolicy,
    credentials: CredentialStore,
}

impl Kernel {
    /// Build every component from `config`.
    ///
    /// # Errors
    ///
    /// Fails if the config does not validate, the error sink URL cannot be
    /// used, or no durable storage location can be determined.
    pub fn from_config(config: &GuardConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let mut logger = Logger::new(LoggerConfig::new(
            config.mode,
            config.error_tracking_enabled,
        ));
        if let Some(url) = &config.error_sink_url {
            logger = logger.with_sink(HttpErrorSink::new(url)?);
        }
        let logger = Arc::new(logger);

        let persistent = match &config.storage_dir {
            Some(dir) => FileStore::new(dir),
            None => FileStore::in_default_location()?,
        };

        let credentials = CredentialStore::new(
            config.mode,
            MemoryStore::new(),
            persistent,
            Arc::clone(&logger),
        );

        let limiters = RateLimiters::new(
            config.rate_limits.auth,
            config.rate_limits.api,
            Arc::clone(&logger),
        );

        let retry = RetryPolicy::new(config.retry, Arc::clone(&logger));

        info!(
            "Guard kernel ready: mode={}, error_tracking={}",
            config.mode, config.error_tracking_enabled
        );

        Ok(Self {
            config: config.clone(),
            logger,
            limiters,
            retry,
            credentials,
        })
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    pub fn limiters(&self) -> &RateLimiters {
        &self.limiters
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Guard for login and registration actions.
    pub fn auth_guard(&self) -> ActionGuard<'_> {
        ActionGuard::new(&self.limiters.auth, &self.retry, &self.logger)
    }

    /// Guard for general API actions.
    pub fn api_guard(&self) -> ActionGuard<'_> {
        ActionGuard::new(&self.limiters.api, &self.retry, &self.logger)
    }

    /// Policy string for the configured API base, with a fresh nonce.
    pub fn content_security_policy(&self) -> (String, String) {
        let nonce = generate_nonce();
        let policy = content_security_policy(&self.config.api_base, Some(&nonce));
        (policy, nonce)
    }

    /// Run a login through the auth guard, keyed by the normalized email,
    /// and store the returned tokens.
    pub async fn login<E, F, Fut>(
        &self,
        fields: &FormFields,
        operation: F,
    ) -> Result<AuthTokens, GuardError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<AuthTokens, E>>,
        E: Classify + Display,
    {
        let key = fields
            .get(FIELD_EMAIL)
            .map(|email| email.trim().to_lowercase())
            .unwrap_or_default();

        let tokens = self
            .auth_guard()
            .execute(&key, fields, &login_form(), operation)
            .await?;

        self.complete_login(&tokens);
        Ok(tokens)
    }

    /// Persist tokens from a successful authentication.
    pub fn complete_login(&self, tokens: &AuthTokens) {
        self.credentials.store_auth_tokens(tokens);
        self.logger.info(
            "Login completed",
            Some(json!({
                "tier": self.credentials.write_tier(),
                "hasRefreshToken": tokens.refresh_token.is_some(),
            })),
        );
    }

    pub fn logout(&self) {
        self.credentials.clear_auth();
        self.logger.info("Logged out", None);
    }
}

/// One limiter plus the shared retry policy and logger.
#[derive(Debug, Clone, Copy)]
pub struct ActionGuard<'a> {
    limiter: &'a RateLimiter,
    retry: &'a RetryPolicy,
    logger: &'a Logger,
}

impl<'a> ActionGuard<'a> {
    pub fn new(limiter: &'a RateLimiter, retry: &'a RetryPolicy, logger: &'a Logger) -> Self {
        Self {
            limiter,
            retry,
            logger,
        }
    }

    /// Rate limit `key`, validate `fields`, then run `operation` under the
    /// retry policy. A rejected or invalid action never invokes
    /// `operation`.
    pub async fn execute<T, E, F, Fut>(
        &self,
        key: &str,
        fields: &FormFields,
        validator: &FormValidator,
        operation: F,
    ) -> Result<T, GuardError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + Display,
    {
        if !self.limiter.is_allowed(key) {
            return Err(GuardError::rate_limited(key));
        }

        let form = validator.validate(fields);
        if !form.is_valid {
            self.logger.warn(
                "Form validation failed",
                Some(json!({
                    "limiter": self.limiter.name(),
                    "fields": form.errors.keys().collect::<Vec<_>>(),
                })),
            );
            return Err(GuardError::invalid(form));
        }

        match self.retry.run(operation).await {
            Ok(value) => Ok(value),
            Err(e) => Err(GuardError::failed(handle_error(&e, self.logger))),
        }
    }
}
