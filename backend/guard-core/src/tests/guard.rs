// Unit tests for the guarded action pipeline

use crate::classifier::Failure;
use crate::config::GuardConfig;
use crate::error::{CoreError, GuardError};
use crate::guard::Kernel;
use crate::rate_limiter::RateLimitConfig;
use crate::retry::RetryConfig;
use crate::storage::AuthTokens;
use crate::validation::forms::{FIELD_EMAIL, FIELD_PASSWORD};
use crate::validation::{FormFields, FormValidator, login_form, validate_required};

use common::HttpStatusCode;
use models::{AppMode, ErrorKind, StorageTier};

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tempfile::TempDir;

fn kernel(mode: AppMode, dir: &TempDir) -> Kernel {
    let mut config = GuardConfig {
        mode,
        storage_dir: Some(dir.path().to_path_buf()),
        retry: RetryConfig::new(2, Duration::from_millis(100), 2.0),
        ..GuardConfig::default()
    };
    config.rate_limits.auth = RateLimitConfig::new(2, Duration::from_secs(60));
    Kernel::from_config(&config).unwrap()
}

fn login_fields(email: &str, password: &str) -> FormFields {
    FormFields::from([
        (FIELD_EMAIL.to_string(), email.to_string()),
        (FIELD_PASSWORD.to_string(), password.to_string()),
    ])
}

fn note_form() -> FormValidator {
    FormValidator::new().field("title", |value| validate_required(value, "Title"))
}

/// **VALUE**: Verifies a rate-limited action never reaches the operation.
///
/// **WHY THIS MATTERS**: The limiter exists to keep requests off the network.
/// If the operation ran anyway, the limit would only hide the result.
#[tokio::test(start_paused = true)]
async fn given_exhausted_limit_when_executing_then_rate_limited_without_calling_op() {
    // GIVEN: Auth limit of 2, already used twice
    let dir = TempDir::new().unwrap();
    let kernel = kernel(AppMode::Production, &dir);
    let fields = login_fields("jane@example.com", "pw");
    let calls = AtomicU32::new(0);
    let guard = kernel.auth_guard();

    for _ in 0..2 {
        let result: Result<(), GuardError> = guard
            .execute("jane", &fields, &login_form(), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<(), Failure>(()) }
            })
            .await;
        assert!(result.is_ok());
    }

    // WHEN
    let result: Result<(), GuardError> = guard
        .execute("jane", &fields, &login_form(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<(), Failure>(()) }
        })
        .await;

    // THEN
    let err = result.unwrap_err();
    assert!(matches!(err, GuardError::RateLimited { ref key, .. } if key == "jane"));
    assert_eq!(err.error_category(), "rate_limited");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn given_invalid_fields_when_executing_then_invalid_without_calling_op() {
    let dir = TempDir::new().unwrap();
    let kernel = kernel(AppMode::Production, &dir);
    let calls = AtomicU32::new(0);

    let result: Result<(), GuardError> = kernel
        .api_guard()
        .execute("notes", &FormFields::new(), &note_form(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<(), Failure>(()) }
        })
        .await;

    match result.unwrap_err() {
        GuardError::Invalid { result, .. } => {
            assert_eq!(result.error_for("title"), Some("Title is required"));
        }
        other => panic!("expected invalid input, got {other}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// **VALUE**: Verifies a failing operation is retried, then classified and
/// logged once.
///
/// **BUG THIS CATCHES**: Classifying the first failure instead of the last,
/// or skipping the error log on the way out.
#[tokio::test(start_paused = true)]
async fn given_server_errors_when_executing_then_retried_then_classified() {
    // GIVEN: 2 retries configured
    let dir = TempDir::new().unwrap();
    let kernel = kernel(AppMode::Production, &dir);
    let fields = FormFields::from([("title".to_string(), "Groceries".to_string())]);
    let calls = AtomicU32::new(0);

    // WHEN: Every call answers 503, the last with a distinct message
    let result: Result<(), GuardError> = kernel
        .api_guard()
        .execute("notes", &fields, &note_form(), || {
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                Err(Failure::from_response(
                    503u16,
                    &format!(r#"{{"message": "attempt {call}"}}"#),
                ))
            }
        })
        .await;

    // THEN: 3 calls, classified from the last failure
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let err = result.unwrap_err();
    let classified = err.classified().unwrap();
    assert_eq!(classified.kind(), ErrorKind::Api);
    assert_eq!(classified.status_code(), HttpStatusCode(503));
    assert_eq!(classified.message(), "attempt 3");

    let errors = kernel.logger().stored_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "API Error");
}

#[tokio::test(start_paused = true)]
async fn given_client_error_when_executing_then_failed_after_single_call() {
    let dir = TempDir::new().unwrap();
    let kernel = kernel(AppMode::Production, &dir);
    let fields = FormFields::from([("title".to_string(), "x".to_string())]);
    let calls = AtomicU32::new(0);

    let result: Result<(), GuardError> = kernel
        .api_guard()
        .execute("notes", &fields, &note_form(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Failure::from_response(401u16, r#"{"error": "Token expired"}"#)) }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let err = result.unwrap_err();
    assert_eq!(err.error_category(), "failed");
    assert_eq!(err.classified().unwrap().message(), "Token expired");
}

// ============================================
// LOGIN / LOGOUT
// ============================================

#[tokio::test(start_paused = true)]
async fn given_successful_login_in_production_when_completed_then_tokens_in_session_tier() {
    let dir = TempDir::new().unwrap();
    let kernel = kernel(AppMode::Production, &dir);

    let tokens = kernel
        .login(&login_fields("Jane@Example.com", "pw"), || async {
            Ok::<_, Failure>(AuthTokens::new("access-1").with_refresh_token("refresh-1"))
        })
        .await
        .unwrap();

    assert_eq!(tokens.access_token.expose(), "access-1");
    let entry = kernel.credentials().entry("auth_token").unwrap();
    assert_eq!(entry.tier, StorageTier::Session);
    assert_eq!(entry.value.expose(), "access-1");
    // Nothing durable in production
    assert!(!dir.path().join("credentials.json").exists());

    kernel.logout();
    assert!(!kernel.credentials().is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn given_development_mode_when_login_completes_then_tokens_written_to_disk() {
    let dir = TempDir::new().unwrap();
    let kernel = kernel(AppMode::Development, &dir);

    kernel.complete_login(&AuthTokens::new("dev-token"));

    assert!(dir.path().join("credentials.json").exists());
    assert_eq!(
        kernel.credentials().entry("auth_token").unwrap().tier,
        StorageTier::Persistent
    );
}

#[tokio::test(start_paused = true)]
async fn given_login_attempts_when_email_case_differs_then_share_one_limit_key() {
    let dir = TempDir::new().unwrap();
    let kernel = kernel(AppMode::Production, &dir);
    let fail = || async { Err::<AuthTokens, _>(Failure::from_response(401u16, "")) };

    let _ = kernel.login(&login_fields("jane@example.com", "pw"), fail).await;
    let _ = kernel.login(&login_fields(" JANE@example.com", "pw"), fail).await;
    let third = kernel.login(&login_fields("Jane@Example.COM", "pw"), fail).await;

    assert!(matches!(third, Err(GuardError::RateLimited { .. })));
    assert_eq!(kernel.limiters().auth.remaining("jane@example.com"), 0);
}

// ============================================
// CONSTRUCTION
// ============================================

#[test]
fn given_unusable_sink_url_when_building_kernel_then_logger_error() {
    let dir = TempDir::new().unwrap();
    let config = GuardConfig {
        error_sink_url: Some("http://".to_string()),
        storage_dir: Some(dir.path().to_path_buf()),
        ..GuardConfig::default()
    };

    let err = Kernel::from_config(&config).unwrap_err();

    assert!(matches!(err, CoreError::Logger(_)));
}

#[test]
fn given_invalid_config_when_building_kernel_then_config_error() {
    let mut config = GuardConfig::default();
    config.rate_limits.auth.max_attempts = 0;

    assert!(matches!(
        Kernel::from_config(&config),
        Err(CoreError::Config(_))
    ));
}

#[test]
fn given_kernel_when_building_csp_then_policy_carries_fresh_nonce() {
    let dir = TempDir::new().unwrap();
    let kernel = kernel(AppMode::Production, &dir);

    let (policy, nonce) = kernel.content_security_policy();
    let (_, other_nonce) = kernel.content_security_policy();

    assert!(policy.contains(&format!("'nonce-{nonce}'")));
    assert!(policy.contains("connect-src 'self' http://localhost:3000"));
    assert_ne!(nonce, other_nonce);
}
