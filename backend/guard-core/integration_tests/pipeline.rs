use guard_core::Kernel;
use guard_core::classifier::{AppError, Failure};
use guard_core::config::{CONFIG_FILE_NAME, GuardConfig};
use guard_core::error::GuardError;
use guard_core::storage::AuthTokens;
use guard_core::validation::forms::{
    FIELD_CONFIRM_PASSWORD, FIELD_DATE_OF_BIRTH, FIELD_EMAIL, FIELD_FULL_NAME, FIELD_PASSWORD,
    FIELD_ROLE,
};
use guard_core::validation::{FormFields, registration_form};

use models::{AppMode, ErrorKind};

use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn registration(email: &str, confirm: &str) -> FormFields {
    FormFields::from([
        (FIELD_FULL_NAME.to_string(), "Jane Doe".to_string()),
        (FIELD_EMAIL.to_string(), email.to_string()),
        (FIELD_PASSWORD.to_string(), "abcdefg1".to_string()),
        (FIELD_CONFIRM_PASSWORD.to_string(), confirm.to_string()),
        (FIELD_ROLE.to_string(), "user".to_string()),
        (FIELD_DATE_OF_BIRTH.to_string(), "1990-05-01".to_string()),
    ])
}

/// Kernel configured from a `guard.toml` the way an application would be.
fn kernel_from_file(dir: &TempDir, extra: &str) -> Kernel {
    let contents = format!(
        "mode = \"production\"\nstorage_dir = \"{}\"\n{extra}",
        dir.path().join("store").display()
    );
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), contents).unwrap();

    let config = GuardConfig::load(dir.path()).unwrap();
    Kernel::from_config(&config).unwrap()
}

/// **VALUE**: Walks one registration through every stage of the pipeline
/// against a real HTTP endpoint.
///
/// **WHY THIS MATTERS**: Each component is unit tested alone; this proves
/// they compose in the documented order: rate limit, validate, retry,
/// classify, store.
#[tokio::test]
async fn given_registration_flow_when_executed_end_to_end_then_each_stage_applies() {
    // GIVEN: An API that fails once with 503, then issues a token
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "issued" })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let kernel = kernel_from_file(&dir, "[retry]\ndelay_ms = 10\n");
    let client = reqwest::Client::new();
    let url = format!("{}/register", server.uri());

    let register = || {
        let client = client.clone();
        let url = url.clone();
        async move {
            let response = client.post(&url).send().await?;
            if !response.status().is_success() {
                return Err(Failure::from_response(response.status().as_u16(), ""));
            }
            let body: serde_json::Value = response.json().await?;
            let token = body["token"].as_str().unwrap_or_default().to_string();
            Ok::<_, Failure>(AuthTokens::new(token))
        }
    };

    // WHEN: An invalid submission first, then a valid one
    let invalid = kernel
        .auth_guard()
        .execute(
            "jane@example.com",
            &registration("jane@example.com", "mismatch1"),
            &registration_form(),
            register,
        )
        .await;

    let tokens = kernel
        .auth_guard()
        .execute(
            "jane@example.com",
            &registration("jane@example.com", "abcdefg1"),
            &registration_form(),
            register,
        )
        .await
        .unwrap();
    kernel.complete_login(&tokens);

    // THEN: Invalid input never hit the network; the valid one retried once
    assert!(matches!(invalid, Err(GuardError::Invalid { .. })));
    assert_eq!(server.received_requests().await.unwrap_or_default().len(), 2);
    assert_eq!(kernel.credentials().access_token().unwrap().expose(), "issued");
    assert_eq!(kernel.limiters().auth.remaining("jane@example.com"), 3);
    assert_eq!(kernel.config().mode, AppMode::Production);
}

#[tokio::test]
async fn given_domain_error_from_operation_when_executed_then_classified_by_kind() {
    let dir = TempDir::new().unwrap();
    let kernel = kernel_from_file(&dir, "[retry]\nretries = 0\n");
    let calls = AtomicU32::new(0);

    let result: Result<(), GuardError> = kernel
        .api_guard()
        .execute("profile", &FormFields::new(), &Default::default(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Failure::App(AppError::authentication())) }
        })
        .await;

    let err = result.unwrap_err();
    let classified = err.classified().unwrap();
    assert_eq!(classified.kind(), ErrorKind::Authentication);
    assert_eq!(classified.message(), "Unauthorized");
    assert_eq!(
        classified.user_message(AppMode::Production),
        models::classified_error::GENERIC_USER_MESSAGE
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn given_auth_limit_from_config_when_exceeded_then_later_calls_rejected() {
    let dir = TempDir::new().unwrap();
    let kernel = kernel_from_file(
        &dir,
        "[rate_limits.auth]\nmax_attempts = 1\nwindow_ms = 60000\n",
    );
    let fields = registration("a@b.co", "abcdefg1");
    let ok = || async { Ok::<_, Failure>(()) };

    let first = kernel
        .auth_guard()
        .execute("a@b.co", &fields, &registration_form(), ok)
        .await;
    let second = kernel
        .auth_guard()
        .execute("a@b.co", &fields, &registration_form(), ok)
        .await;

    assert!(first.is_ok());
    assert!(matches!(second, Err(GuardError::RateLimited { .. })));
}
