// Unit tests for the sliding-window rate limiter

use crate::logger::{Logger, LoggerConfig};
use crate::rate_limiter::{RateLimitConfig, RateLimiter, RateLimiters};
use crate::time::ManualClock;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn limiter(max_attempts: u32, window: Duration) -> (RateLimiter, ManualClock, Arc<Logger>) {
    let clock = ManualClock::default();
    let logger = Arc::new(Logger::new(LoggerConfig::development()));
    let limiter = RateLimiter::with_clock(
        "test",
        RateLimitConfig::new(max_attempts, window),
        Arc::clone(&logger),
        Arc::new(clock.clone()),
    );
    (limiter, clock, logger)
}

/// **VALUE**: Verifies exactly `max_attempts` calls are admitted per window.
///
/// **WHY THIS MATTERS**: This is the whole contract of the limiter. One extra
/// admitted login attempt per window is one extra password guess.
///
/// **BUG THIS CATCHES**: `>` instead of `>=` when comparing against the limit.
#[test]
fn given_limit_of_three_when_four_attempts_then_fourth_rejected() {
    // GIVEN: 3 attempts per minute
    let (limiter, _clock, _logger) = limiter(3, Duration::from_secs(60));

    // WHEN / THEN
    assert!(limiter.is_allowed("user@example.com"));
    assert!(limiter.is_allowed("user@example.com"));
    assert!(limiter.is_allowed("user@example.com"));
    assert!(!limiter.is_allowed("user@example.com"));
}

#[test]
fn given_exhausted_key_when_other_key_checked_then_keys_are_independent() {
    let (limiter, _clock, _logger) = limiter(1, Duration::from_secs(60));

    assert!(limiter.is_allowed("a"));
    assert!(!limiter.is_allowed("a"));
    assert!(limiter.is_allowed("b"));
    assert_eq!(limiter.tracked_keys(), 2);
}

/// **VALUE**: Verifies an attempt expires exactly when `now - t >= window`.
///
/// **WHY THIS MATTERS**: Windows slide per attempt, not per fixed bucket. A
/// user blocked at 10:00 regains one slot when the oldest attempt ages out.
///
/// **BUG THIS CATCHES**: Pruning with `>` (keeps the boundary attempt one tick
/// too long) or resetting the whole window at once.
#[test]
fn given_full_window_when_oldest_attempt_ages_out_then_one_slot_frees() {
    // GIVEN: 2 attempts per 10s, at t=0 and t=4
    let (limiter, clock, _logger) = limiter(2, Duration::from_secs(10));
    assert!(limiter.is_allowed("k"));
    clock.advance(Duration::from_secs(4));
    assert!(limiter.is_allowed("k"));

    // WHEN: Just before the first attempt expires
    clock.advance(Duration::from_millis(5_999));
    // THEN: Still blocked
    assert!(!limiter.is_allowed("k"));

    // WHEN: Exactly at the boundary of the first attempt (t=10)
    clock.advance(Duration::from_millis(1));
    // THEN: First attempt expired, one slot available
    assert!(limiter.is_allowed("k"));
    assert!(!limiter.is_allowed("k"));
}

#[test]
fn given_rejected_attempts_when_window_passes_then_rejections_were_not_recorded() {
    let (limiter, clock, _logger) = limiter(1, Duration::from_secs(10));

    assert!(limiter.is_allowed("k"));
    clock.advance(Duration::from_secs(5));
    assert!(!limiter.is_allowed("k"));

    // Only the admitted attempt at t=0 counts; it expires at t=10
    clock.advance(Duration::from_secs(5));
    assert!(limiter.is_allowed("k"));
}

#[test]
fn given_attempts_when_remaining_queried_then_reports_free_slots_without_recording() {
    let (limiter, clock, _logger) = limiter(3, Duration::from_secs(10));

    assert_eq!(limiter.remaining("k"), 3);
    limiter.is_allowed("k");
    limiter.is_allowed("k");
    assert_eq!(limiter.remaining("k"), 1);
    assert_eq!(limiter.remaining("k"), 1);

    clock.advance(Duration::from_secs(10));
    assert_eq!(limiter.remaining("k"), 3);
}

#[test]
fn given_blocked_key_when_reset_then_admitted_again() {
    let (limiter, _clock, _logger) = limiter(1, Duration::from_secs(60));
    assert!(limiter.is_allowed("k"));
    assert!(!limiter.is_allowed("k"));

    limiter.reset("k");

    assert!(limiter.is_allowed("k"));
}

#[test]
fn given_many_keys_when_clear_all_then_nothing_tracked() {
    let (limiter, _clock, _logger) = limiter(1, Duration::from_secs(60));
    for key in ["a", "b", "c"] {
        limiter.is_allowed(key);
    }

    limiter.clear_all();

    assert_eq!(limiter.tracked_keys(), 0);
    assert!(limiter.is_allowed("a"));
}

#[test]
fn given_rejection_when_logged_then_not_recorded_as_error() {
    // GIVEN: A key that has used its only slot
    let (limiter, _clock, logger) = limiter(1, Duration::from_secs(60));
    limiter.is_allowed("k");

    // WHEN
    let allowed = limiter.is_allowed("k");

    // THEN: Warnings never land in the error buffer
    assert!(!allowed);
    assert!(logger.stored_errors().is_empty());
}

/// **VALUE**: Verifies concurrent checks never admit more than the limit.
///
/// **BUG THIS CATCHES**: Splitting prune/check/push across separate lock
/// acquisitions.
#[test]
fn given_concurrent_callers_when_checking_same_key_then_limit_holds() {
    let logger = Arc::new(Logger::new(LoggerConfig::production(false)));
    let limiter = Arc::new(RateLimiter::new(
        "concurrent",
        RateLimitConfig::new(10, Duration::from_secs(60)),
        logger,
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            thread::spawn(move || (0..10).filter(|_| limiter.is_allowed("shared")).count())
        })
        .collect();

    let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(admitted, 10);
}

#[test]
fn given_default_limiters_when_constructed_then_use_auth_and_api_presets() {
    let logger = Arc::new(Logger::default());

    let auth = RateLimiter::auth(Arc::clone(&logger));
    let api = RateLimiter::api(Arc::clone(&logger));
    let pair = RateLimiters::new(RateLimitConfig::AUTH, RateLimitConfig::API, logger);

    assert_eq!(auth.config().max_attempts, 5);
    assert_eq!(auth.config().window(), Duration::from_secs(15 * 60));
    assert_eq!(api.config().max_attempts, 60);
    assert_eq!(api.config().window(), Duration::from_secs(60));
    assert_eq!(pair.auth.name(), "auth");
    assert_eq!(pair.api.name(), "api");
}

#[test]
fn given_zero_attempts_or_window_when_validating_then_rejected() {
    assert!(RateLimitConfig::new(0, Duration::from_secs(1)).validate("x").is_err());
    assert!(RateLimitConfig::new(1, Duration::ZERO).validate("x").is_err());
    assert!(RateLimitConfig::AUTH.validate("auth").is_ok());
}
