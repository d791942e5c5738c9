//! Field-level validators.
//!
//! Each check is independent and reported in a fixed order; the first
//! failing check wins.

use super::Role;
use crate::time::{Clock, SystemClock};

use models::ValidationResult;

use std::sync::OnceLock;

use chrono::{DateTime, Months, NaiveDate};
use regex::Regex;
use url::Url;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.\S+$";
const DATE_FORMAT: &str = "%Y-%m-%d";

const PASSWORD_MIN_LENGTH: usize = 8;
const FULL_NAME_MIN_LENGTH: usize = 2;
const PHONE_DIGITS: usize = 10;
const MINIMUM_AGE_YEARS: u32 = 13;

pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";

pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters long";
pub const PASSWORD_MISSING_DIGIT: &str = "Password must contain at least one number";
pub const PASSWORD_MISSING_LETTER: &str = "Password must contain at least one letter";

pub const FULL_NAME_REQUIRED: &str = "Full name is required";
pub const FULL_NAME_TOO_SHORT: &str = "Full name must be at least 2 characters";
pub const FULL_NAME_HAS_DIGITS: &str = "Full name cannot contain numbers";
pub const FULL_NAME_NEEDS_LAST_NAME: &str = "Please enter your first and last name";
pub const FULL_NAME_INVALID_CHARS: &str =
    "Full name can only contain letters, spaces, hyphens, and apostrophes";

pub const PHONE_INVALID: &str = "Please enter a valid 10-digit phone number";

pub const ROLE_REQUIRED: &str = "Role is required";
pub const ROLE_INVALID: &str = "Please select a valid role";

pub const CONFIRMATION_REQUIRED: &str = "Please confirm your password";
pub const CONFIRMATION_MISMATCH: &str = "Passwords do not match";

pub const DATE_OF_BIRTH_REQUIRED: &str = "Date of birth is required";
pub const DATE_OF_BIRTH_INVALID: &str = "Please enter a valid date";
pub const DATE_OF_BIRTH_IN_FUTURE: &str = "Date of birth must be in the past";
pub const DATE_OF_BIRTH_TOO_YOUNG: &str = "You must be at least 13 years old";

pub const URL_REQUIRED: &str = "URL is required";
pub const URL_INVALID: &str = "Please enter a valid URL";

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("valid regex pattern"))
}

/// Blank but non-empty input is a format failure, not a missing one.
pub fn validate_email(value: &str) -> ValidationResult {
    if value.is_empty() {
        return ValidationResult::invalid(EMAIL_REQUIRED);
    }

    if !email_regex().is_match(value) {
        return ValidationResult::invalid(EMAIL_INVALID);
    }

    ValidationResult::valid()
}

/// Empty, then length, then digit, then letter.
pub fn validate_password(value: &str) -> ValidationResult {
    if value.is_empty() {
        return ValidationResult::invalid(PASSWORD_REQUIRED);
    }

    if value.chars().count() < PASSWORD_MIN_LENGTH {
        return ValidationResult::invalid(PASSWORD_TOO_SHORT);
    }

    if !value.chars().any(|c| c.is_ascii_digit()) {
        return ValidationResult::invalid(PASSWORD_MISSING_DIGIT);
    }

    if !value.chars().any(|c| c.is_ascii_alphabetic()) {
        return ValidationResult::invalid(PASSWORD_MISSING_LETTER);
    }

    ValidationResult::valid()
}

pub fn validate_full_name(value: &str) -> ValidationResult {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return ValidationResult::invalid(FULL_NAME_REQUIRED);
    }

    if trimmed.chars().count() < FULL_NAME_MIN_LENGTH {
        return ValidationResult::invalid(FULL_NAME_TOO_SHORT);
    }

    if trimmed.chars().any(|c| c.is_ascii_digit()) {
        return ValidationResult::invalid(FULL_NAME_HAS_DIGITS);
    }

    // Trimmed, so a space left is between two name parts.
    if !trimmed.contains(' ') {
        return ValidationResult::invalid(FULL_NAME_NEEDS_LAST_NAME);
    }

    let allowed = |c: char| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'';
    if !trimmed.chars().all(allowed) {
        return ValidationResult::invalid(FULL_NAME_INVALID_CHARS);
    }

    ValidationResult::valid()
}

/// Optional field: blank is valid, otherwise exactly ten digits once
/// formatting characters are stripped.
pub fn validate_phone(value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return ValidationResult::valid();
    }

    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if digits != PHONE_DIGITS {
        return ValidationResult::invalid(PHONE_INVALID);
    }

    ValidationResult::valid()
}

pub fn validate_role(value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return ValidationResult::invalid(ROLE_REQUIRED);
    }

    match value.parse::<Role>() {
        Ok(_) => ValidationResult::valid(),
        Err(_) => ValidationResult::invalid(ROLE_INVALID),
    }
}

/// Byte-for-byte equality with the original password; no trimming.
pub fn validate_password_confirmation(password: &str, confirmation: &str) -> ValidationResult {
    if confirmation.is_empty() {
        return ValidationResult::invalid(CONFIRMATION_REQUIRED);
    }

    if password != confirmation {
        return ValidationResult::invalid(CONFIRMATION_MISMATCH);
    }

    ValidationResult::valid()
}

/// Date of birth checked against the local calendar date.
pub fn validate_date_of_birth(value: &str) -> ValidationResult {
    validate_date_of_birth_at(value, SystemClock.today())
}

/// Date of birth checked against an explicit `today`.
///
/// The birth date must not be after `today` and must fall on or before
/// `today` minus 13 calendar years (Feb 29 clamps to Feb 28).
pub fn validate_date_of_birth_at(value: &str, today: NaiveDate) -> ValidationResult {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return ValidationResult::invalid(DATE_OF_BIRTH_REQUIRED);
    }

    let Some(birth_date) = parse_date(trimmed) else {
        return ValidationResult::invalid(DATE_OF_BIRTH_INVALID);
    };

    if birth_date > today {
        return ValidationResult::invalid(DATE_OF_BIRTH_IN_FUTURE);
    }

    let Some(boundary) = today.checked_sub_months(Months::new(MINIMUM_AGE_YEARS * 12)) else {
        return ValidationResult::invalid(DATE_OF_BIRTH_INVALID);
    };

    if birth_date > boundary {
        return ValidationResult::invalid(DATE_OF_BIRTH_TOO_YOUNG);
    }

    ValidationResult::valid()
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}

/// Presence check with a caller-supplied label ("Company is required").
pub fn validate_required(value: &str, label: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return ValidationResult::invalid(format!("{label} is required"));
    }

    ValidationResult::valid()
}

pub fn validate_url(value: &str) -> ValidationResult {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return ValidationResult::invalid(URL_REQUIRED);
    }

    if Url::parse(trimmed).is_err() {
        return ValidationResult::invalid(URL_INVALID);
    }

    ValidationResult::valid()
}
