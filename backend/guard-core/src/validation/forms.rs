//! Ready-made form schemas for the authentication screens.

use super::FormValidator;
use super::fields::{
    validate_date_of_birth_at, validate_email, validate_full_name, validate_password,
    validate_password_confirmation, validate_phone, validate_required, validate_role,
};
use crate::time::{Clock, SystemClock};

use std::sync::Arc;

pub const FIELD_EMAIL: &str = "email";
pub const FIELD_PASSWORD: &str = "password";
pub const FIELD_CONFIRM_PASSWORD: &str = "confirmPassword";
pub const FIELD_FULL_NAME: &str = "fullName";
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_ROLE: &str = "role";
pub const FIELD_DATE_OF_BIRTH: &str = "dateOfBirth";

/// Login only checks presence of the password; strength rules apply at
/// registration, and existing accounts may predate them.
pub fn login_form() -> FormValidator {
    FormValidator::new()
        .field(FIELD_EMAIL, validate_email)
        .field(FIELD_PASSWORD, |value| validate_required(value, "Password"))
}

pub fn registration_form() -> FormValidator {
    registration_form_with_clock(Arc::new(SystemClock))
}

/// Registration schema whose age check reads today's date from `clock`.
pub fn registration_form_with_clock(clock: Arc<dyn Clock>) -> FormValidator {
    FormValidator::new()
        .field(FIELD_FULL_NAME, validate_full_name)
        .field(FIELD_EMAIL, validate_email)
        .field(FIELD_PASSWORD, validate_password)
        .field_with_context(FIELD_CONFIRM_PASSWORD, |value, fields| {
            let password = fields
                .get(FIELD_PASSWORD)
                .map(String::as_str)
                .unwrap_or_default();
            validate_password_confirmation(password, value)
        })
        .field(FIELD_PHONE, validate_phone)
        .field(FIELD_ROLE, validate_role)
        .field(FIELD_DATE_OF_BIRTH, move |value| {
            validate_date_of_birth_at(value, clock.today())
        })
}
