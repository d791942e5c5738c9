//! Declarative field and form validation.
//!
//! Every validator is a pure function returning a [`ValidationResult`];
//! nothing here logs or throws. Forms are described with a
//! [`FormValidator`], which runs *every* rule and aggregates the failures
//! into a [`FormResult`].

pub mod fields;
pub mod forms;
pub mod role;

pub use fields::{
    validate_date_of_birth, validate_date_of_birth_at, validate_email, validate_full_name,
    validate_password, validate_password_confirmation, validate_phone, validate_required,
    validate_role, validate_url,
};
pub use forms::{login_form, registration_form, registration_form_with_clock};
pub use role::Role;

use models::{FormResult, ValidationResult};

use std::collections::BTreeMap;
use std::fmt;

/// Submitted form values keyed by field name.
pub type FormFields = BTreeMap<String, String>;

type Rule = Box<dyn Fn(&str, &FormFields) -> ValidationResult + Send + Sync>;

/// An ordered set of `field -> rule` pairs.
///
/// A field has at most one rule; registering the same field again
/// replaces the earlier rule.
#[derive(Default)]
pub struct FormValidator {
    rules: Vec<(String, Rule)>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule that only looks at the field's own value.
    pub fn field<F>(self, name: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&str) -> ValidationResult + Send + Sync + 'static,
    {
        self.field_with_context(name, move |value, _| rule(value))
    }

    /// Register a rule that can read the other submitted fields
    /// (e.g. password confirmation).
    pub fn field_with_context<F>(mut self, name: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&str, &FormFields) -> ValidationResult + Send + Sync + 'static,
    {
        let name = name.into();
        let rule: Rule = Box::new(rule);

        match self.rules.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = rule,
            None => self.rules.push((name, rule)),
        }
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(name, _)| name.as_str())
    }

    /// Run every rule. Missing fields are validated as the empty string.
    pub fn validate(&self, fields: &FormFields) -> FormResult {
        let mut errors = BTreeMap::new();

        for (name, rule) in &self.rules {
            let value = fields.get(name).map(String::as_str).unwrap_or_default();
            let result = rule(value, fields);

            if !result.is_valid {
                let message = result
                    .error
                    .unwrap_or_else(|| format!("{name} is invalid"));
                errors.insert(name.clone(), message);
            }
        }

        FormResult {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

impl fmt::Debug for FormValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormValidator")
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Validate `fields` against `validator`; see [`FormValidator::validate`].
pub fn validate_form(fields: &FormFields, validator: &FormValidator) -> FormResult {
    validator.validate(fields)
}
