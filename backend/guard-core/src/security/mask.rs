use serde_json::{Map, Value};

pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Field names (lowercase, without `_` / `-`) whose values are never logged.
const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "confirmpassword",
    "currentpassword",
    "newpassword",
    "token",
    "accesstoken",
    "refreshtoken",
    "authtoken",
    "idtoken",
    "secret",
    "clientsecret",
    "apikey",
    "authorization",
    "cookie",
    "creditcard",
    "cardnumber",
    "cvv",
    "ssn",
];

fn is_sensitive(field: &str) -> bool {
    let normalized: String = field
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect();
    SENSITIVE_FIELDS.contains(&normalized.as_str())
}

/// Copy of `value` with every sensitive field replaced by
/// [`REDACTION_MARKER`], at any depth.
pub fn mask_sensitive(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let masked: Map<String, Value> = map
                .iter()
                .map(|(key, inner)| {
                    let replacement = if is_sensitive(key) {
                        Value::String(REDACTION_MARKER.to_string())
                    } else {
                        mask_sensitive(inner)
                    };
                    (key.clone(), replacement)
                })
                .collect();
            Value::Object(masked)
        }
        Value::Array(items) => Value::Array(items.iter().map(mask_sensitive).collect()),
        other => other.clone(),
    }
}
