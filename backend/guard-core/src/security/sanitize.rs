use crate::logger::Logger;

use serde_json::json;
use url::Url;

const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

/// Escape the HTML-significant characters `& < > " ' /`.
pub fn sanitize_input(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());

    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            other => escaped.push(other),
        }
    }

    escaped
}

/// Parse `input` and keep it only if the scheme is http or https.
///
/// Rejections (bad scheme or unparseable text) are logged as warnings.
pub fn sanitize_url(input: &str, logger: &Logger) -> Option<Url> {
    match Url::parse(input.trim()) {
        Ok(url) if ALLOWED_SCHEMES.contains(&url.scheme()) => Some(url),
        Ok(url) => {
            logger.warn(
                "Rejected URL with disallowed scheme",
                Some(json!({ "scheme": url.scheme() })),
            );
            None
        }
        Err(e) => {
            logger.warn(
                "Rejected unparseable URL",
                Some(json!({ "reason": e.to_string() })),
            );
            None
        }
    }
}
