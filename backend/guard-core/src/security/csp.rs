use const_format::concatcp;
use uuid::Uuid;

const DEFAULT_SRC: &str = "default-src 'self'";
const STYLE_SRC: &str = "style-src 'self' 'unsafe-inline'";
const IMG_SRC: &str = "img-src 'self' data: https:";
const FONT_SRC: &str = "font-src 'self' data:";
const LOCKDOWN: &str = concatcp!(
    "object-src 'none'; ",
    "base-uri 'self'; ",
    "form-action 'self'; ",
    "frame-ancestors 'none'"
);

/// Random value for `script-src 'nonce-…'`.
pub fn generate_nonce() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Content security policy for the client.
///
/// `api_base` is the only origin besides `'self'` the client may connect to.
pub fn content_security_policy(api_base: &str, nonce: Option<&str>) -> String {
    let script_src = match nonce {
        Some(nonce) => format!("script-src 'self' 'nonce-{nonce}'"),
        None => String::from("script-src 'self'"),
    };

    let api_base = api_base.trim().trim_end_matches('/');
    let connect_src = if api_base.is_empty() {
        String::from("connect-src 'self'")
    } else {
        format!("connect-src 'self' {api_base}")
    };

    [
        DEFAULT_SRC,
        script_src.as_str(),
        STYLE_SRC,
        IMG_SRC,
        FONT_SRC,
        connect_src.as_str(),
        LOCKDOWN,
    ]
    .join("; ")
}
