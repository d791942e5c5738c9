//! Authentication state persisted through the credential store.

use super::CredentialStore;

use common::RedactedSecret;

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

/// Tokens returned by a successful login or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub access_token: RedactedSecret,
    pub refresh_token: Option<RedactedSecret>,
}

impl AuthTokens {
    pub fn new(access_token: impl Into<RedactedSecret>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<RedactedSecret>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }
}

impl CredentialStore {
    /// Persist tokens after login or refresh. A refresh that returns no
    /// new refresh token keeps the stored one.
    pub fn store_auth_tokens(&self, tokens: &AuthTokens) {
        self.set(AUTH_TOKEN_KEY, tokens.access_token.expose());
        if let Some(refresh_token) = &tokens.refresh_token {
            self.set(REFRESH_TOKEN_KEY, refresh_token.expose());
        }
    }

    /// Serialized user profile kept alongside the tokens.
    pub fn store_user(&self, user: &serde_json::Value) {
        self.set(USER_KEY, &user.to_string());
    }

    pub fn access_token(&self) -> Option<RedactedSecret> {
        self.get(AUTH_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<RedactedSecret> {
        self.get(REFRESH_TOKEN_KEY)
    }

    pub fn user(&self) -> Option<serde_json::Value> {
        self.get(USER_KEY)
            .and_then(|raw| serde_json::from_str(raw.expose()).ok())
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Logout: drop every authentication key from both tiers.
    pub fn clear_auth(&self) {
        for key in [AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            self.remove(key);
        }
    }
}
