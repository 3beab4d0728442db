//! OAuth2 bearer tokens

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::constants::DEFAULT_TOKEN_TYPE;

/// Body returned by the token endpoint for a client-credentials grant.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime in seconds, counted from the moment the response was issued
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    DEFAULT_TOKEN_TYPE.to_string()
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

/// An issued access token. Never mutated; a refresh produces a new value.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    value: String,
    token_type: String,
    expires_at: DateTime<Utc>,
    issued_at: Option<DateTime<Utc>>,
    scope: Option<String>,
}

impl BearerToken {
    pub fn new(
        value: impl Into<String>,
        token_type: impl Into<String>,
        expires_at: DateTime<Utc>,
        scope: Option<String>,
    ) -> Self {
        Self {
            value: value.into(),
            token_type: token_type.into(),
            expires_at,
            issued_at: None,
            scope,
        }
    }

    /// Build a token from an endpoint response received at `issued_at`.
    ///
    /// Negative lifetimes are clamped to zero, producing an already-expired
    /// token rather than an error.
    #[must_use]
    pub fn from_response(response: &TokenResponse, issued_at: DateTime<Utc>) -> Self {
        let lifetime = chrono::Duration::seconds(response.expires_in.max(0));
        let expires_at = issued_at.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            value: response.access_token.clone(),
            token_type: response.token_type.clone(),
            expires_at,
            issued_at: Some(issued_at),
            scope: response.scope.clone(),
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Issue time, known for tokens built from an endpoint response.
    #[must_use]
    pub const fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    /// `now >= expires_at - margin`
    ///
    /// For tokens with a known issue time the margin is capped at half the
    /// issued lifetime, so a short-lived token is still usable for a while.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        let Ok(mut margin) = chrono::Duration::from_std(margin) else {
            return true;
        };
        if let Some(issued_at) = self.issued_at {
            margin = margin.min((self.expires_at - issued_at) / 2);
        }
        self.expires_at.checked_sub_signed(margin).map_or(true, |threshold| now >= threshold)
    }

    /// `Authorization` header value.
    #[must_use]
    pub fn authorization_value(&self) -> String {
        format!("{DEFAULT_TOKEN_TYPE} {}", self.value)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("value", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("issued_at", &self.issued_at)
            .field("scope", &self.scope)
            .finish()
    }
}
