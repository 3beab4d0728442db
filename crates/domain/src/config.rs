//! Client configuration structures
//!
//! Loading (environment, files) lives in `adpost-infra::config`; this module
//! only defines the shape and its validation.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOKEN_EXPIRY_MARGIN_SECS};
use crate::errors::{HalError, Result};

/// What the root bootstrap does after its one fetch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapFailurePolicy {
    /// Every later call observes the same failure.
    #[default]
    Permanent,
    /// The next call starts a fresh root fetch.
    Retry,
}

/// Connection and credential settings for the Ad Posting API client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// URI of the API root resource
    pub base_uri: String,
    /// OAuth2 token endpoint
    pub token_endpoint: String,
    pub client_id: String,
    #[serde(default, skip_serializing)]
    pub client_secret: String,
    /// Optional OAuth2 scope sent with the token request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Seconds subtracted from a token's expiry before it is treated as expired
    #[serde(default = "default_token_expiry_margin_secs")]
    pub token_expiry_margin_secs: u64,
    #[serde(default)]
    pub bootstrap_failure_policy: BootstrapFailurePolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_token_expiry_margin_secs() -> u64 {
    DEFAULT_TOKEN_EXPIRY_MARGIN_SECS
}

impl ClientConfig {
    /// Config with default timeouts and policies.
    pub fn new(
        base_uri: impl Into<String>,
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_uri: base_uri.into(),
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_expiry_margin_secs: DEFAULT_TOKEN_EXPIRY_MARGIN_SECS,
            bootstrap_failure_policy: BootstrapFailurePolicy::default(),
            user_agent: None,
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    #[must_use]
    pub const fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    #[must_use]
    pub const fn with_token_expiry_margin_secs(mut self, secs: u64) -> Self {
        self.token_expiry_margin_secs = secs;
        self
    }

    #[must_use]
    pub const fn with_bootstrap_failure_policy(mut self, policy: BootstrapFailurePolicy) -> Self {
        self.bootstrap_failure_policy = policy;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn token_expiry_margin(&self) -> Duration {
        Duration::from_secs(self.token_expiry_margin_secs)
    }

    /// Check required fields.
    ///
    /// URI syntax is checked where the URIs are parsed (infra), this only
    /// rejects values that can never work.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("base_uri", &self.base_uri),
            ("token_endpoint", &self.token_endpoint),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(HalError::Config(format!("{field} must not be empty")));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(HalError::Config("request_timeout_secs must be greater than zero".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_uri", &self.base_uri)
            .field("token_endpoint", &self.token_endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("token_expiry_margin_secs", &self.token_expiry_margin_secs)
            .field("bootstrap_failure_policy", &self.bootstrap_failure_policy)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
