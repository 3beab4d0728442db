//! Error taxonomy for the hypermedia client
//!
//! Every fallible operation in the workspace returns [`HalError`]. Errors are
//! `Clone` because one token fetch or root fetch may fail for many waiters at
//! once, and each of them receives its own copy of the same failure.

use adpost_common::FlightAborted;
use thiserror::Error;

/// Broad classes of [`HalError`], used by callers to decide what to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Token acquisition failed or the server kept rejecting the token
    Authentication,
    /// A link relation could not be turned into a concrete URI
    Navigation,
    /// The server reported a conflict with existing state (409)
    Conflict,
    /// The server rejected the request (4xx) or the payload did not fit
    Client,
    /// Network failure or server-side error (5xx); may succeed later
    Transport,
    /// The client was disposed
    Lifecycle,
    /// Invalid configuration
    Config,
}

/// Errors produced by the Ad Posting API client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    #[error("authentication failed: {0}")]
    AuthenticationFailure(String),

    #[error("unknown link relation '{0}'")]
    UnknownRelation(String),

    #[error("missing template parameter '{parameter}' for relation '{relation}'")]
    TemplateParameterMissing { relation: String, parameter: String },

    #[error("link relation '{0}' is templated and must be expanded before use")]
    UnexpandedTemplate(String),

    #[error("unauthorized after token refresh: {0}")]
    Unauthorized(String),

    #[error("conflict (key: {key:?}): {body}")]
    Conflict { key: Option<String>, body: String },

    #[error("request rejected with status {status}: {body}")]
    RequestRejected { status: u16, body: String },

    #[error("transport failure: {message}")]
    TransportFailure { status: Option<u16>, message: String },

    #[error("client has been disposed")]
    ClientDisposed,

    #[error("invalid URI: {0}")]
    InvalidUri(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl HalError {
    /// Transport failure that never reached an HTTP status.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportFailure { status: None, message: message.into() }
    }

    /// Server-side failure carrying the response status.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::TransportFailure { status: Some(status), message: message.into() }
    }

    /// Get the error category for this error
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::AuthenticationFailure(_) | Self::Unauthorized(_) => ErrorCategory::Authentication,
            Self::UnknownRelation(_)
            | Self::TemplateParameterMissing { .. }
            | Self::UnexpandedTemplate(_)
            | Self::InvalidUri(_) => ErrorCategory::Navigation,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::RequestRejected { .. } | Self::Serialization(_) | Self::UnexpectedResponse(_) => {
                ErrorCategory::Client
            }
            Self::TransportFailure { .. } => ErrorCategory::Transport,
            Self::ClientDisposed => ErrorCategory::Lifecycle,
            Self::Config(_) => ErrorCategory::Config,
        }
    }

    /// Whether repeating the same call later could succeed.
    ///
    /// The client itself never retries these; the flag is for callers.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Transport)
    }

    /// HTTP status attached to the error, if the server produced one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestRejected { status, .. } => Some(*status),
            Self::TransportFailure { status, .. } => *status,
            Self::Conflict { .. } => Some(409),
            Self::Unauthorized(_) => Some(401),
            _ => None,
        }
    }
}

impl From<FlightAborted> for HalError {
    fn from(err: FlightAborted) -> Self {
        Self::transport(err.to_string())
    }
}

impl From<serde_json::Error> for HalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, HalError>;
