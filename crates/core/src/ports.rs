//! Port interfaces for token acquisition
//!
//! These traits define the boundary between the HAL client and whatever
//! obtains OAuth2 credentials. `adpost-infra` provides the HTTP-backed
//! implementations; tests plug in their own.

use adpost_domain::{BearerToken, Result, TokenResponse};
use async_trait::async_trait;

/// Raw token acquisition: one call, one request to the authorization server.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Request a new access token.
    ///
    /// Implementations report every failure as
    /// `HalError::AuthenticationFailure` and never retry.
    async fn request_token(&self) -> Result<TokenResponse>;
}

/// Supplier of currently valid bearer tokens.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// A token that is not expired at the time of the call.
    async fn token(&self) -> Result<BearerToken>;

    /// Report that the server rejected `stale`.
    ///
    /// Only drops the cached token if it is still `stale`; a token refreshed
    /// by a concurrent caller is kept.
    fn invalidate(&self, stale: &BearerToken);
}
