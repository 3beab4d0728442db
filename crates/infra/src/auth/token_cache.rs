//! Bearer token cache with coalesced refresh
//!
//! The cache holds at most one [`BearerToken`]. Callers that find it empty or
//! expired share a single request to the token endpoint; a refresh replaces
//! the token wholesale. A failed refresh is reported to every waiter and
//! leaves the previously cached token in place.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use adpost_common::{Clock, SingleFlight, SystemClock};
use adpost_core::{TokenEndpoint, TokenSource};
use adpost_domain::constants::DEFAULT_TOKEN_EXPIRY_MARGIN_SECS;
use adpost_domain::{BearerToken, HalError, Result};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Caches one OAuth2 bearer token for a [`TokenEndpoint`].
///
/// Implements [`TokenSource`] for the HAL client. A token counts as expired
/// `margin` before its `expires_at`, capped at half of its issued lifetime.
pub struct TokenCache {
    endpoint: Arc<dyn TokenEndpoint>,
    flight: SingleFlight<BearerToken, HalError>,
    clock: Arc<dyn Clock>,
    margin: Duration,
    shutdown: CancellationToken,
}

impl TokenCache {
    /// Empty cache using the system clock and the default 30 second margin.
    pub fn new(endpoint: Arc<dyn TokenEndpoint>) -> Self {
        Self {
            endpoint,
            flight: SingleFlight::new(),
            clock: Arc::new(SystemClock),
            margin: Duration::from_secs(DEFAULT_TOKEN_EXPIRY_MARGIN_SECS),
            shutdown: CancellationToken::new(),
        }
    }

    /// Replace the time source used for expiry decisions.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Time before `expires_at` from which a token counts as expired.
    #[must_use]
    pub const fn with_expiry_margin(mut self, margin: Duration) -> Self {
        self.margin = margin;
        self
    }

    /// Tie the cache's lifetime to an externally owned cancellation token.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// A token that is not expired at the time of the call.
    ///
    /// Fetches or refreshes as needed; concurrent callers share one request.
    ///
    /// # Errors
    ///
    /// `AuthenticationFailure` when the endpoint denies or cannot be reached,
    /// `ClientDisposed` once [`TokenCache::dispose`] has been called.
    pub async fn get_token(&self) -> Result<BearerToken> {
        if self.shutdown.is_cancelled() {
            return Err(HalError::ClientDisposed);
        }

        let now = self.clock.now();
        let margin = self.margin;
        let endpoint = Arc::clone(&self.endpoint);
        let clock = Arc::clone(&self.clock);

        let lookup = self.flight.get_or_fetch(
            |token| !token.is_expired(now, margin),
            move || async move {
                let issued_at = clock.now();
                let response = endpoint.request_token().await?;
                let token = BearerToken::from_response(&response, issued_at);
                info!(expires_at = %token.expires_at(), "bearer token refreshed");
                Ok(token)
            },
        );

        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => Err(HalError::ClientDisposed),
            result = lookup => result,
        }
    }

    /// Drop the cached token if it is still `stale`.
    pub fn invalidate(&self, stale: &BearerToken) {
        if self.flight.invalidate_if(|current| current == stale) {
            debug!("cached bearer token invalidated");
        }
    }

    /// Cached token that is still usable now, without fetching.
    ///
    /// A token kept after a failed refresh is not returned once it has expired.
    pub fn cached(&self) -> Option<BearerToken> {
        let now = self.clock.now();
        self.flight.peek().filter(|token| !token.is_expired(now, self.margin))
    }

    /// Release the cache. Pending and later calls fail with `ClientDisposed`.
    pub fn dispose(&self) {
        self.shutdown.cancel();
        self.flight.reset();
        debug!("token cache disposed");
    }

    /// Whether [`TokenCache::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("state", &self.flight.state())
            .field("margin", &self.margin)
            .field("disposed", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenSource for TokenCache {
    async fn token(&self) -> Result<BearerToken> {
        self.get_token().await
    }

    fn invalidate(&self, stale: &BearerToken) {
        Self::invalidate(self, stale);
    }
}
