//! Run-once loading of the API root
//!
//! The root resource is fetched at most once per [`RootBootstrap`]. Callers
//! arriving while the fetch is in flight wait for it; callers arriving later
//! read the cached index without touching the network.

use std::sync::Arc;

use adpost_common::{FlightState, SingleFlight};
use adpost_domain::{BootstrapFailurePolicy, HalError, Result};
use tracing::{info, instrument};
use url::Url;

use super::client::HalClient;
use super::envelope::{IndexBody, RootIndex};

/// Lifecycle of the root fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    NotStarted,
    InFlight,
    /// Terminal
    Completed,
    /// Only reachable under [`BootstrapFailurePolicy::Permanent`]
    Failed,
}

impl From<FlightState> for BootstrapState {
    fn from(state: FlightState) -> Self {
        match state {
            FlightState::Empty => Self::NotStarted,
            FlightState::InFlight => Self::InFlight,
            FlightState::Ready => Self::Completed,
            FlightState::Failed => Self::Failed,
        }
    }
}

#[derive(Debug)]
pub struct RootBootstrap {
    client: HalClient,
    base_uri: Url,
    flight: SingleFlight<Arc<RootIndex>, HalError>,
    policy: BootstrapFailurePolicy,
}

impl RootBootstrap {
    pub fn new(client: HalClient, base_uri: Url, policy: BootstrapFailurePolicy) -> Self {
        let flight = match policy {
            BootstrapFailurePolicy::Permanent => SingleFlight::remembering_failures(),
            BootstrapFailurePolicy::Retry => SingleFlight::new(),
        };
        Self { client, base_uri, flight, policy }
    }

    /// The root index, loading it on first use.
    ///
    /// # Errors
    ///
    /// Whatever the root GET failed with. Under the permanent policy every
    /// later call returns that same error.
    #[instrument(skip(self), fields(base_uri = %self.base_uri))]
    pub async fn ensure_root_loaded(&self) -> Result<Arc<RootIndex>> {
        let client = self.client.clone();
        let uri = self.base_uri.clone();

        self.flight
            .get_or_fetch(
                |_| true,
                move || async move {
                    info!(%uri, "loading API root");
                    let root = client.get::<IndexBody>(&uri).await?;
                    info!(relations = root.links().len(), "API root loaded");
                    Ok(Arc::new(root))
                },
            )
            .await
    }

    /// Loaded index, without fetching.
    pub fn root(&self) -> Option<Arc<RootIndex>> {
        self.flight.peek()
    }

    pub fn state(&self) -> BootstrapState {
        self.flight.state().into()
    }

    pub const fn policy(&self) -> BootstrapFailurePolicy {
        self.policy
    }

    pub const fn base_uri(&self) -> &Url {
        &self.base_uri
    }
}
