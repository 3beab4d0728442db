//! Advertisement operations over the HAL client

use std::sync::Arc;

use adpost_core::{LinkResolver, TemplateParams, TokenSource};
use adpost_domain::constants::{
    ADVERTISEMENTS_REL, ADVERTISEMENT_ID_PARAM, ADVERTISEMENT_REL, PROCESSING_STATUS_HEADER,
};
use adpost_domain::{
    Advertisement, AdvertisementPatch, AdvertisementResource, AdvertisementSummaryPage,
    BootstrapFailurePolicy, ClientConfig, HalError, ProcessingStatus, Result,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use url::Url;
use uuid::Uuid;

use crate::auth::{ClientCredentialsEndpoint, TokenCache};
use crate::errors::InfraError;
use crate::hal::{HalClient, ResourceEnvelope, RootBootstrap};
use crate::http::HttpClient;

/// Client for the Ad Posting API.
///
/// The API root is loaded lazily by the first operation that needs a link
/// relation and shared by every later call.
#[derive(Debug)]
pub struct AdPostingApiClient {
    hal: HalClient,
    bootstrap: Arc<RootBootstrap>,
    resolver: LinkResolver,
    shutdown: CancellationToken,
    token_cache: Option<Arc<TokenCache>>,
}

impl AdPostingApiClient {
    /// Build a client that authenticates with the client-credentials grant.
    ///
    /// # Errors
    ///
    /// `Config` when the configuration is incomplete or the HTTP client
    /// cannot be built, `InvalidUri` for malformed base or token URIs.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_uri = Url::parse(&config.base_uri).map_err(InfraError::from)?;
        let token_url = Url::parse(&config.token_endpoint).map_err(InfraError::from)?;

        let mut http = HttpClient::builder().timeout(config.request_timeout());
        if let Some(agent) = &config.user_agent {
            http = http.user_agent(agent.clone());
        }
        let http = http.build()?;

        let mut endpoint = ClientCredentialsEndpoint::new(
            http.clone(),
            token_url,
            config.client_id.clone(),
            config.client_secret.clone(),
        );
        if let Some(scope) = &config.scope {
            endpoint = endpoint.with_scope(scope.clone());
        }

        let shutdown = CancellationToken::new();
        let token_cache = TokenCache::new(Arc::new(endpoint))
            .with_expiry_margin(config.token_expiry_margin())
            .with_shutdown(shutdown.clone());

        Self::builder(base_uri)
            .http_client(http)
            .token_cache(Arc::new(token_cache))
            .bootstrap_failure_policy(config.bootstrap_failure_policy)
            .shutdown(shutdown)
            .build()
    }

    /// Assemble a client from parts, e.g. with a custom token source.
    pub fn builder(base_uri: Url) -> AdPostingApiClientBuilder {
        AdPostingApiClientBuilder {
            base_uri,
            http: None,
            token_source: None,
            token_cache: None,
            policy: BootstrapFailurePolicy::default(),
            shutdown: None,
        }
    }

    /// Submit a new advertisement through the `advertisements` relation.
    ///
    /// Returns the `Location` of the created advertisement. A 409 is reported
    /// as `Conflict` keyed with the advertisement's `creationId`.
    #[instrument(skip_all, fields(creation_id = ?advertisement.creation_id))]
    pub async fn create_advertisement(&self, advertisement: &Advertisement) -> Result<Url> {
        let uri = self.relation_uri(ADVERTISEMENTS_REL, None).await?;
        self.create_advertisement_at(&uri, advertisement).await
    }

    /// Submit a new advertisement to an explicit collection URI.
    pub async fn create_advertisement_at(
        &self,
        uri: &Url,
        advertisement: &Advertisement,
    ) -> Result<Url> {
        let location = self
            .hal
            .post_for_location(uri, advertisement, advertisement.creation_id.as_deref())
            .await?;
        info!(%location, "advertisement created");
        Ok(location)
    }

    pub async fn get_advertisement(
        &self,
        uri: &Url,
    ) -> Result<ResourceEnvelope<AdvertisementResource>> {
        self.hal.get(uri).await
    }

    /// Fetch an advertisement through the templated `advertisement` relation.
    #[instrument(skip(self))]
    pub async fn get_advertisement_by_id(
        &self,
        id: Uuid,
    ) -> Result<ResourceEnvelope<AdvertisementResource>> {
        let params = TemplateParams::new().with(ADVERTISEMENT_ID_PARAM, id);
        let uri = self.relation_uri(ADVERTISEMENT_REL, Some(&params)).await?;
        self.get_advertisement(&uri).await
    }

    /// Processing status from the `Processing-Status` header of a HEAD request.
    #[instrument(skip(self), fields(uri = %uri))]
    pub async fn get_advertisement_status(&self, uri: &Url) -> Result<ProcessingStatus> {
        let headers = self.hal.head(uri).await?;
        let value = headers.get(PROCESSING_STATUS_HEADER).ok_or_else(|| {
            HalError::UnexpectedResponse(format!(
                "response did not include a {PROCESSING_STATUS_HEADER} header"
            ))
        })?;
        let value = value.to_str().map_err(|err| {
            HalError::UnexpectedResponse(format!("unreadable {PROCESSING_STATUS_HEADER}: {err}"))
        })?;

        let status = value.parse::<ProcessingStatus>()?;
        debug!(%status, "advertisement processing status");
        Ok(status)
    }

    /// First page of the advertiser's advertisements.
    pub async fn get_all_advertisements(
        &self,
    ) -> Result<ResourceEnvelope<AdvertisementSummaryPage>> {
        let uri = self.relation_uri(ADVERTISEMENTS_REL, None).await?;
        self.get_advertisements_page(&uri).await
    }

    /// A page of advertisements at `uri`, e.g. a `next` link from a previous
    /// page.
    pub async fn get_advertisements_page(
        &self,
        uri: &Url,
    ) -> Result<ResourceEnvelope<AdvertisementSummaryPage>> {
        self.hal.get(uri).await
    }

    /// Replace an advertisement. The body is `None` when the server answers
    /// without one.
    #[instrument(skip_all, fields(uri = %uri))]
    pub async fn update_advertisement(
        &self,
        uri: &Url,
        advertisement: &Advertisement,
    ) -> Result<ResourceEnvelope<Option<AdvertisementResource>>> {
        self.hal.put(uri, advertisement).await
    }

    /// Replace an advertisement located through the templated
    /// `advertisement` relation.
    #[instrument(skip(self, advertisement))]
    pub async fn update_advertisement_by_id(
        &self,
        id: Uuid,
        advertisement: &Advertisement,
    ) -> Result<ResourceEnvelope<Option<AdvertisementResource>>> {
        let params = TemplateParams::new().with(ADVERTISEMENT_ID_PARAM, id);
        let uri = self.relation_uri(ADVERTISEMENT_REL, Some(&params)).await?;
        self.update_advertisement(&uri, advertisement).await
    }

    #[instrument(skip_all, fields(uri = %uri))]
    pub async fn expire_advertisement(
        &self,
        uri: &Url,
        patch: &AdvertisementPatch,
    ) -> Result<ResourceEnvelope<Option<AdvertisementResource>>> {
        self.hal.patch(uri, patch).await
    }

    /// Release the client. Pending and later operations fail with
    /// `ClientDisposed`.
    pub fn dispose(&self) {
        self.shutdown.cancel();
        self.hal.dispose();
        if let Some(cache) = &self.token_cache {
            cache.dispose();
        }
        info!("Ad Posting API client disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn bootstrap(&self) -> &RootBootstrap {
        &self.bootstrap
    }

    pub const fn hal(&self) -> &HalClient {
        &self.hal
    }

    async fn relation_uri(&self, relation: &str, params: Option<&TemplateParams>) -> Result<Url> {
        let root = self.bootstrap.ensure_root_loaded().await?;
        self.resolver.resolve(root.links(), relation, params)
    }
}

/// Builder for [`AdPostingApiClient`].
pub struct AdPostingApiClientBuilder {
    base_uri: Url,
    http: Option<HttpClient>,
    token_source: Option<Arc<dyn TokenSource>>,
    token_cache: Option<Arc<TokenCache>>,
    policy: BootstrapFailurePolicy,
    shutdown: Option<CancellationToken>,
}

impl AdPostingApiClientBuilder {
    #[must_use]
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Any token source. Takes precedence over [`Self::token_cache`].
    #[must_use]
    pub fn token_source(mut self, source: Arc<dyn TokenSource>) -> Self {
        self.token_source = Some(source);
        self
    }

    /// A token cache that is disposed together with the client.
    #[must_use]
    pub fn token_cache(mut self, cache: Arc<TokenCache>) -> Self {
        self.token_cache = Some(cache);
        self
    }

    #[must_use]
    pub const fn bootstrap_failure_policy(mut self, policy: BootstrapFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn build(self) -> Result<AdPostingApiClient> {
        let token_source: Arc<dyn TokenSource> = match (self.token_source, &self.token_cache) {
            (Some(source), _) => source,
            (None, Some(cache)) => Arc::clone(cache) as Arc<dyn TokenSource>,
            (None, None) => {
                return Err(HalError::Config(
                    "a token source or token cache is required".to_string(),
                ))
            }
        };

        let shutdown = self.shutdown.unwrap_or_default();
        let mut hal = HalClient::builder().token_source(token_source).shutdown(shutdown.clone());
        if let Some(http) = self.http {
            hal = hal.http_client(http);
        }
        let hal = hal.build()?;

        let bootstrap = RootBootstrap::new(hal.clone(), self.base_uri.clone(), self.policy);
        debug!(base_uri = %self.base_uri, policy = ?self.policy, "Ad Posting API client ready");

        Ok(AdPostingApiClient {
            hal,
            bootstrap: Arc::new(bootstrap),
            resolver: LinkResolver::new(self.base_uri),
            shutdown,
            token_cache: self.token_cache,
        })
    }
}
