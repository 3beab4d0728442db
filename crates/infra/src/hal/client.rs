//! Authenticated HTTP verbs over HAL resources
//!
//! Every call runs the same pipeline: inject the bearer token, send, normalize
//! server quirks, then classify the status. A 401 invalidates the token that
//! was used, fetches a fresh one and repeats the request exactly once.

use std::sync::Arc;

use adpost_core::TokenSource;
use adpost_domain::constants::{ACCEPT_HAL_OR_JSON, JSON};
use adpost_domain::{BearerToken, HalError, Result};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use super::envelope::ResourceEnvelope;
use super::response::RawResponse;
use crate::http::HttpClient;

/// Typed HAL client. Cloning shares the transport pool, the token source and
/// the disposal state.
#[derive(Clone)]
pub struct HalClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: HttpClient,
    tokens: Arc<dyn TokenSource>,
    shutdown: CancellationToken,
}

impl HalClient {
    pub fn builder() -> HalClientBuilder {
        HalClientBuilder::default()
    }

    /// GET `uri` and decode the body into `T`.
    #[instrument(skip_all, fields(method = "GET", uri = %uri))]
    pub async fn get<T>(&self, uri: &Url) -> Result<ResourceEnvelope<T>>
    where
        T: DeserializeOwned,
    {
        let raw = self.execute(Method::GET, uri, None, None).await?;
        ResourceEnvelope::decode(raw)
    }

    /// HEAD `uri`, returning only the response headers.
    #[instrument(skip_all, fields(method = "HEAD", uri = %uri))]
    pub async fn head(&self, uri: &Url) -> Result<HeaderMap> {
        let raw = self.execute(Method::HEAD, uri, None, None).await?;
        Ok(raw.headers)
    }

    /// POST `body` as JSON and decode the response body into `T`.
    #[instrument(skip_all, fields(method = "POST", uri = %uri))]
    pub async fn post<B, T>(&self, uri: &Url, body: &B) -> Result<ResourceEnvelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let raw = self.execute(Method::POST, uri, Some(encode(body)?), None).await?;
        ResourceEnvelope::decode(raw)
    }

    /// POST `body` and return the `Location` of the created resource.
    ///
    /// A 409 is reported as [`HalError::Conflict`] carrying `conflict_key`.
    /// A success without a usable `Location` is an unexpected response.
    #[instrument(skip_all, fields(method = "POST", uri = %uri, conflict_key = ?conflict_key))]
    pub async fn post_for_location<B>(
        &self,
        uri: &Url,
        body: &B,
        conflict_key: Option<&str>,
    ) -> Result<Url>
    where
        B: Serialize + ?Sized,
    {
        let raw = self.execute(Method::POST, uri, Some(encode(body)?), conflict_key).await?;

        let location = raw
            .headers
            .get(LOCATION)
            .ok_or_else(|| {
                HalError::UnexpectedResponse(format!(
                    "{} response did not include a Location header",
                    raw.status
                ))
            })?
            .to_str()
            .map_err(|err| {
                HalError::UnexpectedResponse(format!("unreadable Location header: {err}"))
            })?;

        Url::parse(location).map_err(|err| {
            HalError::UnexpectedResponse(format!("invalid Location header '{location}': {err}"))
        })
    }

    /// PUT `body` as JSON, replacing the resource at `uri`.
    #[instrument(skip_all, fields(method = "PUT", uri = %uri))]
    pub async fn put<B, T>(&self, uri: &Url, body: &B) -> Result<ResourceEnvelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let raw = self.execute(Method::PUT, uri, Some(encode(body)?), None).await?;
        ResourceEnvelope::decode(raw)
    }

    /// PATCH the resource at `uri` with a JSON `body`.
    #[instrument(skip_all, fields(method = "PATCH", uri = %uri))]
    pub async fn patch<B, T>(&self, uri: &Url, body: &B) -> Result<ResourceEnvelope<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let raw = self.execute(Method::PATCH, uri, Some(encode(body)?), None).await?;
        ResourceEnvelope::decode(raw)
    }

    /// Fail every pending and future request with `ClientDisposed`.
    pub fn dispose(&self) {
        self.inner.shutdown.cancel();
    }

    /// Whether [`HalClient::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    async fn execute(
        &self,
        method: Method,
        uri: &Url,
        body: Option<Vec<u8>>,
        conflict_key: Option<&str>,
    ) -> Result<RawResponse> {
        if self.is_disposed() {
            return Err(HalError::ClientDisposed);
        }

        tokio::select! {
            biased;
            () = self.inner.shutdown.cancelled() => Err(HalError::ClientDisposed),
            result = self.pipeline(method, uri, body, conflict_key) => result,
        }
    }

    async fn pipeline(
        &self,
        method: Method,
        uri: &Url,
        body: Option<Vec<u8>>,
        conflict_key: Option<&str>,
    ) -> Result<RawResponse> {
        let tokens = &self.inner.tokens;

        let token = tokens.token().await?;
        let mut response = self.send(&method, uri, body.clone(), &token).await?.normalize(uri);

        if response.status == StatusCode::UNAUTHORIZED {
            warn!(%method, %uri, "request unauthorized; refreshing token and retrying once");
            tokens.invalidate(&token);
            let fresh = tokens.token().await?;
            response = self.send(&method, uri, body, &fresh).await?.normalize(uri);
        }

        let status = response.status;
        match response.classify(conflict_key) {
            Ok(response) => {
                debug!(%method, %uri, %status, "request succeeded");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %uri, %status, category = ?err.category(), "request failed");
                Err(err)
            }
        }
    }

    async fn send(
        &self,
        method: &Method,
        uri: &Url,
        body: Option<Vec<u8>>,
        token: &BearerToken,
    ) -> Result<RawResponse> {
        let http = &self.inner.http;
        let mut request = http
            .request(method.clone(), uri.clone())
            .header(AUTHORIZATION, token.authorization_value())
            .header(ACCEPT, ACCEPT_HAL_OR_JSON)
            .header(CONTENT_TYPE, JSON);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = http.send(request).await?;
        RawResponse::read(response).await
    }
}

impl std::fmt::Debug for HalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HalClient")
            .field("http", &self.inner.http)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

fn encode<B>(body: &B) -> Result<Vec<u8>>
where
    B: Serialize + ?Sized,
{
    Ok(serde_json::to_vec(body)?)
}

/// Builder for [`HalClient`]. A token source is required.
#[derive(Default)]
pub struct HalClientBuilder {
    http: Option<HttpClient>,
    tokens: Option<Arc<dyn TokenSource>>,
    shutdown: Option<CancellationToken>,
}

impl HalClientBuilder {
    #[must_use]
    pub fn http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    #[must_use]
    pub fn token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Share disposal with other components holding the same token.
    #[must_use]
    pub fn shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn build(self) -> Result<HalClient> {
        let tokens = self
            .tokens
            .ok_or_else(|| HalError::Config("HalClient requires a token source".to_string()))?;
        let http = match self.http {
            Some(http) => http,
            None => HttpClient::new()?,
        };

        Ok(HalClient {
            inner: Arc::new(Inner {
                http,
                tokens,
                shutdown: self.shutdown.unwrap_or_default(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// Issues `token-1`, `token-2`, ... and counts invalidations.
    #[derive(Default)]
    struct SequenceTokens {
        issued: AtomicUsize,
        invalidated: AtomicUsize,
    }

    #[async_trait]
    impl TokenSource for SequenceTokens {
        async fn token(&self) -> Result<BearerToken> {
            let n = self.issued.load(Ordering::SeqCst).max(1);
            self.issued.store(n, Ordering::SeqCst);
            Ok(BearerToken::new(
                format!("token-{n}"),
                "Bearer",
                Utc::now() + ChronoDuration::hours(1),
                None,
            ))
        }

        fn invalidate(&self, _stale: &BearerToken) {
            self.invalidated.fetch_add(1, Ordering::SeqCst);
            self.issued.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn client(tokens: Arc<SequenceTokens>) -> HalClient {
        HalClient::builder().token_source(tokens).build().unwrap()
    }

    fn url(server: &MockServer, path: &str) -> Url {
        Url::parse(&format!("{}{path}", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn sends_bearer_token_and_content_negotiation_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/thing"))
            .and(header("authorization", "Bearer token-1"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let envelope: ResourceEnvelope<serde_json::Value> =
            client(Arc::default()).get(&url(&server, "/thing")).await.unwrap();
        assert_eq!(envelope.status(), StatusCode::OK);

        let requests = server.received_requests().await.unwrap();
        let accept = requests[0].headers.get("accept").unwrap().to_str().unwrap();
        assert!(accept.contains("application/hal+json"));
    }

    #[tokio::test]
    async fn missing_token_source_is_a_config_error() {
        let err = HalClient::builder().build().unwrap_err();
        assert!(matches!(err, HalError::Config(_)));
    }

    #[tokio::test]
    async fn unauthorized_is_retried_once_with_a_fresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(header("authorization", "Bearer token-2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = Arc::new(SequenceTokens::default());
        let result: Result<ResourceEnvelope<serde_json::Value>> =
            client(Arc::clone(&tokens)).get(&url(&server, "/thing")).await;

        assert!(result.is_ok());
        assert_eq!(tokens.invalidated.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disposed_client_rejects_requests() {
        let server = MockServer::start().await;
        let client = client(Arc::default());
        client.dispose();

        let err = client.head(&url(&server, "/thing")).await.unwrap_err();
        assert_eq!(err, HalError::ClientDisposed);
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
