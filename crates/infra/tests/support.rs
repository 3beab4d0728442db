//! Shared wiremock fixtures for the integration tests.

use std::sync::Arc;

use adpost_core::TokenSource;
use adpost_domain::{BearerToken, ClientConfig, Result};
use adpost_infra::{ClientCredentialsEndpoint, HalClient, HttpClient, TokenCache};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN_PATH: &str = "/oauth2/token";
pub const CLIENT_ID: &str = "testClientId";
pub const CLIENT_SECRET: &str = "testClientSecret";
pub const ACCESS_TOKEN: &str = "b635a7ea-1361-4cd8-9a07-bc3c12b2cf9e";
pub const ADVERTISEMENT_LOCATION: &str =
    "http://localhost/advertisement/75b2b1fc-9050-4f45-a632-ec6b7ac2bb4a";

pub fn url(server: &MockServer, relative: &str) -> Url {
    Url::parse(&format!("{}{relative}", server.uri())).expect("mock server url")
}

pub fn token_body(access_token: &str, expires_in: i64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": expires_in,
        "scope": "seek"
    })
}

/// Token endpoint that always issues [`ACCESS_TOKEN`], valid for an hour.
pub async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(ACCESS_TOKEN, 3600)))
        .mount(server)
        .await;
}

pub fn root_document() -> Value {
    json!({
        "_links": {
            "self": { "href": "/" },
            "advertisements": { "href": "/advertisement" },
            "advertisement": { "href": "/advertisement/{advertisementId}", "templated": true }
        }
    })
}

pub async fn mount_root(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/hal+json; charset=utf-8")
                .set_body_json(root_document()),
        )
        .mount(server)
        .await;
}

pub fn client_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(
        format!("{}/", server.uri()),
        format!("{}{TOKEN_PATH}", server.uri()),
        CLIENT_ID,
        CLIENT_SECRET,
    )
}

pub fn token_cache(server: &MockServer) -> TokenCache {
    let endpoint = ClientCredentialsEndpoint::new(
        HttpClient::new().expect("http client"),
        url(server, TOKEN_PATH),
        CLIENT_ID,
        CLIENT_SECRET,
    );
    TokenCache::new(Arc::new(endpoint))
}

/// Token source that always hands out the same long-lived token.
pub struct StaticTokens(pub BearerToken);

impl StaticTokens {
    pub fn new() -> Self {
        Self(BearerToken::new(ACCESS_TOKEN, "Bearer", Utc::now() + Duration::hours(1), None))
    }
}

#[async_trait]
impl TokenSource for StaticTokens {
    async fn token(&self) -> Result<BearerToken> {
        Ok(self.0.clone())
    }

    fn invalidate(&self, _stale: &BearerToken) {}
}

pub fn static_hal_client() -> HalClient {
    HalClient::builder().token_source(Arc::new(StaticTokens::new())).build().expect("hal client")
}
