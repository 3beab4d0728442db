//! Typed response envelopes

use adpost_domain::{HalError, LinkRelation, Links, Result};
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::StatusCode;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use url::Url;

use super::response::RawResponse;

/// Snapshot of one response: the decoded body, its `_links`, the headers and
/// the status.
#[derive(Debug, Clone)]
pub struct ResourceEnvelope<T> {
    body: T,
    links: Links,
    headers: HeaderMap,
    status: StatusCode,
}

impl<T> ResourceEnvelope<T> {
    pub fn new(body: T, links: Links, headers: HeaderMap, status: StatusCode) -> Self {
        Self { body, links, headers, status }
    }

    pub const fn body(&self) -> &T {
        &self.body
    }

    pub fn into_body(self) -> T {
        self.body
    }

    pub const fn links(&self) -> &Links {
        &self.links
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Header value as text; `None` when absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Absolute `Location` header, if the response carried a valid one.
    pub fn location(&self) -> Option<Url> {
        self.header(LOCATION.as_str()).and_then(|value| Url::parse(value).ok())
    }

    pub fn link(&self, relation: &str) -> Option<&LinkRelation> {
        self.links.get(relation)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResourceEnvelope<U> {
        ResourceEnvelope {
            body: f(self.body),
            links: self.links,
            headers: self.headers,
            status: self.status,
        }
    }
}

impl<T: DeserializeOwned> ResourceEnvelope<T> {
    /// Decode a classified success response.
    ///
    /// An empty body decodes from JSON `null`, so `()` and `Option<_>`
    /// targets succeed and anything else is an unexpected response.
    pub(crate) fn decode(raw: RawResponse) -> Result<Self> {
        let RawResponse { status, headers, body } = raw;

        if body.is_empty() {
            let body = serde_json::from_value(Value::Null).map_err(|err| {
                HalError::UnexpectedResponse(format!(
                    "{status} response has no body but one was required: {err}"
                ))
            })?;
            return Ok(Self::new(body, Links::new(), headers, status));
        }

        let document: Value = serde_json::from_slice(&body)?;
        let links = Links::from_hal_value(&document)?;
        let body = serde_json::from_value(document)?;
        Ok(Self::new(body, links, headers, status))
    }
}

/// Body of the API root. Only its links matter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexBody;

impl<'de> Deserialize<'de> for IndexBody {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Self)
    }
}

/// The API root: its link table drives all navigation.
pub type RootIndex = ResourceEnvelope<IndexBody>;
