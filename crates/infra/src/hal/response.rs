//! Buffered responses, normalization and status classification

use adpost_domain::{HalError, Result};
use reqwest::header::{HeaderMap, HeaderValue, LOCATION};
use reqwest::{Response, StatusCode};
use url::Url;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A response whose body has been read in full.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Vec<u8>,
}

impl RawResponse {
    pub(crate) async fn read(response: Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|err| HalError::transport(format!("failed to read response body: {err}")))?;

        Ok(Self { status, headers, body: body.to_vec() })
    }

    /// Smooth over server quirks before anything looks at the response.
    ///
    /// A relative `Location` is resolved against `request_uri`, a leading
    /// UTF-8 byte order mark is dropped and a whitespace-only body counts as
    /// no body at all.
    pub(crate) fn normalize(mut self, request_uri: &Url) -> Self {
        let resolved = self
            .headers
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .filter(|location| {
                matches!(Url::parse(location), Err(url::ParseError::RelativeUrlWithoutBase))
            })
            .and_then(|location| request_uri.join(location).ok())
            .and_then(|absolute| HeaderValue::from_str(absolute.as_str()).ok());
        if let Some(location) = resolved {
            self.headers.insert(LOCATION, location);
        }

        if self.body.starts_with(UTF8_BOM) {
            self.body.drain(..UTF8_BOM.len());
        }
        if self.body.iter().all(u8::is_ascii_whitespace) {
            self.body.clear();
        }
        self
    }

    pub(crate) fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).trim().to_string()
    }

    /// Map a non-success status to its error.
    ///
    /// `conflict_key` is carried verbatim into [`HalError::Conflict`].
    pub(crate) fn classify(self, conflict_key: Option<&str>) -> Result<Self> {
        let status = self.status;
        if status.is_success() {
            return Ok(self);
        }

        let code = status.as_u16();
        let body = self.body_text();
        let error = match status {
            StatusCode::UNAUTHORIZED => HalError::Unauthorized(if body.is_empty() {
                "server rejected a freshly issued token".to_string()
            } else {
                body
            }),
            StatusCode::CONFLICT => {
                HalError::Conflict { key: conflict_key.map(str::to_owned), body }
            }
            s if s.is_client_error() => HalError::RequestRejected { status: code, body },
            s if s.is_server_error() => HalError::server(code, format!("HTTP {code}: {body}")),
            _ => HalError::UnexpectedResponse(format!("unexpected HTTP status {status}")),
        };
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, body: &[u8]) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: body.to_vec(),
        }
    }

    fn request_uri() -> Url {
        Url::parse("https://api.example.com/advertisement").unwrap()
    }

    #[test]
    fn relative_location_is_made_absolute() {
        let mut response = raw(201, b"");
        response.headers.insert(LOCATION, HeaderValue::from_static("/advertisement/42"));

        let response = response.normalize(&request_uri());
        assert_eq!(
            response.headers.get(LOCATION).unwrap(),
            "https://api.example.com/advertisement/42"
        );
    }

    #[test]
    fn absolute_location_is_untouched() {
        let mut response = raw(201, b"");
        response.headers.insert(LOCATION, HeaderValue::from_static("http://localhost/a/1"));

        let response = response.normalize(&request_uri());
        assert_eq!(response.headers.get(LOCATION).unwrap(), "http://localhost/a/1");
    }

    #[test]
    fn bom_and_blank_bodies_are_normalized() {
        let response = raw(200, b"\xEF\xBB\xBF{\"a\":1}").normalize(&request_uri());
        assert_eq!(response.body, b"{\"a\":1}");

        let response = raw(200, b"  \r\n").normalize(&request_uri());
        assert!(response.body.is_empty());
    }

    #[test]
    fn classification_by_status() {
        assert!(raw(204, b"").classify(None).is_ok());

        assert_eq!(
            raw(409, b"duplicate").classify(Some("creation-1")).unwrap_err(),
            HalError::Conflict { key: Some("creation-1".into()), body: "duplicate".into() }
        );
        assert_eq!(
            raw(400, b"bad").classify(None).unwrap_err(),
            HalError::RequestRejected { status: 400, body: "bad".into() }
        );
        assert!(matches!(
            raw(401, b"").classify(None).unwrap_err(),
            HalError::Unauthorized(_)
        ));
        assert!(matches!(
            raw(503, b"down").classify(None).unwrap_err(),
            HalError::TransportFailure { status: Some(503), .. }
        ));
        assert!(matches!(
            raw(304, b"").classify(None).unwrap_err(),
            HalError::UnexpectedResponse(_)
        ));
    }
}
