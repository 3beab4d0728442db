//! Conversions from external infrastructure errors into domain errors.

use adpost_domain::HalError;
use reqwest::Error as HttpError;
use url::ParseError as UrlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub HalError);

impl From<InfraError> for HalError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<HalError> for InfraError {
    fn from(value: HalError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoHalError {
    fn into_hal(self) -> HalError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → HalError */
/* -------------------------------------------------------------------------- */

impl IntoHalError for HttpError {
    fn into_hal(self) -> HalError {
        if self.is_builder() {
            return HalError::InvalidUri(format!("could not build HTTP request: {self}"));
        }

        if self.is_timeout() {
            return HalError::transport(format!("HTTP request timed out: {self}"));
        }

        if self.is_connect() {
            return HalError::transport(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return HalError::Serialization(format!("could not decode HTTP response: {self}"));
        }

        if let Some(status) = self.status() {
            let message = format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            );
            return HalError::server(status.as_u16(), message);
        }

        HalError::transport(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_hal())
    }
}

/* -------------------------------------------------------------------------- */
/* url::ParseError → HalError */
/* -------------------------------------------------------------------------- */

impl IntoHalError for UrlError {
    fn into_hal(self) -> HalError {
        HalError::InvalidUri(self.to_string())
    }
}

impl From<UrlError> for InfraError {
    fn from(value: UrlError) -> Self {
        Self(value.into_hal())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
