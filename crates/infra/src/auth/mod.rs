//! OAuth2 client-credentials authentication
//!
//! - [`ClientCredentialsEndpoint`]: one token request per call
//! - [`TokenCache`]: caches the current bearer token and coalesces refreshes

pub mod client_credentials;
pub mod token_cache;

pub use client_credentials::{ClientCredentialsEndpoint, CredentialPlacement};
pub use token_cache::TokenCache;
