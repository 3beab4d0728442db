//! # AdPost Infrastructure
//!
//! HTTP-backed implementation of the Ad Posting API client.
//!
//! This crate contains:
//! - The shared HTTP transport ([`http`])
//! - OAuth2 client-credentials token acquisition and caching ([`auth`])
//! - The HAL resource client and root bootstrap ([`hal`])
//! - Advertisement operations ([`api`])
//! - Configuration loading from environment and files ([`config`])
//!
//! ## Architecture
//! - Implements the ports defined in `adpost-core`
//! - Contains all I/O; `adpost-domain` and `adpost-core` stay pure

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod hal;
pub mod http;

// Re-export commonly used items
pub use api::{AdPostingApiClient, AdPostingApiClientBuilder};
pub use auth::{ClientCredentialsEndpoint, CredentialPlacement, TokenCache};
pub use errors::InfraError;
pub use hal::{
    BootstrapState, HalClient, HalClientBuilder, IndexBody, ResourceEnvelope, RootBootstrap,
    RootIndex,
};
pub use http::{HttpClient, HttpClientBuilder};
