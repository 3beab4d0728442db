//! # AdPost Core
//!
//! Navigation logic and port definitions, free of HTTP concerns.
//!
//! This crate contains:
//! - HAL link resolution with RFC 6570 URI-template expansion
//! - Port interfaces (traits) for token acquisition
//!
//! ## Architecture Principles
//! - Depends only on `adpost-domain`
//! - No HTTP client code; infrastructure plugs in through the ports
//! - Deterministic: resolution has no hidden state

pub mod links;
pub mod ports;

// Re-export specific items to avoid ambiguity
pub use links::{LinkResolver, TemplateError, TemplateParams, UriTemplate};
pub use ports::{TokenEndpoint, TokenSource};
