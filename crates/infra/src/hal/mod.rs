//! HAL resource access
//!
//! - [`HalClient`]: authenticated, typed HTTP verbs over HAL resources
//! - [`ResourceEnvelope`]: decoded body plus links, headers and status
//! - [`RootBootstrap`]: run-once load of the API root and its link table

pub mod bootstrap;
pub mod client;
pub mod envelope;
mod response;

pub use bootstrap::{BootstrapState, RootBootstrap};
pub use client::{HalClient, HalClientBuilder};
pub use envelope::{IndexBody, ResourceEnvelope, RootIndex};
