//! # AdPost Domain
//!
//! Data model and error taxonomy for the Ad Posting API client.
//!
//! This crate contains:
//! - Token types (`BearerToken`, `TokenResponse`)
//! - HAL link types (`LinkRelation`, `Links`)
//! - Advertisement resource shapes used by the façade
//! - The `HalError` taxonomy and `Result` alias
//! - Client configuration structures
//!
//! ## Architecture
//! - Depends only on `adpost-common` among workspace crates
//! - No I/O: pure data structures and conversions

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::{BootstrapFailurePolicy, ClientConfig};
pub use errors::{ErrorCategory, HalError, Result};
pub use types::{
    Advertisement, AdvertisementPatch, AdvertisementResource, AdvertisementSummary,
    AdvertisementSummaryPage, BearerToken, LinkRelation, Links, PatchOperation,
    ProcessingStatus, TemplateItem, TokenResponse,
};
