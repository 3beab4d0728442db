//! Domain types and models
//!
//! - [`token`]: OAuth2 bearer tokens and the token endpoint response
//! - [`links`]: HAL link relations and the per-resource link table
//! - [`advertisement`]: resource shapes exchanged by the advertisement façade

pub mod advertisement;
pub mod links;
pub mod token;

pub use advertisement::{
    Advertisement, AdvertisementPatch, AdvertisementResource, AdvertisementSummary,
    AdvertisementSummaryPage, PatchOperation, ProcessingStatus, TemplateItem,
};
pub use links::{LinkRelation, Links};
pub use token::{BearerToken, TokenResponse};
