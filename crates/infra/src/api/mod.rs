//! Ad Posting API operations
//!
//! [`AdPostingApiClient`] navigates from the API root to advertisement
//! resources through link relations and exposes create, read, update, expire
//! and status operations.

pub mod client;

pub use client::{AdPostingApiClient, AdPostingApiClientBuilder};
