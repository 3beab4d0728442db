//! Common runtime utilities shared across the AdPost client crates.
//!
//! # Modules
//!
//! - [`sync`]: single-flight coalescing of concurrent asynchronous work
//! - [`time`]: clock abstraction used for token expiry decisions
//! - [`testing`]: mock clock and tracing bootstrap (feature `test-utils`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod sync;
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use sync::{FlightAborted, FlightState, SingleFlight};
pub use time::{Clock, SystemClock};
