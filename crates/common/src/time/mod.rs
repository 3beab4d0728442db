//! Time utilities and abstractions
//!
//! - **Clock abstraction**: [`Clock`] with the real [`SystemClock`]; a
//!   controllable `MockClock` lives in `testing` behind `test-utils`.
//!
//! Token expiry is decided against wall-clock time, so the clock returns
//! `chrono::DateTime<Utc>` rather than a monotonic instant.

pub mod clock;

pub use clock::{Clock, SystemClock};
