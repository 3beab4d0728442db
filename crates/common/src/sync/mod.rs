//! Concurrency primitives
//!
//! - [`SingleFlight`]: one underlying execution per coalesced unit of work,
//!   with the outcome published to every concurrent waiter.

pub mod single_flight;

pub use single_flight::{FlightAborted, FlightState, SingleFlight};
