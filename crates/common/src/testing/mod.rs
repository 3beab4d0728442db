//! Testing utilities and helpers
//!
//! - **[`time`]**: [`MockClock`], a [`Clock`](crate::time::Clock) that only
//!   moves when told to
//! - **[`logging`]**: one-shot subscriber setup for test binaries
//!
//! ```rust
//! # #[cfg(feature = "test-utils")]
//! # {
//! use std::time::Duration;
//!
//! use adpost_common::testing::MockClock;
//! use adpost_common::time::Clock;
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!((clock.now() - start).num_seconds(), 5);
//! # }
//! ```

pub mod logging;
pub mod time;

pub use logging::init_test_tracing;
pub use time::MockClock;
