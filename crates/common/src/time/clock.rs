//! Wall-clock abstraction for testability
//!
//! ```
//! use adpost_common::time::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let now = clock.now();
//! assert!(now.timestamp() > 0);
//! ```

use chrono::{DateTime, Utc};

/// Source of the current UTC time.
///
/// Production code uses [`SystemClock`]; tests substitute a clock they can
/// move forward without sleeping.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
