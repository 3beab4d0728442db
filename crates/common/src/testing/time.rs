//! Mock wall clock for deterministic expiry tests

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use crate::time::Clock;

/// Clock that starts at a fixed instant and only moves when advanced.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the component under test.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Clock frozen at the current real time.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Clock frozen at `start`.
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    /// Clock frozen at the given UNIX timestamp (seconds).
    ///
    /// Falls back to the epoch for out-of-range values.
    #[must_use]
    pub fn at_timestamp(secs: i64) -> Self {
        let start = Utc.timestamp_opt(secs, 0).single().unwrap_or_default();
        Self::starting_at(start)
    }

    /// Move time forward.
    pub fn advance(&self, duration: Duration) {
        let delta = chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX);
        let mut now = self.now.lock();
        *now = now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC);
    }

    /// Jump to an absolute time.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_frozen_until_advanced() {
        let clock = MockClock::at_timestamp(1_700_000_000);
        assert_eq!(clock.now().timestamp(), 1_700_000_000);

        clock.advance(Duration::from_secs(90));
        assert_eq!(clock.now().timestamp(), 1_700_000_090);
    }

    #[test]
    fn clones_share_time() {
        let clock = MockClock::at_timestamp(0);
        let handle = clock.clone();

        handle.advance(Duration::from_secs(3600));
        assert_eq!(clock.now().timestamp(), 3600);

        clock.set(Utc.timestamp_opt(42, 0).unwrap());
        assert_eq!(handle.now().timestamp(), 42);
    }
}
