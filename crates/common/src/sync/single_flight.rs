//! Single-flight execution cell
//!
//! A [`SingleFlight`] owns at most one value and at most one in-flight fetch
//! of that value. Concurrent callers that find the cell empty (or holding a
//! value they consider stale) are coalesced onto one shared fetch:
//!
//! - the first caller launches the fetch on the tokio runtime;
//! - every other caller awaits the same shared future;
//! - the outcome (value or error) is published to all of them and stored in
//!   the cell by the fetch task itself.
//!
//! Because the fetch runs on a spawned task, a caller that stops waiting
//! (timeout, `select!`, dropped future) never cancels the fetch for the
//! remaining waiters, and never leaves the cell half-updated.
//!
//! # Failure memory
//!
//! [`SingleFlight::new`] forgets failures: once a failed fetch has been
//! published the cell goes back to what it held before the flight (the
//! previous value, or nothing) and the next caller launches a new fetch.
//! [`SingleFlight::remembering_failures`] keeps the first error and returns
//! it to every later caller, which gives run-once-ever semantics.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

/// The spawned fetch task ended without producing a result (panic or runtime
/// shutdown).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("single-flight task aborted: {reason}")]
pub struct FlightAborted {
    reason: String,
}

impl FlightAborted {
    /// Create a new abort marker with a human-readable reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    /// Why the flight was aborted.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

type Flight<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

/// Observable state of a [`SingleFlight`] cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightState {
    /// Nothing stored, nothing running
    Empty,
    /// A fetch is running
    InFlight,
    /// A value is stored
    Ready,
    /// A remembered failure is stored
    Failed,
}

enum Slot<T, E> {
    Empty,
    InFlight { generation: u64, flight: Flight<T, E>, previous: Option<T> },
    Ready(T),
    Failed(E),
}

impl<T, E> Slot<T, E> {
    const fn state(&self) -> FlightState {
        match self {
            Self::Empty => FlightState::Empty,
            Self::InFlight { .. } => FlightState::InFlight,
            Self::Ready(_) => FlightState::Ready,
            Self::Failed(_) => FlightState::Failed,
        }
    }
}

struct Inner<T, E> {
    slot: Slot<T, E>,
    generation: u64,
}

/// Coalescing cell: one underlying fetch per flight, shared by every
/// concurrent caller.
///
/// Cloning a `SingleFlight` is not supported; share it behind an `Arc` or
/// embed it in a type that is itself shared.
pub struct SingleFlight<T, E> {
    inner: Arc<Mutex<Inner<T, E>>>,
    remember_failures: bool,
}

impl<T, E> SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<FlightAborted> + 'static,
{
    /// Create an empty cell that forgets failures after publishing them.
    #[must_use]
    pub fn new() -> Self {
        Self::with_failure_memory(false)
    }

    /// Create an empty cell that keeps the first failure forever.
    #[must_use]
    pub fn remembering_failures() -> Self {
        Self::with_failure_memory(true)
    }

    fn with_failure_memory(remember_failures: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner { slot: Slot::Empty, generation: 0 })),
            remember_failures,
        }
    }

    /// Return the stored value if `is_fresh` accepts it, otherwise join (or
    /// launch) the single in-flight fetch and return its outcome.
    ///
    /// `fetch` is only invoked when this caller is the one launching the
    /// flight. The future it returns is spawned on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the fetch error (shared by every waiter of the same flight), a
    /// remembered failure, or `E::from(FlightAborted)` if the fetch task died.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime while a fetch must be
    /// launched.
    pub async fn get_or_fetch<P, F, Fut>(&self, is_fresh: P, fetch: F) -> Result<T, E>
    where
        P: Fn(&T) -> bool,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let flight = {
            let mut inner = self.inner.lock();
            let joined = match &inner.slot {
                Slot::Ready(value) if is_fresh(value) => return Ok(value.clone()),
                Slot::Failed(error) => return Err(error.clone()),
                Slot::InFlight { flight, .. } => Some(flight.clone()),
                Slot::Ready(_) | Slot::Empty => None,
            };

            match joined {
                Some(flight) => flight,
                None => {
                    let previous = match std::mem::replace(&mut inner.slot, Slot::Empty) {
                        Slot::Ready(value) => Some(value),
                        _ => None,
                    };
                    self.launch(&mut inner, previous, fetch())
                }
            }
        };

        flight.await
    }

    fn launch<Fut>(&self, inner: &mut Inner<T, E>, previous: Option<T>, fut: Fut) -> Flight<T, E>
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        inner.generation = inner.generation.wrapping_add(1);
        let generation = inner.generation;
        let remember_failures = self.remember_failures;

        let task_state = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let result = fut.await;
            publish(&task_state, generation, &result, remember_failures);
            result
        });

        let abort_state = Arc::clone(&self.inner);
        let flight: Flight<T, E> = async move {
            match task.await {
                Ok(result) => result,
                Err(join_error) => {
                    warn!(generation, error = %join_error, "single-flight task did not complete");
                    let result = Err(E::from(FlightAborted::new(join_error.to_string())));
                    publish(&abort_state, generation, &result, false);
                    result
                }
            }
        }
        .boxed()
        .shared();

        debug!(generation, "single-flight launched");
        inner.slot = Slot::InFlight { generation, flight: flight.clone(), previous };
        flight
    }

    /// Current value, if the cell holds one. Never waits and never fetches.
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        match &self.inner.lock().slot {
            Slot::Ready(value) => Some(value.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn state(&self) -> FlightState {
        self.inner.lock().slot.state()
    }

    /// Whether a fetch is currently running.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.state() == FlightState::InFlight
    }

    /// Drop the stored value if `predicate` matches it.
    ///
    /// While a fetch is running, the value it would fall back to on failure
    /// is checked instead. Remembered failures are left untouched. Returns
    /// `true` when a value was removed.
    pub fn invalidate_if(&self, predicate: impl FnOnce(&T) -> bool) -> bool {
        let mut inner = self.inner.lock();
        match &mut inner.slot {
            Slot::Ready(value) => {
                if !predicate(value) {
                    return false;
                }
            }
            Slot::InFlight { previous, .. } => {
                let matched = previous.as_ref().is_some_and(predicate);
                if matched {
                    *previous = None;
                }
                return matched;
            }
            Slot::Empty | Slot::Failed(_) => return false,
        }
        inner.slot = Slot::Empty;
        true
    }

    /// Forget any stored value or remembered failure.
    ///
    /// A running fetch keeps running and still publishes to its waiters.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        if matches!(inner.slot, Slot::Ready(_) | Slot::Failed(_)) {
            inner.slot = Slot::Empty;
        }
    }
}

impl<T, E> Default for SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<FlightAborted> + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for SingleFlight<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SingleFlight")
            .field("state", &inner.slot.state())
            .field("generation", &inner.generation)
            .field("remember_failures", &self.remember_failures)
            .finish()
    }
}

/// Store the outcome of flight `generation`, unless the cell has moved on.
fn publish<T: Clone, E: Clone>(
    state: &Mutex<Inner<T, E>>,
    generation: u64,
    result: &Result<T, E>,
    remember_failures: bool,
) {
    let mut inner = state.lock();
    let current = matches!(inner.slot, Slot::InFlight { generation: g, .. } if g == generation);
    if !current {
        return;
    }

    let previous = match std::mem::replace(&mut inner.slot, Slot::Empty) {
        Slot::InFlight { previous, .. } => previous,
        _ => None,
    };
    inner.slot = match result {
        Ok(value) => Slot::Ready(value.clone()),
        Err(error) if remember_failures => Slot::Failed(error.clone()),
        Err(_) => previous.map_or(Slot::Empty, Slot::Ready),
    };
    debug!(generation, state = ?inner.slot.state(), "single-flight settled");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::future::join_all;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum TestError {
        Fetch(String),
        Aborted(String),
    }

    impl From<FlightAborted> for TestError {
        fn from(err: FlightAborted) -> Self {
            Self::Aborted(err.reason().to_string())
        }
    }

    fn counting_fetch(
        counter: &Arc<AtomicUsize>,
        value: u32,
        delay: Duration,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, TestError>> {
        let counter = Arc::clone(counter);
        move || {
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                Ok(value)
            }
            .boxed()
        }
    }

    fn failing_fetch(
        counter: &Arc<AtomicUsize>,
        delay: Duration,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, TestError>> {
        let counter = Arc::clone(counter);
        move || {
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                Err(TestError::Fetch("denied".to_string()))
            }
            .boxed()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_fetch() {
        let cell = Arc::new(SingleFlight::<u32, TestError>::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let callers = (0..16).map(|_| {
            let cell = Arc::clone(&cell);
            let fetch = counting_fetch(&counter, 7, Duration::from_millis(50));
            tokio::spawn(async move { cell.get_or_fetch(|_| true, fetch).await })
        });

        let results = join_all(callers).await;
        for result in results {
            assert_eq!(result.unwrap(), Ok(7));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(cell.peek(), Some(7));
    }

    #[tokio::test]
    async fn fresh_value_is_reused_and_stale_value_is_refetched() {
        let cell = SingleFlight::<u32, TestError>::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let first = cell.get_or_fetch(|_| true, counting_fetch(&counter, 1, Duration::ZERO)).await;
        let reused = cell.get_or_fetch(|_| true, counting_fetch(&counter, 2, Duration::ZERO)).await;
        assert_eq!(first, Ok(1));
        assert_eq!(reused, Ok(1));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let refreshed =
            cell.get_or_fetch(|value| *value > 1, counting_fetch(&counter, 3, Duration::ZERO)).await;
        assert_eq!(refreshed, Ok(3));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn failure_reaches_every_waiter_and_is_forgotten() {
        let cell = Arc::new(SingleFlight::<u32, TestError>::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let callers = (0..8).map(|_| {
            let cell = Arc::clone(&cell);
            let fetch = failing_fetch(&counter, Duration::from_millis(50));
            tokio::spawn(async move { cell.get_or_fetch(|_| true, fetch).await })
        });

        for result in join_all(callers).await {
            assert_eq!(result.unwrap(), Err(TestError::Fetch("denied".to_string())));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        let retried = cell.get_or_fetch(|_| true, counting_fetch(&counter, 9, Duration::ZERO)).await;
        assert_eq!(retried, Ok(9));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn remembered_failure_is_returned_without_refetching() {
        let cell = SingleFlight::<u32, TestError>::remembering_failures();
        let counter = Arc::new(AtomicUsize::new(0));

        let first = cell.get_or_fetch(|_| true, failing_fetch(&counter, Duration::ZERO)).await;
        let second = cell.get_or_fetch(|_| true, counting_fetch(&counter, 1, Duration::ZERO)).await;

        assert_eq!(first, Err(TestError::Fetch("denied".to_string())));
        assert_eq!(second, first);
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        cell.reset();
        let after_reset =
            cell.get_or_fetch(|_| true, counting_fetch(&counter, 5, Duration::ZERO)).await;
        assert_eq!(after_reset, Ok(5));
    }

    #[tokio::test]
    async fn abandoned_waiter_does_not_cancel_the_flight() {
        let cell = SingleFlight::<u32, TestError>::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            cell.get_or_fetch(|_| true, counting_fetch(&counter, 11, Duration::from_millis(100))),
        )
        .await;
        assert!(abandoned.is_err(), "first caller should give up before the fetch completes");
        assert!(cell.is_in_flight());

        let joined = cell.get_or_fetch(|_| true, counting_fetch(&counter, 12, Duration::ZERO)).await;
        assert_eq!(joined, Ok(11));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_refresh_restores_previous_value() {
        let cell = SingleFlight::<u32, TestError>::new();
        let counter = Arc::new(AtomicUsize::new(0));
        cell.get_or_fetch(|_| true, counting_fetch(&counter, 3, Duration::ZERO)).await.unwrap();

        let refresh = cell.get_or_fetch(|_| false, failing_fetch(&counter, Duration::ZERO)).await;

        assert_eq!(refresh, Err(TestError::Fetch("denied".to_string())));
        assert_eq!(cell.peek(), Some(3));
        assert_eq!(cell.state(), FlightState::Ready);
    }

    #[tokio::test]
    async fn invalidate_if_only_drops_matching_value() {
        let cell = SingleFlight::<u32, TestError>::new();
        let counter = Arc::new(AtomicUsize::new(0));
        cell.get_or_fetch(|_| true, counting_fetch(&counter, 4, Duration::ZERO)).await.unwrap();

        assert!(!cell.invalidate_if(|value| *value == 5));
        assert_eq!(cell.peek(), Some(4));

        assert!(cell.invalidate_if(|value| *value == 4));
        assert_eq!(cell.peek(), None);
    }
}
