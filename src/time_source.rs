//! Time sources consumed by every rate limiter core.
//!
//! Limiters never read the system clock directly. They ask an injected
//! [`TimeSource`] for the current instant, which lets tests drive time
//! forward deterministically with [`MockTimeSource`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Supplier of the current instant.
///
/// Implementations should return monotonically non-decreasing values. The
/// cores tolerate a source that steps backwards (elapsed time saturates to
/// zero) but their throughput guarantees only hold for monotonic sources.
pub trait TimeSource: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    #[inline]
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Real monotonic clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Deterministic clock that only moves when told to.
///
/// Clones share the same underlying instant, so a test can keep one handle
/// and pass a clone into a limiter:
///
/// ```rust
/// use std::time::Duration;
/// use rate_guard::time_source::{MockTimeSource, TimeSource};
///
/// let clock = MockTimeSource::new();
/// let shared = clock.clone();
/// let start = shared.now();
///
/// clock.advance(Duration::from_secs(2));
/// assert_eq!(shared.now() - start, Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct MockTimeSource {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug)]
struct MockState {
    origin: Instant,
    offset: Duration,
}

impl MockTimeSource {
    /// Creates a mock clock frozen at the current real instant.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a mock clock frozen at `origin`.
    pub fn starting_at(origin: Instant) -> Self {
        MockTimeSource {
            inner: Arc::new(Mutex::new(MockState {
                origin,
                offset: Duration::ZERO,
            })),
        }
    }

    /// Moves the reported instant forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.offset = state.offset.saturating_add(by);
    }

    /// Total time advanced since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .offset
    }
}

impl Default for MockTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Instant {
        let state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.origin + state.offset
    }
}
