use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::interval_to_millis;
use crate::error::{ConfigError, ConfigResult};
use crate::rate_limiter_core::RateLimiterCore;
use crate::time_source::{SystemTimeSource, TimeSource};

/// Core implementation of the fixed window counter rate limiting algorithm.
///
/// The fixed window counter counts admissions inside a window of `interval`
/// length. Once a call observes that the window has elapsed, the counter is
/// reset and the window restarts at that call's instant. Empty intervals are
/// skipped in one step rather than caught up one by one.
///
/// # Boundary bursts
///
/// A full burst of `rate` admissions at the end of one window followed by
/// another full burst at the start of the next admits `2 * rate` requests in
/// a span shorter than `interval`. This is inherent to the algorithm.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use rate_guard::cores::FixedWindowCounterCore;
/// use rate_guard::time_source::MockTimeSource;
///
/// let clock = MockTimeSource::new();
/// let counter = FixedWindowCounterCore::new(2, Duration::from_secs(1), clock.clone());
///
/// assert!(counter.allow());
/// assert!(counter.allow());
/// assert!(!counter.allow());
///
/// clock.advance(Duration::from_secs(1));
/// assert!(counter.allow());
/// ```
pub struct FixedWindowCounterCore<T: TimeSource = SystemTimeSource> {
    /// Maximum number of admissions per window
    rate: u64,
    /// Length of each window
    interval: Duration,
    /// Source of the current instant
    time_source: T,
    /// Internal state protected by mutex for thread safety
    state: Mutex<FixedWindowCounterCoreState>,
}

/// Internal state of the fixed window counter
struct FixedWindowCounterCoreState {
    /// Admissions granted in the active window
    count: u64,
    /// Instant the active window started
    window_start: Instant,
}

impl<T: TimeSource> RateLimiterCore for FixedWindowCounterCore<T> {
    #[inline]
    fn allow(&self) -> bool {
        FixedWindowCounterCore::allow(self)
    }
}

impl<T: TimeSource> FixedWindowCounterCore<T> {
    /// Creates a new fixed window counter.
    ///
    /// The first window starts at the time source's current instant.
    ///
    /// # Parameters
    ///
    /// * `rate` - Maximum number of admissions per window
    /// * `interval` - Length of each window
    /// * `time_source` - Supplier of the current instant
    ///
    /// # Preconditions
    ///
    /// Parameters are not validated. A zero `rate` denies everything, and a
    /// zero `interval` resets the window on every call. Use
    /// [`FixedWindowCounterCoreConfig::build`] for validated construction.
    pub fn new(rate: u64, interval: Duration, time_source: T) -> Self {
        let window_start = time_source.now();
        debug!(rate, interval_ms = interval.as_millis() as u64, "fixed window counter created");

        FixedWindowCounterCore {
            rate,
            interval,
            time_source,
            state: Mutex::new(FixedWindowCounterCoreState {
                count: 0,
                window_start,
            }),
        }
    }

    /// Decides admission for one request at the current instant.
    ///
    /// Resets the counter if the active window has elapsed, then admits the
    /// request if fewer than `rate` requests were admitted in this window.
    pub fn allow(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.time_source.now();

        // Snap straight to `now`, however many windows were skipped
        if now.saturating_duration_since(state.window_start) >= self.interval {
            debug!(previous_count = state.count, "fixed window elapsed, resetting counter");
            state.count = 0;
            state.window_start = now;
        }

        let allowed = state.count < self.rate;
        if allowed {
            state.count += 1;
        }

        trace!(allowed, count = state.count, rate = self.rate, "fixed window decision");
        allowed
    }

    /// Maximum number of admissions per window.
    pub fn rate(&self) -> u64 {
        self.rate
    }

    /// Length of each window.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Configuration structure for creating a [`FixedWindowCounterCore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedWindowCounterCoreConfig {
    /// Maximum number of admissions per window.
    pub rate: u64,
    /// Window length in milliseconds.
    pub interval_ms: u64,
}

impl FixedWindowCounterCoreConfig {
    /// Creates a new configuration instance.
    ///
    /// Intervals are stored with millisecond resolution. A sub-millisecond
    /// remainder is rounded up, so only [`Duration::ZERO`] yields a zero
    /// `interval_ms`.
    pub fn new(rate: u64, interval: Duration) -> Self {
        Self {
            rate,
            interval_ms: interval_to_millis(interval),
        }
    }

    /// Window length as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Rejects a zero rate or a zero interval.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rate == 0 {
            return Err(ConfigError::NonPositiveRate { rate: 0.0 });
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    /// Validates the configuration and builds a limiter on `time_source`.
    pub fn build<T: TimeSource>(&self, time_source: T) -> ConfigResult<FixedWindowCounterCore<T>> {
        self.validate().inspect_err(|err| {
            warn!(%err, "rejected fixed window counter config");
        })?;
        Ok(FixedWindowCounterCore::new(self.rate, self.interval(), time_source))
    }
}
