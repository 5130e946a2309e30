use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::interval_to_millis;
use crate::error::{ConfigError, ConfigResult};
use crate::rate_limiter_core::RateLimiterCore;
use crate::time_source::{SystemTimeSource, TimeSource};

/// How the finished window's count is carried into the previous-window slot
/// when the sliding window folds forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowCarry {
    /// `previous = current`. Counts from windows older than the one just
    /// finished are dropped.
    #[default]
    Replace,
    /// `previous += current`. Counts keep merging across folds, so after a
    /// long idle gap the previous window may weigh more than one window of
    /// traffic. Matches the behaviour of earlier releases.
    Accumulate,
}

/// Core implementation of the sliding window counter rate limiting algorithm.
///
/// Approximates a true sliding log with two counters: admissions in the
/// current window and admissions carried over from the previous one. The
/// previous count is weighted by how much of the current window is still
/// ahead, so its contribution decays linearly as the window progresses:
///
/// ```text
/// weighted = previous * (1 - elapsed / interval) + current
/// ```
///
/// A request is admitted while `weighted < rate`. Unlike the fixed window,
/// this keeps throughput close to `rate` per `interval` across boundaries.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use rate_guard::cores::SlidingWindowCounterCore;
/// use rate_guard::time_source::MockTimeSource;
///
/// let clock = MockTimeSource::new();
/// let counter = SlidingWindowCounterCore::new(4.0, Duration::from_secs(10), clock.clone());
///
/// for _ in 0..4 {
///     assert!(counter.allow());
/// }
/// assert!(!counter.allow());
///
/// // Fold at 10s, then half the previous window has decayed by 15s
/// clock.advance(Duration::from_secs(10));
/// assert!(!counter.allow());
/// clock.advance(Duration::from_secs(5));
/// assert!(counter.allow());
/// ```
pub struct SlidingWindowCounterCore<T: TimeSource = SystemTimeSource> {
    /// Maximum weighted admissions per interval
    rate: f64,
    /// Length of each window
    interval: Duration,
    /// Fold policy for the previous-window count
    carry: WindowCarry,
    /// Source of the current instant
    time_source: T,
    /// Internal state protected by mutex for thread safety
    state: Mutex<SlidingWindowCounterCoreState>,
}

/// Internal state of the sliding window counter
struct SlidingWindowCounterCoreState {
    /// Admissions granted in the active window
    current_count: u64,
    /// Admissions carried over from earlier windows
    previous_count: u64,
    /// Instant the active window started
    window_start: Instant,
}

impl<T: TimeSource> RateLimiterCore for SlidingWindowCounterCore<T> {
    #[inline]
    fn allow(&self) -> bool {
        SlidingWindowCounterCore::allow(self)
    }
}

impl<T: TimeSource> SlidingWindowCounterCore<T> {
    /// Creates a new sliding window counter using [`WindowCarry::Replace`].
    ///
    /// # Parameters
    ///
    /// * `rate` - Maximum weighted admissions per interval
    /// * `interval` - Length of each window
    /// * `time_source` - Supplier of the current instant
    ///
    /// # Preconditions
    ///
    /// Parameters are not validated. A zero `interval` folds on every call
    /// and the weighted count collapses to zero, so every call is admitted. Use
    /// [`SlidingWindowCounterCoreConfig::build`] for validated construction.
    pub fn new(rate: f64, interval: Duration, time_source: T) -> Self {
        Self::with_carry(rate, interval, WindowCarry::default(), time_source)
    }

    /// Creates a new sliding window counter with an explicit fold policy.
    pub fn with_carry(rate: f64, interval: Duration, carry: WindowCarry, time_source: T) -> Self {
        let window_start = time_source.now();
        debug!(rate, interval_ms = interval.as_millis() as u64, ?carry, "sliding window counter created");

        SlidingWindowCounterCore {
            rate,
            interval,
            carry,
            time_source,
            state: Mutex::new(SlidingWindowCounterCoreState {
                current_count: 0,
                previous_count: 0,
                window_start,
            }),
        }
    }

    /// Decides admission for one request at the current instant.
    ///
    /// Folds the windows forward if the active one has elapsed, then admits
    /// the request if the weighted count is still below `rate`.
    pub fn allow(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.time_source.now();

        if now.saturating_duration_since(state.window_start) >= self.interval {
            state.previous_count = match self.carry {
                WindowCarry::Replace => state.current_count,
                WindowCarry::Accumulate => state.previous_count.saturating_add(state.current_count),
            };
            state.current_count = 0;
            state.window_start = now;
            debug!(previous_count = state.previous_count, carry = ?self.carry, "sliding window folded");
        }

        // Position inside the (possibly just restarted) window
        let elapsed = now.saturating_duration_since(state.window_start);
        let elapsed_fraction = elapsed.as_secs_f64() / self.interval.as_secs_f64();
        let weighted = (state.previous_count as f64 * (1.0 - elapsed_fraction)
            + state.current_count as f64)
            .max(0.0);

        let allowed = weighted < self.rate;
        if allowed {
            state.current_count += 1;
        }

        trace!(
            allowed,
            weighted,
            current_count = state.current_count,
            previous_count = state.previous_count,
            rate = self.rate,
            "sliding window decision"
        );
        allowed
    }

    /// Maximum weighted admissions per interval.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Length of each window.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Fold policy in use.
    pub fn carry(&self) -> WindowCarry {
        self.carry
    }
}

/// Configuration structure for creating a [`SlidingWindowCounterCore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlidingWindowCounterCoreConfig {
    /// Maximum weighted admissions per interval.
    pub rate: f64,
    /// Window length in milliseconds.
    pub interval_ms: u64,
    /// Fold policy, `replace` when omitted.
    #[serde(default)]
    pub carry: WindowCarry,
}

impl SlidingWindowCounterCoreConfig {
    /// Creates a new configuration instance with the default fold policy.
    ///
    /// Intervals are stored with millisecond resolution. A sub-millisecond
    /// remainder is rounded up, so only [`Duration::ZERO`] yields a zero
    /// `interval_ms`.
    pub fn new(rate: f64, interval: Duration) -> Self {
        Self {
            rate,
            interval_ms: interval_to_millis(interval),
            carry: WindowCarry::default(),
        }
    }

    /// Window length as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Rejects a non-positive or non-finite rate and a zero interval.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.rate.is_finite() && self.rate > 0.0) {
            return Err(ConfigError::NonPositiveRate { rate: self.rate });
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    /// Validates the configuration and builds a limiter on `time_source`.
    pub fn build<T: TimeSource>(&self, time_source: T) -> ConfigResult<SlidingWindowCounterCore<T>> {
        self.validate().inspect_err(|err| {
            warn!(%err, "rejected sliding window counter config");
        })?;
        Ok(SlidingWindowCounterCore::with_carry(
            self.rate,
            self.interval(),
            self.carry,
            time_source,
        ))
    }
}
