use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::rate_limiter_core::RateLimiterCore;
use crate::time_source::{SystemTimeSource, TimeSource};

/// Core implementation of the leaky bucket rate limiting algorithm.
///
/// The bucket holds "water" representing outstanding work. Every admitted
/// request pours one unit in, and water drains continuously at `rate` units
/// per second. A request is admitted while the level is below `capacity`.
///
/// # Algorithm Behavior
///
/// - The bucket starts empty.
/// - Leakage is proportional to elapsed wall time, so the decisions do not
///   depend on how often the bucket is polled.
/// - The leak is applied on every call, including calls that end up denied.
/// - The capacity check happens before pouring, so a partially drained
///   bucket may end up to one unit above `capacity`; the next call is then
///   denied until the level drains back below it.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use rate_guard::cores::LeakyBucketCore;
/// use rate_guard::time_source::MockTimeSource;
///
/// let clock = MockTimeSource::new();
/// // Holds 3 units, drains 1 unit per second
/// let bucket = LeakyBucketCore::new(1.0, 3.0, clock.clone());
///
/// for _ in 0..3 {
///     assert!(bucket.allow());
/// }
/// assert!(!bucket.allow());
///
/// clock.advance(Duration::from_secs(1));
/// assert!(bucket.allow());
/// assert!(!bucket.allow());
/// ```
pub struct LeakyBucketCore<T: TimeSource = SystemTimeSource> {
    /// Units drained per second.
    rate: f64,
    /// Maximum water level.
    capacity: f64,
    /// Source of the current instant.
    time_source: T,
    /// Internal state protected by mutex for thread safety.
    state: Mutex<LeakyBucketCoreState>,
}

/// Internal state of the leaky bucket.
struct LeakyBucketCoreState {
    /// Current water level.
    water: f64,
    /// Instant the last leak was applied.
    last_leak: Instant,
}

impl<T: TimeSource> RateLimiterCore for LeakyBucketCore<T> {
    #[inline]
    fn allow(&self) -> bool {
        LeakyBucketCore::allow(self)
    }
}

impl<T: TimeSource> LeakyBucketCore<T> {
    /// Creates a new, empty leaky bucket.
    ///
    /// # Parameters
    ///
    /// * `rate` - Units drained per second.
    /// * `capacity` - Maximum water level.
    /// * `time_source` - Supplier of the current instant.
    ///
    /// # Preconditions
    ///
    /// Parameters are not validated. A non-positive `capacity` denies every
    /// request and a zero `rate` never drains. Use
    /// [`LeakyBucketCoreConfig::build`] for validated construction.
    pub fn new(rate: f64, capacity: f64, time_source: T) -> Self {
        let last_leak = time_source.now();
        debug!(rate, capacity, "leaky bucket created");

        LeakyBucketCore {
            rate,
            capacity,
            time_source,
            state: Mutex::new(LeakyBucketCoreState {
                water: 0.0,
                last_leak,
            }),
        }
    }

    /// Decides admission for one request at the current instant.
    ///
    /// Drains the water leaked since the previous call, then pours in one
    /// unit if the level is still below capacity.
    pub fn allow(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.time_source.now();

        let elapsed = now.saturating_duration_since(state.last_leak);
        let leaked = elapsed.as_secs_f64() * self.rate;

        // Leak accounting runs even if this request is denied
        state.water = (state.water - leaked).max(0.0);
        state.last_leak = now;

        let allowed = state.water < self.capacity;
        if allowed {
            state.water += 1.0;
        }

        trace!(allowed, water = state.water, capacity = self.capacity, "leaky bucket decision");
        allowed
    }

    /// Units drained per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Maximum water level.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }
}

/// Configuration structure for creating a [`LeakyBucketCore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakyBucketCoreConfig {
    /// Units drained per second.
    pub rate: f64,
    /// Maximum water level.
    pub capacity: f64,
}

impl LeakyBucketCoreConfig {
    /// Creates a new configuration instance.
    pub fn new(rate: f64, capacity: f64) -> Self {
        Self { rate, capacity }
    }

    /// Rejects non-positive or non-finite rate and capacity.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.rate.is_finite() && self.rate > 0.0) {
            return Err(ConfigError::NonPositiveRate { rate: self.rate });
        }
        if !(self.capacity.is_finite() && self.capacity > 0.0) {
            return Err(ConfigError::NonPositiveCapacity { capacity: self.capacity });
        }
        Ok(())
    }

    /// Validates the configuration and builds a limiter on `time_source`.
    pub fn build<T: TimeSource>(&self, time_source: T) -> ConfigResult<LeakyBucketCore<T>> {
        self.validate().inspect_err(|err| {
            warn!(%err, "rejected leaky bucket config");
        })?;
        Ok(LeakyBucketCore::new(self.rate, self.capacity, time_source))
    }
}
