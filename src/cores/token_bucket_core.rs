use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::rate_limiter_core::RateLimiterCore;
use crate::time_source::{SystemTimeSource, TimeSource};

/// Core implementation of the token bucket rate limiting algorithm.
///
/// The token bucket is refilled continuously at `rate` tokens per second, up
/// to `capacity`. Each admitted request consumes one token. This allows
/// bursts up to the bucket capacity while keeping the long-run average at
/// the refill rate.
///
/// # Algorithm Behavior
///
/// - The bucket starts full with `capacity` tokens
/// - Refill is proportional to elapsed wall time, fractional tokens included
/// - The refill is applied on every call, including calls that end up denied
/// - A request is admitted when at least one whole token is available
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use rate_guard::cores::TokenBucketCore;
/// use rate_guard::time_source::MockTimeSource;
///
/// let clock = MockTimeSource::new();
/// // 1 token per second, bursts of up to 5
/// let bucket = TokenBucketCore::new(1.0, 5.0, clock.clone());
///
/// for _ in 0..5 {
///     assert!(bucket.allow());
/// }
/// assert!(!bucket.allow());
///
/// clock.advance(Duration::from_secs(2));
/// assert!(bucket.allow());
/// assert!(bucket.allow());
/// assert!(!bucket.allow());
/// ```
pub struct TokenBucketCore<T: TimeSource = SystemTimeSource> {
    /// Tokens added per second
    rate: f64,
    /// Maximum number of tokens the bucket can hold
    capacity: f64,
    /// Source of the current instant
    time_source: T,
    /// Internal state protected by mutex for thread safety
    state: Mutex<TokenBucketCoreState>,
}

/// Internal state of the token bucket
struct TokenBucketCoreState {
    /// Tokens currently available
    tokens: f64,
    /// Instant the last refill was applied
    last_refill: Instant,
}

impl<T: TimeSource> RateLimiterCore for TokenBucketCore<T> {
    #[inline]
    fn allow(&self) -> bool {
        TokenBucketCore::allow(self)
    }
}

impl<T: TimeSource> TokenBucketCore<T> {
    /// Creates a new, full token bucket.
    ///
    /// # Parameters
    ///
    /// * `rate` - Tokens added per second
    /// * `capacity` - Maximum number of tokens the bucket can hold
    /// * `time_source` - Supplier of the current instant
    ///
    /// # Preconditions
    ///
    /// Parameters are not validated. A `capacity` below one denies every
    /// request and a zero `rate` never refills. Use
    /// [`TokenBucketCoreConfig::build`] for validated construction.
    pub fn new(rate: f64, capacity: f64, time_source: T) -> Self {
        let last_refill = time_source.now();
        debug!(rate, capacity, "token bucket created");

        TokenBucketCore {
            rate,
            capacity,
            time_source,
            state: Mutex::new(TokenBucketCoreState {
                tokens: capacity, // Bucket starts full
                last_refill,
            }),
        }
    }

    /// Decides admission for one request at the current instant.
    ///
    /// Adds the tokens refilled since the previous call, capped at capacity,
    /// then consumes one token if a whole token is available.
    pub fn allow(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = self.time_source.now();

        let elapsed = now.saturating_duration_since(state.last_refill);
        let refilled = elapsed.as_secs_f64() * self.rate;

        state.tokens = (state.tokens + refilled).min(self.capacity);
        state.last_refill = now;

        let allowed = state.tokens >= 1.0;
        if allowed {
            state.tokens -= 1.0;
        }

        trace!(allowed, tokens = state.tokens, capacity = self.capacity, "token bucket decision");
        allowed
    }

    /// Tokens added per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Maximum number of tokens the bucket can hold.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }
}

/// Configuration structure for creating a [`TokenBucketCore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBucketCoreConfig {
    /// Tokens added per second.
    pub rate: f64,
    /// Maximum number of tokens the bucket can hold.
    pub capacity: f64,
}

impl TokenBucketCoreConfig {
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
    ///
    /// # Example
    ///
    /// ```rust
    /// use rate_guard::cores::TokenBucketCoreConfig;
    /// use rate_guard::time_source::SystemTimeSource;
    ///
    /// let limiter = TokenBucketCoreConfig::new(10.0, 20.0)
    ///     .build(SystemTimeSource)
    ///     .expect("valid config");
    /// assert!(limiter.allow());
    /// ```
    pub fn build<T: TimeSource>(&self, time_source: T) -> ConfigResult<TokenBucketCore<T>> {
        self.validate().inspect_err(|err| {
            warn!(%err, "rejected token bucket config");
        })?;
        Ok(TokenBucketCore::new(self.rate, self.capacity, time_source))
    }
}
