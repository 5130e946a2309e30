//! Core trait for rate limiter algorithms.
//!
//! This module defines the single admission operation shared by every rate
//! limiter core, so callers can swap the fixed window, sliding window, leaky
//! bucket and token bucket algorithms without code changes.

use std::sync::Arc;

/// The core trait for all rate limiter algorithms.
///
/// Every implementor guards its own state with an internal lock held for the
/// whole call, so one instance can be shared between threads through an
/// [`Arc`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use rate_guard::rate_limiter_core::RateLimiterCore;
/// use rate_guard::cores::{FixedWindowCounterCore, TokenBucketCore};
/// use rate_guard::time_source::MockTimeSource;
///
/// let clock = MockTimeSource::new();
/// let limiters: Vec<Arc<dyn RateLimiterCore>> = vec![
///     Arc::new(FixedWindowCounterCore::new(2, Duration::from_secs(1), clock.clone())),
///     Arc::new(TokenBucketCore::new(1.0, 2.0, clock.clone())),
/// ];
///
/// for limiter in &limiters {
///     assert!(limiter.allow());
///     assert!(limiter.allow());
///     assert!(!limiter.allow());
/// }
/// ```
pub trait RateLimiterCore: Send + Sync {
    /// Decides admission for one unit of work at the current instant.
    ///
    /// Returns `true` and records the consumption of one unit if capacity is
    /// available. Returns `false` otherwise, leaving the state untouched apart
    /// from the time bookkeeping the algorithm performs on every call.
    fn allow(&self) -> bool;
}

impl<L: RateLimiterCore + ?Sized> RateLimiterCore for Box<L> {
    #[inline]
    fn allow(&self) -> bool {
        (**self).allow()
    }
}

impl<L: RateLimiterCore + ?Sized> RateLimiterCore for Arc<L> {
    #[inline]
    fn allow(&self) -> bool {
        (**self).allow()
    }
}
