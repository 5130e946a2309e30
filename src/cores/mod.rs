//! Core rate limiting algorithm implementations.
//!
//! Each core is a thread-safe, single-resource limiter that reads the current
//! instant from an injected [`TimeSource`](crate::time_source::TimeSource)
//! and exposes one admission operation, `allow`.
//!
//! # Available Algorithms
//!
//! - **[`FixedWindowCounterCore`]** - Counts admissions per window, resets when a window elapses
//! - **[`SlidingWindowCounterCore`]** - Weighted two-window approximation of a sliding log
//! - **[`LeakyBucketCore`]** - Continuous drain, smooths traffic to a constant rate
//! - **[`TokenBucketCore`]** - Continuous refill, allows bursts up to capacity
//!
//! # Algorithm Comparison
//!
//! | Algorithm | State | Boundary behaviour | Burst Handling |
//! |-----------|-------|--------------------|----------------|
//! | Fixed Window | count + window start | up to 2×rate across a boundary | Boundary bursts |
//! | Sliding Window | two counts + window start | about rate per interval | Smooth |
//! | Leaky Bucket | level + last leak | none | Up to capacity, then constant rate |
//! | Token Bucket | tokens + last refill | none | Up to capacity after idle |
//!
//! # Thread Safety
//!
//! All cores keep their state behind an internal mutex held for the whole
//! `allow` call, so each decision is atomic with respect to other callers
//! on the same instance.

pub mod fixed_window_counter_core;
pub use fixed_window_counter_core::FixedWindowCounterCore;
pub use fixed_window_counter_core::FixedWindowCounterCoreConfig;

pub mod sliding_window_counter_core;
pub use sliding_window_counter_core::SlidingWindowCounterCore;
pub use sliding_window_counter_core::SlidingWindowCounterCoreConfig;
pub use sliding_window_counter_core::WindowCarry;

pub mod leaky_bucket_core;
pub use leaky_bucket_core::LeakyBucketCore;
pub use leaky_bucket_core::LeakyBucketCoreConfig;

pub mod token_bucket_core;
pub use token_bucket_core::TokenBucketCore;
pub use token_bucket_core::TokenBucketCoreConfig;

use std::time::Duration;

/// Converts an interval to whole milliseconds for the window configs,
/// rounding any sub-millisecond remainder up so a non-zero interval never
/// becomes zero.
pub(crate) fn interval_to_millis(interval: Duration) -> u64 {
    let millis = interval.as_nanos().div_ceil(1_000_000);
    u64::try_from(millis).unwrap_or(u64::MAX)
}
