//! Clock-driven rate limiting primitives for Rust applications.
//!
//! This library provides four interchangeable rate limiting algorithms. Each
//! one guards a single logical resource and decides, call by call, whether
//! the next unit of work is admitted. All implementations are thread-safe
//! and read time from an injected [`TimeSource`], which makes their
//! behaviour deterministic under test.
//!
//! # Quick Start
//!
//! ```rust
//! use rate_guard::cores::TokenBucketCore;
//! use rate_guard::time_source::SystemTimeSource;
//!
//! // 10 tokens per second, bursts of up to 100
//! let limiter = TokenBucketCore::new(10.0, 100.0, SystemTimeSource);
//!
//! if limiter.allow() {
//!     println!("Request allowed");
//! } else {
//!     println!("Request throttled");
//! }
//! ```
//!
//! # Available Rate Limiting Algorithms
//!
//! ## [Fixed Window Counter](cores::FixedWindowCounterCore)
//! Simple time-window based counting:
//! ```rust
//! # use std::time::Duration;
//! # use rate_guard::cores::FixedWindowCounterCore;
//! # use rate_guard::time_source::SystemTimeSource;
//! let limiter = FixedWindowCounterCore::new(100, Duration::from_secs(60), SystemTimeSource);
//! ```
//!
//! ## [Sliding Window Counter](cores::SlidingWindowCounterCore)
//! Two-window weighted approximation of a sliding window:
//! ```rust
//! # use std::time::Duration;
//! # use rate_guard::cores::SlidingWindowCounterCore;
//! # use rate_guard::time_source::SystemTimeSource;
//! let limiter = SlidingWindowCounterCore::new(100.0, Duration::from_secs(60), SystemTimeSource);
//! ```
//!
//! ## [Leaky Bucket](cores::LeakyBucketCore)
//! Water drains at a constant rate, smoothing traffic:
//! ```rust
//! # use rate_guard::cores::LeakyBucketCore;
//! # use rate_guard::time_source::SystemTimeSource;
//! let limiter = LeakyBucketCore::new(5.0, 100.0, SystemTimeSource); // drain 5 units/s
//! ```
//!
//! ## [Token Bucket](cores::TokenBucketCore)
//! Allows bursts up to capacity while maintaining average rate:
//! ```rust
//! # use rate_guard::cores::TokenBucketCore;
//! # use rate_guard::time_source::SystemTimeSource;
//! let limiter = TokenBucketCore::new(5.0, 100.0, SystemTimeSource); // add 5 tokens/s
//! ```
//!
//! # Core Concepts
//!
//! ## Time Representation
//! Every core asks its [`TimeSource`] for the current [`Instant`](std::time::Instant).
//! Use [`SystemTimeSource`] in production and [`MockTimeSource`] in tests to
//! advance time without sleeping.
//!
//! ## Admission
//! [`RateLimiterCore::allow`] never fails and never blocks on I/O: it
//! returns `true` and records one unit of consumption, or returns `false`.
//!
//! ## Construction
//! The `new` constructors take parameters as-is. The `*Config` types and
//! [`LimiterConfig`] validate them first and report a [`ConfigError`].
//!
//! # Algorithm Selection Guide
//!
//! - **Simple implementation**: Use [`FixedWindowCounterCore`](cores::FixedWindowCounterCore)
//! - **No boundary doubling**: Use [`SlidingWindowCounterCore`](cores::SlidingWindowCounterCore)
//! - **Strict constant rate**: Use [`LeakyBucketCore`](cores::LeakyBucketCore)
//! - **Allow controlled bursts**: Use [`TokenBucketCore`](cores::TokenBucketCore)

pub mod config;
pub mod cores;
pub mod error;
pub mod rate_limiter_core;
pub mod time_source;

pub use config::LimiterConfig;
pub use error::{ConfigError, ConfigResult};
pub use rate_limiter_core::RateLimiterCore;
pub use time_source::{MockTimeSource, SystemTimeSource, TimeSource};
