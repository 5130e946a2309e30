//! Algorithm-agnostic limiter configuration.
//!
//! [`LimiterConfig`] selects one of the four cores by name and carries its
//! parameters, so the algorithm can be swapped in configuration without code
//! changes. Reading the configuration from a file is left to the caller;
//! any serde format works.
//!
//! ```rust
//! use rate_guard::config::LimiterConfig;
//! use rate_guard::rate_limiter_core::RateLimiterCore;
//! use rate_guard::time_source::SystemTimeSource;
//!
//! let config: LimiterConfig = serde_json::from_str(
//!     r#"{ "algorithm": "token_bucket", "rate": 5.0, "capacity": 10.0 }"#,
//! ).unwrap();
//!
//! let limiter = config.build(SystemTimeSource).unwrap();
//! assert!(limiter.allow());
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cores::{
    FixedWindowCounterCoreConfig, LeakyBucketCoreConfig, SlidingWindowCounterCoreConfig,
    TokenBucketCoreConfig,
};
use crate::error::ConfigResult;
use crate::rate_limiter_core::RateLimiterCore;
use crate::time_source::TimeSource;

/// Configuration for any of the four limiter cores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum LimiterConfig {
    FixedWindow(FixedWindowCounterCoreConfig),
    SlidingWindow(SlidingWindowCounterCoreConfig),
    LeakyBucket(LeakyBucketCoreConfig),
    TokenBucket(TokenBucketCoreConfig),
}

impl LimiterConfig {
    /// Name of the selected algorithm, as written in configuration.
    pub fn algorithm(&self) -> &'static str {
        match self {
            LimiterConfig::FixedWindow(_) => "fixed_window",
            LimiterConfig::SlidingWindow(_) => "sliding_window",
            LimiterConfig::LeakyBucket(_) => "leaky_bucket",
            LimiterConfig::TokenBucket(_) => "token_bucket",
        }
    }

    /// Validates the parameters of the selected algorithm.
    pub fn validate(&self) -> ConfigResult<()> {
        match self {
            LimiterConfig::FixedWindow(config) => config.validate(),
            LimiterConfig::SlidingWindow(config) => config.validate(),
            LimiterConfig::LeakyBucket(config) => config.validate(),
            LimiterConfig::TokenBucket(config) => config.validate(),
        }
    }

    /// Validates the configuration and builds the selected limiter.
    pub fn build<T>(&self, time_source: T) -> ConfigResult<Box<dyn RateLimiterCore>>
    where
        T: TimeSource + 'static,
    {
        let limiter: Box<dyn RateLimiterCore> = match self {
            LimiterConfig::FixedWindow(config) => Box::new(config.build(time_source)?),
            LimiterConfig::SlidingWindow(config) => Box::new(config.build(time_source)?),
            LimiterConfig::LeakyBucket(config) => Box::new(config.build(time_source)?),
            LimiterConfig::TokenBucket(config) => Box::new(config.build(time_source)?),
        };
        debug!(algorithm = self.algorithm(), "limiter built from config");
        Ok(limiter)
    }
}

impl From<FixedWindowCounterCoreConfig> for LimiterConfig {
    fn from(config: FixedWindowCounterCoreConfig) -> Self {
        LimiterConfig::FixedWindow(config)
    }
}

impl From<SlidingWindowCounterCoreConfig> for LimiterConfig {
    fn from(config: SlidingWindowCounterCoreConfig) -> Self {
        LimiterConfig::SlidingWindow(config)
    }
}

impl From<LeakyBucketCoreConfig> for LimiterConfig {
    fn from(config: LeakyBucketCoreConfig) -> Self {
        LimiterConfig::LeakyBucket(config)
    }
}

impl From<TokenBucketCoreConfig> for LimiterConfig {
    fn from(config: TokenBucketCoreConfig) -> Self {
        LimiterConfig::TokenBucket(config)
    }
}
