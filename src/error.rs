//! error.rs
//! Configuration errors reported by the validated construction path.
//!
//! Admission itself never fails; only building a limiter from a config can.

use thiserror::Error;

/// Error returned when a limiter configuration is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Rate is zero, negative or not a finite number.
    #[error("rate must be a positive finite number, got {rate}")]
    NonPositiveRate { rate: f64 },

    /// Capacity is zero, negative or not a finite number.
    #[error("capacity must be a positive finite number, got {capacity}")]
    NonPositiveCapacity { capacity: f64 },

    /// Window interval is zero.
    #[error("interval must be greater than 0 ms")]
    ZeroInterval,
}

/// Result type for validated limiter construction.
pub type ConfigResult<T> = Result<T, ConfigError>;
