//! Error types for physdemo.
//!
//! Every fallible operation returns `Result<T, SimError>` instead of
//! panicking. Errors are local to the call that raised them.

use thiserror::Error;

/// Result type alias for physdemo operations.
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for all physdemo operations.
#[derive(Debug, Error)]
pub enum SimError {
    // ===== Domain Errors =====
    /// Input outside the algorithm's domain (non-positive counts,
    /// non-finite parameters, non-positive horizon, ...).
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument {
        /// Name of the offending argument.
        argument: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The ODE solver could not produce a trustworthy solution.
    #[error("Numeric instability at t={time:.6e}: {reason}")]
    NumericInstability {
        /// Simulation time at which the solver gave up.
        time: f64,
        /// What went wrong.
        reason: String,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SimError {
    /// Create an invalid-argument error.
    #[must_use]
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Create a numeric-instability error.
    #[must_use]
    pub fn numeric_instability(time: f64, reason: impl Into<String>) -> Self {
        Self::NumericInstability {
            time,
            reason: reason.into(),
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create an I/O error with a message (wraps in `std::io::Error`).
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(std::io::Error::other(message.into()))
    }

    /// Check if this error was raised by the numerics rather than by the caller's input.
    #[must_use]
    pub const fn is_numeric_failure(&self) -> bool {
        matches!(self, Self::NumericInstability { .. })
    }

    /// Reject a non-finite value for the named argument.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `value` is NaN or infinite.
    pub fn require_finite(argument: &str, value: f64) -> SimResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::invalid_argument(
                argument,
                format!("must be finite, got {value}"),
            ))
        }
    }
}
