//! Jidoka (自働化) - Autonomous anomaly detection.
//!
//! The guard inspects every accepted integrator state and stops the line
//! when a value goes non-finite, instead of letting NaN propagate through
//! the remaining trajectory.
//!
//! # Severity Levels
//!
//! - **Acceptable**: Within tolerance, continue normally
//! - **Warning**: Bloch vector left the unit ball, log and continue
//! - **Fatal**: Non-finite component, halt immediately

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SimError, SimResult};

/// Severity levels for Jidoka violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Acceptable variance within tolerance (continue).
    Acceptable,
    /// Warning: soft constraint exceeded (log, continue).
    Warning,
    /// Fatal: unrecoverable state (halt immediately).
    Fatal,
}

/// Warning from a Jidoka check (non-fatal issue).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JidokaWarning {
    /// State norm exceeds the physical bound.
    NormExceeded {
        /// Simulation time of the offending state.
        time: f64,
        /// Observed Euclidean norm.
        norm: f64,
        /// Configured bound (including tolerance).
        bound: f64,
    },
}

/// Jidoka guard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JidokaConfig {
    /// NaN/Inf detection enabled.
    pub check_finite: bool,
    /// Upper bound on the state norm (1.0 for a Bloch vector).
    pub norm_bound: f64,
    /// Slack allowed above `norm_bound` before warning.
    pub norm_tolerance: f64,
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            check_finite: true,
            norm_bound: 1.0,
            norm_tolerance: 1e-6,
        }
    }
}

impl JidokaConfig {
    /// Classify a state norm against the configured bound.
    #[must_use]
    pub fn classify_norm(&self, norm: f64) -> ViolationSeverity {
        if !norm.is_finite() {
            ViolationSeverity::Fatal
        } else if norm > self.norm_bound + self.norm_tolerance {
            ViolationSeverity::Warning
        } else {
            ViolationSeverity::Acceptable
        }
    }
}

/// Jidoka guard for autonomous anomaly detection.
///
/// # Example
///
/// ```rust
/// use physdemo::engine::jidoka::{JidokaConfig, JidokaGuard};
///
/// let mut guard = JidokaGuard::new(JidokaConfig::default());
/// assert!(guard.check(0.0, &[0.0, 0.0, 1.0]).is_ok());
/// assert!(guard.check(0.1, &[f64::NAN, 0.0, 0.0]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct JidokaGuard {
    config: JidokaConfig,
    warnings: Vec<JidokaWarning>,
}

impl JidokaGuard {
    /// Create a new Jidoka guard with given configuration.
    #[must_use]
    pub const fn new(config: JidokaConfig) -> Self {
        Self {
            config,
            warnings: Vec::new(),
        }
    }

    /// Inspect one state (Jidoka inspection).
    ///
    /// # Errors
    ///
    /// Returns `NumericInstability` if any component is NaN or infinite.
    pub fn check(&mut self, time: f64, state: &[f64]) -> SimResult<()> {
        if self.config.check_finite {
            Self::check_finite(time, state)?;
        }

        let norm = state.iter().map(|v| v * v).sum::<f64>().sqrt();
        if self.config.classify_norm(norm) == ViolationSeverity::Warning {
            // Only the first excursion is logged; the rest are still recorded.
            if self.warnings.is_empty() {
                warn!(
                    time,
                    norm,
                    bound = self.config.norm_bound,
                    "state norm exceeds physical bound"
                );
            }
            self.warnings.push(JidokaWarning::NormExceeded {
                time,
                norm,
                bound: self.config.norm_bound + self.config.norm_tolerance,
            });
        }

        Ok(())
    }

    fn check_finite(time: f64, state: &[f64]) -> SimResult<()> {
        for (i, value) in state.iter().enumerate() {
            if !value.is_finite() {
                return Err(SimError::numeric_instability(
                    time,
                    format!("non-finite value {value} in state component s{}", i + 1),
                ));
            }
        }
        Ok(())
    }

    /// Warnings collected so far.
    #[must_use]
    pub fn warnings(&self) -> &[JidokaWarning] {
        &self.warnings
    }
}
