//! Shared simulation machinery.
//!
//! - Deterministic RNG (PCG with partitioned seeds)
//! - Jidoka guards for stop-on-error

pub mod jidoka;
pub mod rng;

pub use jidoka::{JidokaConfig, JidokaGuard, JidokaWarning};
pub use rng::SimRng;
