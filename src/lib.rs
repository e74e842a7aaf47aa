//! # physdemo
//!
//! Two small, reproducible numerical demonstrations:
//! - Monte Carlo estimation of π by uniform sampling of `[-1, 1]²`
//! - Integration of the optical Bloch equations for a driven, damped
//!   two-level system
//!
//! Results are turned into platform-agnostic render frames and written as a
//! single CSV or JSON Lines artifact per run.
//!
//! ## Example
//!
//! ```rust
//! use physdemo::prelude::*;
//!
//! let mut rng = SimRng::new(42);
//! let samples = estimate_pi(10_000, &mut rng).unwrap();
//! assert_eq!(samples.len(), 10_000);
//!
//! let params = SimulationParameters::radiative(2.0, 0.0, 0.3);
//! let traj = integrate_obe(BlochVector::EXCITED, &params, 10.0, 100, &SolverConfig::default())
//!     .unwrap();
//! assert_eq!(traj.len(), 100);
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops,  // Explicit stage sums read like the Butcher tableau
    clippy::imprecise_flops,
    clippy::many_single_char_names,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
    clippy::needless_range_loop,
)]

pub mod cli;
pub mod config;
pub mod domains;
pub mod engine;
pub mod error;
pub mod visualization;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{DemoConfig, DemoConfigBuilder};
    pub use crate::domains::bloch::{
        equilibrium, integrate_obe, BlochVector, SimulationParameters, Trajectory,
    };
    pub use crate::domains::monte_carlo::{estimate_pi, summarize, PiSampler, PiSummary, Sample};
    pub use crate::domains::ode::SolverConfig;
    pub use crate::engine::jidoka::{JidokaConfig, JidokaGuard};
    pub use crate::engine::rng::SimRng;
    pub use crate::error::{SimError, SimResult};
    pub use crate::visualization::{ExportFormat, Exporter};
}

/// Re-export for public API
pub use error::{SimError, SimResult};
