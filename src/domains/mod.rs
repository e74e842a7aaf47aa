//! Domain-specific simulation engines.
//!
//! - Monte Carlo: hit-or-miss estimation of π with convergence studies
//! - ODE: fixed-step RK4 and adaptive Dormand–Prince solvers
//! - Bloch: optical Bloch equations for a driven two-level system

pub mod bloch;
pub mod monte_carlo;
pub mod ode;

pub use bloch::{equilibrium, integrate_obe, BlochVector, ObeSystem, SimulationParameters, Trajectory};
pub use monte_carlo::{
    estimate_pi, summarize, ConvergencePoint, ConvergenceReport, ConvergenceStudy, PiSampler,
    PiSummary, Sample,
};
pub use ode::{integrate, linspace, OdeSystem, Solution, SolverConfig, SolverStats};
