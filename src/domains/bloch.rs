//! Optical Bloch equations for a driven, damped two-level system.
//!
//! # Governing Equations
//!
//! ```text
//! ds1/dt =  Δ·s2 − γ·s1
//! ds2/dt = −Δ·s1 − Ω·s3 − γ·s2
//! ds3/dt =  Ω·s2 − Γ·(1 + s3)
//! ```
//!
//! `Ω` is the Rabi frequency, `Δ` the detuning, `γ` the coherence decay rate
//! and `Γ` the population decay rate. Without collisions `Γ = 2γ`
//! (see [`SimulationParameters::radiative`]); nothing enforces it.
//!
//! The system is affine with a single equilibrium (when `A` below is
//! non-singular):
//!
//! ```text
//! A·s* = (0, 0, Γ),   A = [[−γ, Δ, 0], [−Δ, −γ, −Ω], [0, Ω, −Γ]]
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ode::{integrate, linspace, OdeSystem, SolverConfig, SolverStats};
use crate::engine::jidoka::{JidokaConfig, JidokaGuard};
use crate::error::{SimError, SimResult};

/// Physical constants for one integration run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Rabi frequency Ω.
    pub omega: f64,
    /// Detuning Δ.
    pub delta: f64,
    /// Coherence decay rate γ.
    pub gamma: f64,
    /// Population decay rate Γ.
    pub population_decay: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self::radiative(2.0, 0.0, 0.3)
    }
}

impl SimulationParameters {
    /// Create parameters with an explicit population decay rate.
    #[must_use]
    pub const fn new(omega: f64, delta: f64, gamma: f64, population_decay: f64) -> Self {
        Self {
            omega,
            delta,
            gamma,
            population_decay,
        }
    }

    /// Purely radiative damping: `Γ = 2γ`.
    #[must_use]
    pub fn radiative(omega: f64, delta: f64, gamma: f64) -> Self {
        Self::new(omega, delta, gamma, 2.0 * gamma)
    }

    /// Reject non-finite constants.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` naming the first non-finite field.
    pub fn validate(&self) -> SimResult<()> {
        SimError::require_finite("omega", self.omega)?;
        SimError::require_finite("delta", self.delta)?;
        SimError::require_finite("gamma", self.gamma)?;
        SimError::require_finite("population_decay", self.population_decay)?;
        Ok(())
    }
}

/// Bloch vector `(s1, s2, s3)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlochVector {
    /// In-phase coherence.
    pub s1: f64,
    /// Quadrature coherence.
    pub s2: f64,
    /// Population inversion.
    pub s3: f64,
}

impl BlochVector {
    /// Ground state, the south pole.
    pub const GROUND: Self = Self::new(0.0, 0.0, -1.0);
    /// Excited state, the north pole.
    pub const EXCITED: Self = Self::new(0.0, 0.0, 1.0);

    /// Create a new Bloch vector.
    #[must_use]
    pub const fn new(s1: f64, s2: f64, s3: f64) -> Self {
        Self { s1, s2, s3 }
    }

    /// Components as an array.
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.s1, self.s2, self.s3]
    }

    /// Euclidean length; at most 1 for a physical state.
    #[must_use]
    pub fn norm(&self) -> f64 {
        (self.s1 * self.s1 + self.s2 * self.s2 + self.s3 * self.s3).sqrt()
    }

    fn validate(&self) -> SimResult<()> {
        SimError::require_finite("initial_state.s1", self.s1)?;
        SimError::require_finite("initial_state.s2", self.s2)?;
        SimError::require_finite("initial_state.s3", self.s3)?;
        Ok(())
    }
}

impl From<[f64; 3]> for BlochVector {
    fn from([s1, s2, s3]: [f64; 3]) -> Self {
        Self::new(s1, s2, s3)
    }
}

/// Right-hand side of the optical Bloch equations.
#[derive(Debug, Clone, Copy)]
pub struct ObeSystem {
    params: SimulationParameters,
}

impl ObeSystem {
    /// Wrap a parameter set.
    #[must_use]
    pub const fn new(params: SimulationParameters) -> Self {
        Self { params }
    }
}

impl OdeSystem<3> for ObeSystem {
    fn rhs(&self, _t: f64, s: &[f64; 3]) -> [f64; 3] {
        let SimulationParameters {
            omega,
            delta,
            gamma,
            population_decay,
        } = self.params;
        let [s1, s2, s3] = *s;

        [
            delta * s2 - gamma * s1,
            -delta * s1 - omega * s3 - gamma * s2,
            omega * s2 - population_decay * (1.0 + s3),
        ]
    }
}

/// Bloch vector sampled on an evenly spaced time grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    times: Vec<f64>,
    states: Vec<BlochVector>,
    params: SimulationParameters,
    stats: SolverStats,
}

impl Trajectory {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Never true for a trajectory built by [`integrate_obe`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Sample times.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Sampled states.
    #[must_use]
    pub fn states(&self) -> &[BlochVector] {
        &self.states
    }

    /// Parameters the trajectory was integrated with.
    #[must_use]
    pub const fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Solver work counters.
    #[must_use]
    pub const fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// `(time, state)` at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<(f64, BlochVector)> {
        Some((*self.times.get(index)?, *self.states.get(index)?))
    }

    /// Last sampled state.
    #[must_use]
    pub fn final_state(&self) -> Option<BlochVector> {
        self.states.last().copied()
    }

    /// Total simulated time span.
    #[must_use]
    pub fn horizon(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Iterate `(time, state)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, BlochVector)> + '_ {
        self.times.iter().copied().zip(self.states.iter().copied())
    }

    /// The `s3` (population inversion) series.
    #[must_use]
    pub fn population(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.s3).collect()
    }
}

/// Integrate the optical Bloch equations over `[0, horizon]`.
///
/// Returns exactly `sample_count` states at evenly spaced times, the first
/// being `initial_state` verbatim and the last at `horizon`.
///
/// # Errors
///
/// - `InvalidArgument` for non-finite parameters or initial state, a
///   non-finite or non-positive horizon, `sample_count < 2`, or an invalid
///   solver configuration.
/// - `NumericInstability` if the solver cannot meet its tolerance within
///   its step budget or a state goes non-finite.
///
/// # Example
///
/// ```rust
/// use physdemo::domains::bloch::{integrate_obe, BlochVector, SimulationParameters};
/// use physdemo::domains::ode::SolverConfig;
///
/// let params = SimulationParameters::radiative(2.0, 0.0, 0.3);
/// let traj = integrate_obe(BlochVector::EXCITED, &params, 10.0, 100, &SolverConfig::default())
///     .unwrap();
/// assert_eq!(traj.len(), 100);
/// ```
pub fn integrate_obe(
    initial_state: BlochVector,
    params: &SimulationParameters,
    horizon: f64,
    sample_count: usize,
    solver: &SolverConfig,
) -> SimResult<Trajectory> {
    params.validate()?;
    initial_state.validate()?;
    if !(horizon.is_finite() && horizon > 0.0) {
        return Err(SimError::invalid_argument(
            "horizon",
            format!("must be positive and finite, got {horizon}"),
        ));
    }
    if sample_count < 2 {
        return Err(SimError::invalid_argument(
            "sample_count",
            format!("must be at least 2, got {sample_count}"),
        ));
    }

    let times = linspace(0.0, horizon, sample_count);
    let mut guard = JidokaGuard::new(JidokaConfig::default());
    let solution = integrate(
        &ObeSystem::new(*params),
        initial_state.to_array(),
        &times,
        solver,
        &mut guard,
    )?;

    debug!(
        solver = solver.name(),
        samples = sample_count,
        horizon,
        accepted = solution.stats.accepted,
        rejected = solution.stats.rejected,
        norm_warnings = guard.warnings().len(),
        "bloch integration finished"
    );

    Ok(Trajectory {
        times,
        states: solution.states.into_iter().map(BlochVector::from).collect(),
        params: *params,
        stats: solution.stats,
    })
}

/// Analytic steady state of the optical Bloch equations.
///
/// ```text
/// D  = γ²Γ + γΩ² + Δ²Γ
/// s1 = ΔΩΓ / D,  s2 = γΩΓ / D,  s3 = −(γ² + Δ²)Γ / D
/// ```
///
/// # Errors
///
/// Returns `InvalidArgument` for non-finite parameters or when the system
/// has no unique equilibrium (`D = 0`, e.g. no damping at all).
pub fn equilibrium(params: &SimulationParameters) -> SimResult<BlochVector> {
    params.validate()?;
    let SimulationParameters {
        omega,
        delta,
        gamma,
        population_decay: big_gamma,
    } = *params;

    let d = gamma * gamma * big_gamma + gamma * omega * omega + delta * delta * big_gamma;
    if !d.is_finite() || d.abs() < f64::MIN_POSITIVE {
        return Err(SimError::invalid_argument(
            "params",
            "no unique equilibrium for these parameters",
        ));
    }

    Ok(BlochVector::new(
        delta * omega * big_gamma / d,
        gamma * omega * big_gamma / d,
        -(gamma * gamma + delta * delta) * big_gamma / d,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> SimulationParameters {
        SimulationParameters::new(2.0, 0.0, 0.3, 0.6)
    }

    #[test]
    fn test_radiative_constraint() {
        let p = SimulationParameters::radiative(1.0, 0.5, 0.25);
        assert!((p.population_decay - 0.5).abs() < f64::EPSILON);
        assert_eq!(SimulationParameters::default(), standard());
    }

    #[test]
    fn test_rhs_values() {
        let system = ObeSystem::new(SimulationParameters::new(2.0, 0.5, 0.3, 0.6));
        let d = system.rhs(0.0, &[0.1, 0.2, 0.3]);
        assert!((d[0] - (0.5 * 0.2 - 0.3 * 0.1)).abs() < 1e-15);
        assert!((d[1] - (-0.5 * 0.1 - 2.0 * 0.3 - 0.3 * 0.2)).abs() < 1e-15);
        assert!((d[2] - (2.0 * 0.2 - 0.6 * 1.3)).abs() < 1e-15);
    }

    #[test]
    fn test_equilibrium_is_fixed_point() {
        for params in [
            standard(),
            SimulationParameters::new(1.3, -0.7, 0.2, 0.5),
            SimulationParameters::radiative(0.0, 0.0, 1.0),
        ] {
            let eq = equilibrium(&params).unwrap();
            let d = ObeSystem::new(params).rhs(0.0, &eq.to_array());
            for v in d {
                assert!(v.abs() < 1e-12, "{params:?}: {d:?}");
            }
        }
    }

    #[test]
    fn test_equilibrium_standard_values() {
        let eq = equilibrium(&standard()).unwrap();
        // s3* = -Γ / (Γ + Ω²/γ)
        let expected = -0.6 / (0.6 + 4.0 / 0.3);
        assert!((eq.s3 - expected).abs() < 1e-12);
        assert!(eq.s1.abs() < f64::EPSILON);
        assert!(eq.norm() <= 1.0);
    }

    #[test]
    fn test_equilibrium_without_driving_is_ground() {
        let eq = equilibrium(&SimulationParameters::radiative(0.0, 0.0, 0.3)).unwrap();
        assert_eq!(eq, BlochVector::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_equilibrium_undamped_is_error() {
        let err = equilibrium(&SimulationParameters::new(1.0, 0.0, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, SimError::InvalidArgument { .. }));
    }

    #[test]
    fn test_ground_state_is_constant_without_driving() {
        let params = SimulationParameters::radiative(0.0, 0.0, 0.3);
        for solver in [SolverConfig::default(), SolverConfig::Rk4 { substeps: 4 }] {
            let traj = integrate_obe(BlochVector::GROUND, &params, 10.0, 50, &solver).unwrap();
            for s in traj.states() {
                assert_eq!(*s, BlochVector::GROUND);
            }
        }
    }

    #[test]
    fn test_two_samples_are_endpoints() {
        let traj =
            integrate_obe(BlochVector::EXCITED, &standard(), 10.0, 2, &SolverConfig::default())
                .unwrap();
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.times(), &[0.0, 10.0]);
        assert_eq!(traj.states()[0], BlochVector::EXCITED);
        assert!((traj.horizon() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tiny_horizons_integrate() {
        for (horizon, samples) in [(1e-15, 2), (1e-12, 1000)] {
            let traj = integrate_obe(
                BlochVector::EXCITED,
                &standard(),
                horizon,
                samples,
                &SolverConfig::default(),
            )
            .unwrap();
            assert_eq!(traj.len(), samples);
            assert_eq!(traj.horizon().to_bits(), horizon.to_bits());
            for s in traj.states() {
                assert!(s.to_array().iter().all(|v| v.is_finite()), "{s:?}");
                assert!((s.s3 - 1.0).abs() < 1e-9, "horizon={horizon}: {s:?}");
            }
        }
    }

    #[test]
    fn test_free_decay_matches_closed_form() {
        // Ω = Δ = 0 from the excited state: s3(t) = -1 + 2e^{-Γt}.
        let params = SimulationParameters::radiative(0.0, 0.0, 0.3);
        let traj =
            integrate_obe(BlochVector::EXCITED, &params, 10.0, 100, &SolverConfig::default())
                .unwrap();

        for (t, s) in traj.iter() {
            let exact = -1.0 + 2.0 * (-0.6 * t).exp();
            assert!((s.s3 - exact).abs() < 1e-8, "t={t}");
            assert!(s.s1.abs() < f64::EPSILON && s.s2.abs() < f64::EPSILON);
        }

        let pop = traj.population();
        assert!(pop.windows(2).all(|w| w[1] < w[0]), "relaxation must be monotone");
    }

    #[test]
    fn test_invalid_arguments() {
        let solver = SolverConfig::default();
        let p = standard();
        let s0 = BlochVector::EXCITED;

        assert!(integrate_obe(s0, &p, 0.0, 10, &solver).is_err());
        assert!(integrate_obe(s0, &p, -1.0, 10, &solver).is_err());
        assert!(integrate_obe(s0, &p, f64::INFINITY, 10, &solver).is_err());
        assert!(integrate_obe(s0, &p, 1.0, 1, &solver).is_err());
        assert!(integrate_obe(s0, &p, 1.0, 0, &solver).is_err());

        let nan_params = SimulationParameters::new(f64::NAN, 0.0, 0.3, 0.6);
        let err = integrate_obe(s0, &nan_params, 1.0, 10, &solver).unwrap_err();
        assert!(err.to_string().contains("omega"));

        let nan_state = BlochVector::new(0.0, f64::NAN, 1.0);
        let err = integrate_obe(nan_state, &p, 1.0, 10, &solver).unwrap_err();
        assert!(err.to_string().contains("initial_state.s2"));

        let bad_solver = SolverConfig::Rk4 { substeps: 0 };
        assert!(integrate_obe(s0, &p, 1.0, 10, &bad_solver).is_err());
    }

    #[test]
    fn test_trajectory_accessors() {
        let traj =
            integrate_obe(BlochVector::EXCITED, &standard(), 5.0, 11, &SolverConfig::default())
                .unwrap();
        assert!(!traj.is_empty());
        assert_eq!(traj.times().len(), 11);
        assert_eq!(traj.iter().count(), 11);
        assert_eq!(traj.population().len(), 11);
        assert_eq!(traj.params(), &standard());
        assert!(traj.stats().accepted > 0);
        assert!(traj.get(11).is_none());
        let (t, _) = traj.get(5).unwrap();
        assert!((t - 2.5).abs() < 1e-12);
        assert_eq!(traj.final_state(), traj.states().last().copied());
    }
}
