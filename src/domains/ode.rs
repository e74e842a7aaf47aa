//! Explicit Runge-Kutta solvers for small autonomous-or-not ODE systems.
//!
//! - Dormand-Prince 5(4): adaptive, error-controlled (default)
//! - Classical RK4: fixed step, `substeps` steps per output interval
//!
//! Both step exactly onto every requested output time, so the returned
//! states line up with the caller's time grid without interpolation.
//! Every accepted state passes through a [`JidokaGuard`].

use serde::{Deserialize, Serialize};

use crate::engine::jidoka::JidokaGuard;
use crate::error::{SimError, SimResult};

/// A first-order system `dy/dt = f(t, y)` of fixed dimension `N`.
pub trait OdeSystem<const N: usize> {
    /// Evaluate the right-hand side.
    fn rhs(&self, t: f64, y: &[f64; N]) -> [f64; N];
}

/// Solver selection and its tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SolverConfig {
    /// Adaptive Dormand-Prince 5(4).
    DormandPrince {
        /// Relative tolerance.
        rtol: f64,
        /// Absolute tolerance.
        atol: f64,
        /// Maximum step attempts (accepted + rejected) over the whole run.
        max_steps: usize,
    },
    /// Classical fixed-step RK4.
    Rk4 {
        /// RK4 steps per output interval.
        substeps: usize,
    },
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::DormandPrince {
            rtol: 1e-9,
            atol: 1e-12,
            max_steps: 100_000,
        }
    }
}

impl SolverConfig {
    /// Check the tuning knobs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for non-positive or non-finite tolerances
    /// and zero step budgets.
    pub fn validate(&self) -> SimResult<()> {
        match *self {
            Self::DormandPrince {
                rtol,
                atol,
                max_steps,
            } => {
                for (name, tol) in [("rtol", rtol), ("atol", atol)] {
                    if !(tol.is_finite() && tol > 0.0) {
                        return Err(SimError::invalid_argument(
                            name,
                            format!("must be positive and finite, got {tol}"),
                        ));
                    }
                }
                if max_steps == 0 {
                    return Err(SimError::invalid_argument("max_steps", "must be at least 1"));
                }
            }
            Self::Rk4 { substeps } => {
                if substeps == 0 {
                    return Err(SimError::invalid_argument("substeps", "must be at least 1"));
                }
            }
        }
        Ok(())
    }

    /// Short display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DormandPrince { .. } => "dormand-prince-5(4)",
            Self::Rk4 { .. } => "rk4",
        }
    }
}

/// Work counters for one integration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStats {
    /// Accepted steps.
    pub accepted: usize,
    /// Rejected steps (adaptive only).
    pub rejected: usize,
    /// Right-hand side evaluations.
    pub rhs_evals: usize,
}

/// States at each requested output time.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<const N: usize> {
    /// One state per output time; `states[0]` is the initial condition.
    pub states: Vec<[f64; N]>,
    /// Work counters.
    pub stats: SolverStats,
}

/// `n` evenly spaced points over `[start, end]`, both endpoints exact.
#[must_use]
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let last = n - 1;
            let span = end - start;
            (0..n)
                .map(|i| {
                    if i == last {
                        end
                    } else {
                        start + span * (i as f64 / last as f64)
                    }
                })
                .collect()
        }
    }
}

/// Integrate `system` from `y0` at `times[0]` through every entry of `times`.
///
/// # Errors
///
/// - `InvalidArgument` if `times` is empty, non-finite or decreasing, or the
///   solver configuration is invalid.
/// - `NumericInstability` if the adaptive solver runs out of steps, its step
///   size underflows, or the guard sees a non-finite state.
pub fn integrate<S, const N: usize>(
    system: &S,
    y0: [f64; N],
    times: &[f64],
    solver: &SolverConfig,
    guard: &mut JidokaGuard,
) -> SimResult<Solution<N>>
where
    S: OdeSystem<N>,
{
    solver.validate()?;
    let Some(&t0) = times.first() else {
        return Err(SimError::invalid_argument("times", "at least one output time is required"));
    };
    for pair in times.windows(2) {
        if !(pair[0].is_finite() && pair[1].is_finite() && pair[1] >= pair[0]) {
            return Err(SimError::invalid_argument(
                "times",
                "output times must be finite and non-decreasing",
            ));
        }
    }

    guard.check(t0, &y0)?;

    let mut states = Vec::with_capacity(times.len());
    states.push(y0);
    let mut stats = SolverStats::default();

    match *solver {
        SolverConfig::Rk4 { substeps } => {
            let mut y = y0;
            for pair in times.windows(2) {
                let h = (pair[1] - pair[0]) / substeps as f64;
                let mut t = pair[0];
                for _ in 0..substeps {
                    y = rk4_step(system, t, &y, h);
                    t += h;
                    stats.accepted += 1;
                    stats.rhs_evals += 4;
                }
                guard.check(pair[1], &y)?;
                states.push(y);
            }
        }
        SolverConfig::DormandPrince {
            rtol,
            atol,
            max_steps,
        } => {
            let mut dp = DormandPrince {
                rtol,
                atol,
                max_steps,
                h: None,
                stats,
            };
            let mut y = y0;
            for pair in times.windows(2) {
                y = dp.advance(system, pair[0], y, pair[1], guard)?;
                states.push(y);
            }
            stats = dp.stats;
        }
    }

    Ok(Solution { states, stats })
}

/// One classical RK4 step.
pub fn rk4_step<S, const N: usize>(system: &S, t: f64, y: &[f64; N], h: f64) -> [f64; N]
where
    S: OdeSystem<N>,
{
    let half = 0.5 * h;

    // k1 = f(t, y)
    let k1 = system.rhs(t, y);
    // k2 = f(t + h/2, y + h*k1/2)
    let k2 = system.rhs(t + half, &axpy(y, &[(half, &k1)]));
    // k3 = f(t + h/2, y + h*k2/2)
    let k3 = system.rhs(t + half, &axpy(y, &[(half, &k2)]));
    // k4 = f(t + h, y + h*k3)
    let k4 = system.rhs(t + h, &axpy(y, &[(h, &k3)]));

    let sixth = h / 6.0;
    std::array::from_fn(|i| y[i] + sixth * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]))
}

/// `y + Σ cⱼ·kⱼ`.
fn axpy<const N: usize>(y: &[f64; N], terms: &[(f64, &[f64; N])]) -> [f64; N] {
    std::array::from_fn(|i| {
        terms
            .iter()
            .fold(y[i], |acc, (c, k)| acc + c * k[i])
    })
}

// Dormand-Prince 5(4) tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (also row 7 of the tableau).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between 5th- and 4th-order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339_200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Adaptive stepper state carried across output intervals.
struct DormandPrince {
    rtol: f64,
    atol: f64,
    max_steps: usize,
    /// Step size proposed for the next attempt.
    h: Option<f64>,
    stats: SolverStats,
}

impl DormandPrince {
    /// Advance from `(t, y)` to exactly `t_end`.
    fn advance<S, const N: usize>(
        &mut self,
        system: &S,
        mut t: f64,
        mut y: [f64; N],
        t_end: f64,
        guard: &mut JidokaGuard,
    ) -> SimResult<[f64; N]>
    where
        S: OdeSystem<N>,
    {
        if t_end <= t {
            return Ok(y);
        }

        let mut h = match self.h {
            Some(h) => h,
            None => self.initial_step(system, t, &y),
        };

        while t < t_end {
            if self.stats.accepted + self.stats.rejected >= self.max_steps {
                return Err(SimError::numeric_instability(
                    t,
                    format!("exceeded {} steps before reaching t={t_end}", self.max_steps),
                ));
            }

            let remaining = t_end - t;
            let last = h >= remaining;
            let step = if last { remaining } else { h };

            // Clipped final steps may be arbitrarily short.
            if !last && h <= 16.0 * f64::EPSILON * t.abs().max(1.0) {
                return Err(SimError::numeric_instability(
                    t,
                    format!("step size underflow (h={h:.3e})"),
                ));
            }

            let (y_new, err) = self.try_step(system, t, &y, step);

            if err.is_finite() && err <= 1.0 {
                self.stats.accepted += 1;
                t = if last { t_end } else { t + step };
                y = y_new;
                guard.check(t, &y)?;

                let factor = if err == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
                };
                // A step clipped to the output time says little about the
                // natural step size; do not let it shrink the next one.
                h = if last { h.max(step * factor) } else { step * factor };
            } else {
                self.stats.rejected += 1;
                let factor = if err.is_finite() {
                    (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, 1.0)
                } else {
                    MIN_FACTOR
                };
                h = step * factor;
            }
        }

        self.h = Some(h);
        Ok(y)
    }

    /// One Dormand-Prince step; returns the 5th-order solution and the
    /// scaled RMS error estimate.
    fn try_step<S, const N: usize>(
        &mut self,
        system: &S,
        t: f64,
        y: &[f64; N],
        h: f64,
    ) -> ([f64; N], f64)
    where
        S: OdeSystem<N>,
    {
        let k1 = system.rhs(t, y);
        let k2 = system.rhs(t + C2 * h, &axpy(y, &[(h * A21, &k1)]));
        let k3 = system.rhs(t + C3 * h, &axpy(y, &[(h * A31, &k1), (h * A32, &k2)]));
        let k4 = system.rhs(
            t + C4 * h,
            &axpy(y, &[(h * A41, &k1), (h * A42, &k2), (h * A43, &k3)]),
        );
        let k5 = system.rhs(
            t + C5 * h,
            &axpy(
                y,
                &[(h * A51, &k1), (h * A52, &k2), (h * A53, &k3), (h * A54, &k4)],
            ),
        );
        let k6 = system.rhs(
            t + h,
            &axpy(
                y,
                &[
                    (h * A61, &k1),
                    (h * A62, &k2),
                    (h * A63, &k3),
                    (h * A64, &k4),
                    (h * A65, &k5),
                ],
            ),
        );
        let y_new = axpy(
            y,
            &[(h * B1, &k1), (h * B3, &k3), (h * B4, &k4), (h * B5, &k5), (h * B6, &k6)],
        );
        let k7 = system.rhs(t + h, &y_new);
        self.stats.rhs_evals += 7;

        let mut sum = 0.0;
        for i in 0..N {
            let e = h
                * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
            let scale = self.atol + self.rtol * y[i].abs().max(y_new[i].abs());
            sum += (e / scale).powi(2);
        }
        let err = if N == 0 { 0.0 } else { (sum / N as f64).sqrt() };

        (y_new, err)
    }

    /// Starting step from the scaled magnitudes of `y` and `f(y)`.
    fn initial_step<S, const N: usize>(&mut self, system: &S, t: f64, y: &[f64; N]) -> f64
    where
        S: OdeSystem<N>,
    {
        let f = system.rhs(t, y);
        self.stats.rhs_evals += 1;

        let mut d0 = 0.0;
        let mut d1 = 0.0;
        for i in 0..N {
            let scale = self.atol + self.rtol * y[i].abs();
            d0 += (y[i] / scale).powi(2);
            d1 += (f[i] / scale).powi(2);
        }
        let (d0, d1) = (d0.sqrt(), d1.sqrt());

        if d0 < 1e-5 || d1 < 1e-5 || !d1.is_finite() {
            1e-6
        } else {
            0.01 * d0 / d1
        }
    }
}
