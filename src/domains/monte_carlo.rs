//! Monte Carlo estimation of π.
//!
//! Points are drawn uniformly from the square `[-1, 1]²`; the fraction that
//! lands inside the inscribed unit disk approaches `π/4`.
//!
//! # Governing Equations
//!
//! ```text
//! Estimator:        π̂ᵢ = (4/i) Σ_{k≤i} I(x_k² + y_k² ≤ 1)
//! Standard Error:   SE = 4·sqrt(p(1-p)/n),  p = inliers/n
//! Convergence Rate: Error ~ O(n^{-1/2})
//! ```
//!
//! Every emitted [`Sample`] is a real draw: the sequence for `n` samples has
//! exactly `n` entries and entry `i` (0-based) carries the estimate over the
//! first `i + 1` draws.

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::rng::SimRng;
use crate::error::{SimError, SimResult};

/// One accepted draw and the running estimate after it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Horizontal coordinate in `[-1, 1)`.
    pub x: f64,
    /// Vertical coordinate in `[-1, 1)`.
    pub y: f64,
    /// Running π estimate including this sample.
    pub estimate: f64,
}

impl Sample {
    /// Squared distance from the origin.
    #[must_use]
    pub fn squared_radius(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Whether the point lies in the closed unit disk.
    #[must_use]
    pub fn is_inlier(&self) -> bool {
        self.squared_radius() <= 1.0
    }
}

/// Lazy, single-pass producer of [`Sample`]s.
///
/// Holds the caller's generator for its lifetime; dropping the sampler
/// early is the way to stop.
#[derive(Debug)]
pub struct PiSampler<'a> {
    rng: &'a mut SimRng,
    total: u64,
    drawn: u64,
    inliers: u64,
}

impl<'a> PiSampler<'a> {
    /// Create a sampler that will produce exactly `total_samples` samples.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `total_samples` is zero.
    pub fn new(total_samples: u64, rng: &'a mut SimRng) -> SimResult<Self> {
        if total_samples == 0 {
            return Err(SimError::invalid_argument(
                "total_samples",
                "must be at least 1",
            ));
        }
        Ok(Self {
            rng,
            total: total_samples,
            drawn: 0,
            inliers: 0,
        })
    }

    /// Samples produced so far.
    #[must_use]
    pub const fn drawn(&self) -> u64 {
        self.drawn
    }

    /// Inliers among the samples produced so far.
    #[must_use]
    pub const fn inliers(&self) -> u64 {
        self.inliers
    }

    /// Samples still to come.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.total - self.drawn
    }
}

impl Iterator for PiSampler<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.drawn >= self.total {
            return None;
        }

        let x = self.rng.gen_range_f64(-1.0, 1.0);
        let y = self.rng.gen_range_f64(-1.0, 1.0);
        if x * x + y * y <= 1.0 {
            self.inliers += 1;
        }
        self.drawn += 1;

        Some(Sample {
            x,
            y,
            estimate: 4.0 * self.inliers as f64 / self.drawn as f64,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining()).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PiSampler<'_> {}

impl FusedIterator for PiSampler<'_> {}

/// Draw `total_samples` points and return the full ordered sequence.
///
/// # Errors
///
/// Returns `InvalidArgument` if `total_samples` is zero.
///
/// # Example
///
/// ```rust
/// use physdemo::domains::monte_carlo::estimate_pi;
/// use physdemo::engine::rng::SimRng;
///
/// let mut rng = SimRng::new(42);
/// let samples = estimate_pi(10_000, &mut rng).unwrap();
/// assert_eq!(samples.len(), 10_000);
/// assert!((samples[9_999].estimate - std::f64::consts::PI).abs() < 0.1);
/// ```
pub fn estimate_pi(total_samples: u64, rng: &mut SimRng) -> SimResult<Vec<Sample>> {
    let samples: Vec<Sample> = PiSampler::new(total_samples, rng)?.collect();

    if let Some(last) = samples.last() {
        debug!(
            samples = samples.len(),
            estimate = last.estimate,
            seed = rng.master_seed(),
            "pi estimation finished"
        );
    }

    Ok(samples)
}

/// Summary statistics over a sample sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PiSummary {
    /// Number of samples.
    pub samples: u64,
    /// Samples inside the unit disk.
    pub inliers: u64,
    /// Final π estimate.
    pub estimate: f64,
    /// Binomial standard error of the estimate.
    pub standard_error: f64,
    /// `|π̂ - π|`.
    pub absolute_error: f64,
}

impl PiSummary {
    /// Whether `value` falls within the 95% confidence interval.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (value - self.estimate).abs() <= 1.96 * self.standard_error
    }
}

/// Summarize a sample sequence. Returns `None` for an empty slice.
#[must_use]
pub fn summarize(samples: &[Sample]) -> Option<PiSummary> {
    let last = samples.last()?;
    let n = samples.len() as u64;
    let inliers = samples.iter().filter(|s| s.is_inlier()).count() as u64;
    let p = inliers as f64 / n as f64;

    Some(PiSummary {
        samples: n,
        inliers,
        estimate: last.estimate,
        standard_error: 4.0 * (p * (1.0 - p) / n as f64).sqrt(),
        absolute_error: (last.estimate - std::f64::consts::PI).abs(),
    })
}

/// Mean absolute error observed at one sample size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    /// Samples per trial.
    pub samples: u64,
    /// Mean of `|π̂ - π|` over all trials.
    pub mean_abs_error: f64,
}

/// Outcome of a [`ConvergenceStudy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceReport {
    /// One point per requested sample size, in request order.
    pub points: Vec<ConvergencePoint>,
    /// Least-squares slope of `ln(error)` against `ln(n)`; ≈ -0.5 per CLT.
    pub slope: f64,
}

impl ConvergenceReport {
    /// Whether the slope is within `tolerance` of -0.5.
    #[must_use]
    pub fn follows_clt(&self, tolerance: f64) -> bool {
        (self.slope + 0.5).abs() <= tolerance
    }
}

/// Repeated independent trials at several sample sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergenceStudy {
    /// Sample sizes to evaluate.
    pub sample_sizes: Vec<u64>,
    /// Independent trials per size.
    pub trials: usize,
    /// Master seed; each trial gets its own partitioned stream.
    pub seed: u64,
}

impl ConvergenceStudy {
    /// Run every trial and fit the convergence slope.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty size list, zero trials, or a
    /// zero sample size.
    pub fn run(&self) -> SimResult<ConvergenceReport> {
        if self.sample_sizes.is_empty() {
            return Err(SimError::invalid_argument(
                "sample_sizes",
                "at least one sample size is required",
            ));
        }
        if self.trials == 0 {
            return Err(SimError::invalid_argument("trials", "must be at least 1"));
        }

        let mut master = SimRng::new(self.seed);
        let mut points = Vec::with_capacity(self.sample_sizes.len());

        for &n in &self.sample_sizes {
            let mut total_error = 0.0;
            for mut rng in master.partition(self.trials) {
                let last = PiSampler::new(n, &mut rng)?.last();
                let estimate = last.map_or(0.0, |s| s.estimate);
                total_error += (estimate - std::f64::consts::PI).abs();
            }
            points.push(ConvergencePoint {
                samples: n,
                mean_abs_error: total_error / self.trials as f64,
            });
        }

        let slope = log_log_slope(&points);
        debug!(sizes = points.len(), trials = self.trials, slope, "convergence study finished");

        Ok(ConvergenceReport { points, slope })
    }
}

/// Log-log regression: `ln(error) = slope * ln(n) + intercept`.
///
/// Returns 0.0 when fewer than two usable points remain.
fn log_log_slope(points: &[ConvergencePoint]) -> f64 {
    let pts: Vec<(f64, f64)> = points
        .iter()
        .filter(|p| p.samples > 0 && p.mean_abs_error > f64::EPSILON)
        .map(|p| ((p.samples as f64).ln(), p.mean_abs_error.ln()))
        .collect();

    if pts.len() < 2 {
        return 0.0;
    }

    let n = pts.len() as f64;
    let sum_x: f64 = pts.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = pts.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = pts.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = pts.iter().map(|(x, _)| x * x).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.abs() < f64::EPSILON {
        return 0.0;
    }

    (n * sum_xy - sum_x * sum_y) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_samples_rejected() {
        let mut rng = SimRng::new(42);
        let err = estimate_pi(0, &mut rng).unwrap_err();
        assert!(matches!(err, SimError::InvalidArgument { .. }));
    }

    #[test]
    fn test_single_sample_is_real() {
        let mut rng = SimRng::new(42);
        let samples = estimate_pi(1, &mut rng).unwrap();
        assert_eq!(samples.len(), 1);
        let s = samples[0];
        let expected = if s.is_inlier() { 4.0 } else { 0.0 };
        assert!((s.estimate - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn test_length_matches_request() {
        let mut rng = SimRng::new(1);
        for n in [2, 3, 10, 1000] {
            assert_eq!(estimate_pi(n, &mut rng).unwrap().len() as u64, n);
        }
    }

    #[test]
    fn test_cumulative_invariant_holds_exactly() {
        let mut rng = SimRng::new(42);
        let samples = estimate_pi(5_000, &mut rng).unwrap();

        let mut inliers = 0u64;
        for (i, s) in samples.iter().enumerate() {
            if s.x * s.x + s.y * s.y <= 1.0 {
                inliers += 1;
            }
            let expected = 4.0 * inliers as f64 / (i + 1) as f64;
            assert_eq!(s.estimate.to_bits(), expected.to_bits(), "step {i}");
        }
    }

    #[test]
    fn test_points_in_square() {
        let mut rng = SimRng::new(9);
        for s in estimate_pi(2_000, &mut rng).unwrap() {
            assert!((-1.0..1.0).contains(&s.x));
            assert!((-1.0..1.0).contains(&s.y));
            assert!((0.0..=4.0).contains(&s.estimate));
        }
    }

    #[test]
    fn test_boundary_point_counts_as_inside() {
        let s = Sample { x: 1.0, y: 0.0, estimate: 4.0 };
        assert!(s.is_inlier());
        let s = Sample { x: 0.6, y: 0.8, estimate: 4.0 };
        assert!((s.squared_radius() - 1.0).abs() < 1e-15);
        let outside = Sample { x: 0.8, y: 0.8, estimate: 0.0 };
        assert!(!outside.is_inlier());
    }

    #[test]
    fn test_sampler_matches_batch() {
        let mut rng1 = SimRng::new(77);
        let mut rng2 = SimRng::new(77);
        let batch = estimate_pi(500, &mut rng1).unwrap();
        let streamed: Vec<Sample> = PiSampler::new(500, &mut rng2).unwrap().collect();
        assert_eq!(batch, streamed);
    }

    #[test]
    fn test_sampler_counters_and_size_hint() {
        let mut rng = SimRng::new(3);
        let mut sampler = PiSampler::new(10, &mut rng).unwrap();
        assert_eq!(sampler.len(), 10);

        let first: Vec<Sample> = sampler.by_ref().take(4).collect();
        assert_eq!(sampler.drawn(), 4);
        assert_eq!(sampler.remaining(), 6);
        assert_eq!(sampler.len(), 6);
        assert_eq!(
            sampler.inliers(),
            first.iter().filter(|s| s.is_inlier()).count() as u64
        );

        assert_eq!(sampler.by_ref().count(), 6);
        assert!(sampler.next().is_none());
        assert!(sampler.next().is_none());
    }

    #[test]
    fn test_summary() {
        let mut rng = SimRng::new(42);
        let samples = estimate_pi(100_000, &mut rng).unwrap();
        let summary = summarize(&samples).unwrap();

        assert_eq!(summary.samples, 100_000);
        assert!((summary.estimate - 4.0 * summary.inliers as f64 / 100_000.0).abs() < 1e-12);
        // 4·sqrt(π/4·(1-π/4)/1e5) ≈ 0.0052
        assert!(summary.standard_error > 0.004 && summary.standard_error < 0.006);
        assert!(summary.absolute_error < 6.0 * summary.standard_error);
    }

    #[test]
    fn test_summary_empty() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_log_log_slope_exact() {
        let points: Vec<ConvergencePoint> = [100u64, 1_000, 10_000]
            .iter()
            .map(|&n| ConvergencePoint {
                samples: n,
                mean_abs_error: 2.0 / (n as f64).sqrt(),
            })
            .collect();
        assert!((log_log_slope(&points) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_log_log_slope_degenerate() {
        let single = [ConvergencePoint {
            samples: 10,
            mean_abs_error: 0.1,
        }];
        assert!(log_log_slope(&single).abs() < f64::EPSILON);
    }

    #[test]
    fn test_convergence_study_rejects_bad_input() {
        let empty = ConvergenceStudy {
            sample_sizes: vec![],
            trials: 4,
            seed: 1,
        };
        assert!(empty.run().is_err());

        let no_trials = ConvergenceStudy {
            sample_sizes: vec![100],
            trials: 0,
            seed: 1,
        };
        assert!(no_trials.run().is_err());

        let zero_size = ConvergenceStudy {
            sample_sizes: vec![100, 0],
            trials: 2,
            seed: 1,
        };
        assert!(zero_size.run().is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_estimates_bounded(seed in 0u64..u64::MAX, n in 1u64..500) {
            let mut rng = SimRng::new(seed);
            let samples = estimate_pi(n, &mut rng).unwrap();
            prop_assert_eq!(samples.len() as u64, n);
            for s in &samples {
                prop_assert!((0.0..=4.0).contains(&s.estimate));
            }
        }

        #[test]
        fn prop_same_seed_bit_identical(seed in 0u64..u64::MAX) {
            let a = estimate_pi(200, &mut SimRng::new(seed)).unwrap();
            let b = estimate_pi(200, &mut SimRng::new(seed)).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
