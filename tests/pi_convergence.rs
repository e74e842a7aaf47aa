//! Monte Carlo π: accuracy and CLT convergence rate.

use physdemo::domains::monte_carlo::{estimate_pi, summarize, ConvergenceStudy, PiSampler};
use physdemo::engine::rng::SimRng;
use std::f64::consts::PI;

#[test]
fn one_million_samples_within_one_hundredth() {
    let mut rng = SimRng::new(42);
    let samples = estimate_pi(1_000_000, &mut rng).unwrap();

    assert_eq!(samples.len(), 1_000_000);
    let summary = summarize(&samples).unwrap();
    assert!(
        summary.absolute_error < 0.01,
        "estimate {} too far from π",
        summary.estimate
    );
    assert!(summary.standard_error < 0.002);
}

#[test]
fn error_shrinks_like_inverse_square_root() {
    let study = ConvergenceStudy {
        sample_sizes: vec![100, 1_000, 10_000, 100_000],
        trials: 32,
        seed: 2024,
    };
    let report = study.run().unwrap();

    assert_eq!(report.points.len(), 4);
    assert!(
        report.follows_clt(0.15),
        "log-log slope {} not close to -0.5",
        report.slope
    );
    assert!(report.points[3].mean_abs_error < report.points[0].mean_abs_error);
}

#[test]
fn sampler_can_stop_early() {
    let mut rng = SimRng::new(9);
    let mut sampler = PiSampler::new(1_000_000, &mut rng).unwrap();
    let first: Vec<_> = sampler.by_ref().take(10).collect();

    assert_eq!(first.len(), 10);
    assert_eq!(sampler.drawn(), 10);
    assert_eq!(sampler.len(), 1_000_000 - 10);
}

#[test]
fn estimates_stay_in_range_and_settle() {
    let mut rng = SimRng::new(1);
    let samples = estimate_pi(50_000, &mut rng).unwrap();

    assert!(samples.iter().all(|s| (0.0..=4.0).contains(&s.estimate)));
    let tail_spread = samples[40_000..]
        .iter()
        .map(|s| (s.estimate - PI).abs())
        .fold(0.0, f64::max);
    assert!(tail_spread < 0.1);
}
