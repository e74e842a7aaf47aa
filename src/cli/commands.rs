//! CLI command handlers.
//!
//! Each handler returns a `SimResult` so tests can inspect failures; only
//! [`run_cli`] turns them into exit codes.

use std::path::Path;
use std::process::ExitCode;

use tracing::info;

use super::args::{BlochOptions, PiOptions};
use super::output::{print_bloch_summary, print_help, print_pi_summary, print_version};
use super::{Args, Command};
use crate::config::DemoConfig;
use crate::domains::bloch::{equilibrium, integrate_obe, BlochVector, Trajectory};
use crate::domains::monte_carlo::{estimate_pi, summarize, PiSummary};
use crate::domains::ode::SolverConfig;
use crate::engine::rng::SimRng;
use crate::error::{SimError, SimResult};
use crate::visualization::Exporter;

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    let result = match args.command {
        Command::Pi(opts) => run_pi(&opts).map(drop),
        Command::Bloch(opts) => run_bloch(&opts).map(drop),
        Command::Run {
            config_path,
            seed_override,
            verbose: _,
        } => run_config(&config_path, seed_override),
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Version => {
            print_version();
            Ok(())
        }
        Command::Invalid(message) => {
            eprintln!("Error: {message}\n");
            print_help();
            return ExitCode::from(1);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Estimate π and optionally export the samples.
///
/// # Errors
///
/// Returns error if sampling, rendering or export fails.
pub fn run_pi(opts: &PiOptions) -> SimResult<PiSummary> {
    let mut rng = SimRng::new(opts.seed);
    let samples = estimate_pi(opts.samples, &mut rng)?;
    let summary = summarize(&samples)
        .ok_or_else(|| SimError::invalid_argument("samples", "no samples drawn"))?;
    print_pi_summary(&summary);

    if let Some(path) = &opts.output {
        Exporter::new(opts.format).export_samples(&samples, opts.frames, path)?;
        info!(path = %path.display(), format = %opts.format, "wrote π samples");
    }
    Ok(summary)
}

/// Integrate the Bloch equations from the excited state and optionally export.
///
/// # Errors
///
/// Returns error if integration, rendering or export fails.
pub fn run_bloch(opts: &BlochOptions) -> SimResult<Trajectory> {
    let solver = opts
        .rk4_substeps
        .map_or_else(SolverConfig::default, |substeps| SolverConfig::Rk4 { substeps });
    let params = opts.parameters();

    let trajectory = integrate_obe(BlochVector::EXCITED, &params, opts.horizon, opts.samples, &solver)?;
    print_bloch_summary(&trajectory, equilibrium(&params).ok());

    if let Some(path) = &opts.output {
        Exporter::new(opts.format).export_trajectory(&trajectory, path)?;
        info!(path = %path.display(), format = %opts.format, "wrote trajectory");
    }
    Ok(trajectory)
}

/// Run every component a configuration file enables.
///
/// # Errors
///
/// Returns error if the configuration is invalid or a run fails.
pub fn run_config(path: &Path, seed_override: Option<u64>) -> SimResult<()> {
    let mut config = DemoConfig::load(path)?;
    if let Some(seed) = seed_override {
        config.reproducibility.seed = seed;
    }
    run_demo(&config)
}

/// Run every component `config` enables, writing one artifact each.
///
/// # Errors
///
/// Returns error if a run or export fails.
pub fn run_demo(config: &DemoConfig) -> SimResult<()> {
    std::fs::create_dir_all(&config.output.directory)?;
    let exporter = Exporter::new(config.output.format);

    if config.monte_carlo.enabled {
        let mut rng = SimRng::new(config.reproducibility.seed);
        let samples = estimate_pi(config.monte_carlo.samples, &mut rng)?;
        if let Some(summary) = summarize(&samples) {
            print_pi_summary(&summary);
        }
        let path = config.output.artifact("pi");
        exporter.export_samples(&samples, config.monte_carlo.frames, &path)?;
        info!(path = %path.display(), "wrote π samples");
    }

    if config.bloch.enabled {
        let b = &config.bloch;
        let params = b.parameters();
        let trajectory = integrate_obe(b.initial(), &params, b.horizon, b.samples, &b.solver)?;
        print_bloch_summary(&trajectory, equilibrium(&params).ok());
        let path = config.output.artifact("bloch");
        exporter.export_trajectory(&trajectory, &path)?;
        info!(path = %path.display(), "wrote trajectory");
    }

    Ok(())
}
