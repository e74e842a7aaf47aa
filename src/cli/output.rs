//! CLI output formatting.

use crate::domains::bloch::{BlochVector, Trajectory};
use crate::domains::monte_carlo::PiSummary;

/// Print version information.
pub fn print_version() {
    let version = option_env!("PHYSDEMO_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    match option_env!("GIT_HASH").filter(|h| !h.is_empty()) {
        Some(hash) => println!("physdemo {version} ({hash})"),
        None => println!("physdemo {version}"),
    }
}

/// Print help message.
pub fn print_help() {
    println!(
        r"physdemo - Monte Carlo π and optical Bloch equation demonstrations

USAGE:
    physdemo <COMMAND> [OPTIONS]

COMMANDS:
    pi                          Estimate π by uniform sampling of [-1,1]²
        -n, --samples <N>       Number of samples (default: 1000000)
        --seed <N>              RNG seed (default: 42)
        --frames <N>            Animation frames for --format frames (default: 50)
        -o, --output <PATH>     Write samples to PATH
        --format <FMT>          csv | jsonl | frames (default: csv)
        -v, --verbose           Enable debug logging

    bloch                       Integrate the optical Bloch equations from (0,0,1)
        --omega <X>             Rabi frequency (default: 2)
        --delta <X>             Detuning (default: 0)
        --gamma <X>             Coherence decay rate (default: 0.3)
        --decay <X>             Population decay rate (default: 2*gamma)
        --horizon <T>           Integration horizon (default: 10)
        -n, --samples <N>       Output samples (default: 100)
        --rk4 <N>               Fixed-step RK4 with N substeps per sample
        -o, --output <PATH>     Write the trajectory to PATH
        --format <FMT>          csv | jsonl | frames (default: csv)
        -v, --verbose           Enable debug logging

    run <config.yaml>           Run everything the configuration enables
        --seed <N>              Override the configured seed
        -v, --verbose           Enable debug logging

    help                        Show this help message
    version                     Show version information

EXAMPLES:
    physdemo pi --samples 100000 --output pi.csv
    physdemo bloch --omega 1 --delta 0.5 --format frames -o obe.jsonl
    physdemo run demo.yaml --seed 7

Set RUST_LOG to override the log filter."
    );
}

/// Print the outcome of a π run.
pub fn print_pi_summary(summary: &PiSummary) {
    println!("Monte Carlo π");
    println!("  Samples:        {}", summary.samples);
    println!("  Inside circle:  {}", summary.inliers);
    println!("  Estimate:       {:.6}", summary.estimate);
    println!("  Standard error: {:.6}", summary.standard_error);
    println!("  |π - estimate|: {:.6}", summary.absolute_error);
}

/// Print the outcome of a Bloch integration.
pub fn print_bloch_summary(trajectory: &Trajectory, equilibrium: Option<BlochVector>) {
    let p = trajectory.params();
    let stats = trajectory.stats();

    println!("Optical Bloch equations");
    println!(
        "  Ω = {}, Δ = {}, γ = {}, Γ = {}",
        p.omega, p.delta, p.gamma, p.population_decay
    );
    println!(
        "  Samples: {} over t ∈ [0, {}]",
        trajectory.len(),
        trajectory.horizon()
    );
    println!(
        "  Steps: {} accepted, {} rejected, {} RHS evaluations",
        stats.accepted, stats.rejected, stats.rhs_evals
    );
    if let Some(s) = trajectory.final_state() {
        println!(
            "  Final state: ({:.6}, {:.6}, {:.6})  |s| = {:.6}",
            s.s1,
            s.s2,
            s.s3,
            s.norm()
        );
    }
    match equilibrium {
        Some(eq) => println!(
            "  Equilibrium: ({:.6}, {:.6}, {:.6})",
            eq.s1, eq.s2, eq.s3
        ),
        None => println!("  Equilibrium: none (undamped system)"),
    }
}
