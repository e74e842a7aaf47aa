//! physdemo CLI
//!
//! Command-line interface for the π and Bloch-equation demonstrations.

use std::process::ExitCode;

use physdemo::cli::{run_cli, Args};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose());
    run_cli(args)
}

/// `RUST_LOG` wins; otherwise `-v` selects debug and the default is warn.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
