//! CLI module for physdemo.
//!
//! All CLI logic lives here rather than in main.rs so it can be tested. The
//! entry point `run_cli` is called from main.rs with parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, BlochOptions, Command, PiOptions};
pub use commands::{run_bloch, run_cli, run_config, run_demo, run_pi};
pub use output::{print_bloch_summary, print_help, print_pi_summary, print_version};
