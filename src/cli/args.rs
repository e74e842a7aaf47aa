//! CLI argument parsing.
//!
//! The parser accepts any iterator of strings so it can be tested without
//! touching `std::env::args()`.

use std::path::PathBuf;
use std::str::FromStr;

use crate::domains::bloch::SimulationParameters;
use crate::visualization::ExportFormat;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Options of the `pi` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiOptions {
    /// Number of samples to draw.
    pub samples: u64,
    /// RNG seed.
    pub seed: u64,
    /// Animation frames for `--format frames`.
    pub frames: usize,
    /// Output file; summary only when absent.
    pub output: Option<PathBuf>,
    /// Output format.
    pub format: ExportFormat,
    /// Enable verbose output.
    pub verbose: bool,
}

impl Default for PiOptions {
    fn default() -> Self {
        Self {
            samples: 1_000_000,
            seed: 42,
            frames: 50,
            output: None,
            format: ExportFormat::Csv,
            verbose: false,
        }
    }
}

/// Options of the `bloch` command.
#[derive(Debug, Clone, PartialEq)]
pub struct BlochOptions {
    /// Rabi frequency Ω.
    pub omega: f64,
    /// Detuning Δ.
    pub delta: f64,
    /// Coherence decay rate γ.
    pub gamma: f64,
    /// Population decay rate Γ; `2γ` when absent.
    pub decay: Option<f64>,
    /// Integration horizon.
    pub horizon: f64,
    /// Number of output samples.
    pub samples: usize,
    /// Use fixed-step RK4 with this many substeps instead of Dormand-Prince.
    pub rk4_substeps: Option<usize>,
    /// Output file; summary only when absent.
    pub output: Option<PathBuf>,
    /// Output format.
    pub format: ExportFormat,
    /// Enable verbose output.
    pub verbose: bool,
}

impl Default for BlochOptions {
    fn default() -> Self {
        Self {
            omega: 2.0,
            delta: 0.0,
            gamma: 0.3,
            decay: None,
            horizon: 10.0,
            samples: 100,
            rk4_substeps: None,
            output: None,
            format: ExportFormat::Csv,
            verbose: false,
        }
    }
}

impl BlochOptions {
    /// Physical parameters described by these options.
    #[must_use]
    pub fn parameters(&self) -> SimulationParameters {
        match self.decay {
            Some(decay) => SimulationParameters::new(self.omega, self.delta, self.gamma, decay),
            None => SimulationParameters::radiative(self.omega, self.delta, self.gamma),
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Estimate π by Monte Carlo sampling.
    Pi(PiOptions),
    /// Integrate the optical Bloch equations.
    Bloch(BlochOptions),
    /// Run everything a YAML configuration enables.
    Run {
        /// Path to the configuration file.
        config_path: PathBuf,
        /// Optional seed override.
        seed_override: Option<u64>,
        /// Enable verbose output.
        verbose: bool,
    },
    /// Show help
    Help,
    /// Show version
    Version,
    /// Malformed command line.
    Invalid(String),
}

impl Args {
    /// Parse command-line arguments from an iterator.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    /// Whether the command asked for debug logging.
    #[must_use]
    pub const fn verbose(&self) -> bool {
        match &self.command {
            Command::Pi(opts) => opts.verbose,
            Command::Bloch(opts) => opts.verbose,
            Command::Run { verbose, .. } => *verbose,
            Command::Help | Command::Version | Command::Invalid(_) => false,
        }
    }

    fn parse_from_vec(args: &[String]) -> Self {
        let Some(name) = args.get(1) else {
            return Self {
                command: Command::Help,
            };
        };
        let rest = &args[2..];

        let parsed = match name.as_str() {
            "pi" => Self::parse_pi_command(rest).map(Command::Pi),
            "bloch" => Self::parse_bloch_command(rest).map(Command::Bloch),
            "run" => Self::parse_run_command(rest),
            "-h" | "--help" | "help" => Ok(Command::Help),
            "-V" | "--version" | "version" => Ok(Command::Version),
            unknown => Err(format!("unknown command: {unknown}")),
        };

        Self {
            command: parsed.unwrap_or_else(Command::Invalid),
        }
    }

    fn parse_pi_command(args: &[String]) -> Result<PiOptions, String> {
        let mut opts = PiOptions::default();
        let mut flags = Flags::new(args);

        while let Some(flag) = flags.next_flag()? {
            match flag {
                "--samples" | "-n" => opts.samples = flags.value(flag)?,
                "--seed" => opts.seed = flags.value(flag)?,
                "--frames" => opts.frames = flags.value(flag)?,
                "--output" | "-o" => opts.output = Some(flags.value(flag)?),
                "--format" => opts.format = flags.value(flag)?,
                "-v" | "--verbose" => opts.verbose = true,
                other => return Err(format!("unknown option for 'pi': {other}")),
            }
        }
        Ok(opts)
    }

    fn parse_bloch_command(args: &[String]) -> Result<BlochOptions, String> {
        let mut opts = BlochOptions::default();
        let mut flags = Flags::new(args);

        while let Some(flag) = flags.next_flag()? {
            match flag {
                "--omega" => opts.omega = flags.value(flag)?,
                "--delta" => opts.delta = flags.value(flag)?,
                "--gamma" => opts.gamma = flags.value(flag)?,
                "--decay" => opts.decay = Some(flags.value(flag)?),
                "--horizon" => opts.horizon = flags.value(flag)?,
                "--samples" | "-n" => opts.samples = flags.value(flag)?,
                "--rk4" => opts.rk4_substeps = Some(flags.value(flag)?),
                "--output" | "-o" => opts.output = Some(flags.value(flag)?),
                "--format" => opts.format = flags.value(flag)?,
                "-v" | "--verbose" => opts.verbose = true,
                other => return Err(format!("unknown option for 'bloch': {other}")),
            }
        }
        Ok(opts)
    }

    fn parse_run_command(args: &[String]) -> Result<Command, String> {
        let Some(path) = args.first() else {
            return Err("'run' command requires a configuration path".to_string());
        };

        let mut seed_override = None;
        let mut verbose = false;
        let mut flags = Flags::new(&args[1..]);

        while let Some(flag) = flags.next_flag()? {
            match flag {
                "--seed" => seed_override = Some(flags.value(flag)?),
                "-v" | "--verbose" => verbose = true,
                other => return Err(format!("unknown option for 'run': {other}")),
            }
        }

        Ok(Command::Run {
            config_path: PathBuf::from(path),
            seed_override,
            verbose,
        })
    }
}

/// Cursor over `--flag value` pairs.
struct Flags<'a> {
    args: &'a [String],
    pos: usize,
}

impl<'a> Flags<'a> {
    const fn new(args: &'a [String]) -> Self {
        Self { args, pos: 0 }
    }

    fn next_flag(&mut self) -> Result<Option<&'a str>, String> {
        let Some(arg) = self.args.get(self.pos) else {
            return Ok(None);
        };
        self.pos += 1;
        if arg.starts_with('-') {
            Ok(Some(arg.as_str()))
        } else {
            Err(format!("unexpected argument: {arg}"))
        }
    }

    fn value<T>(&mut self, flag: &str) -> Result<T, String>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(raw) = self.args.get(self.pos) else {
            return Err(format!("{flag} requires a value"));
        };
        self.pos += 1;
        raw.parse()
            .map_err(|e| format!("invalid value '{raw}' for {flag}: {e}"))
    }
}
