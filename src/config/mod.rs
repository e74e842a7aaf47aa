//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs
//! - Unknown keys rejected at parse time
//! - Range checks via `validator`, then semantic validation
//!
//! Every field has a default, so an empty document is a valid configuration
//! that reproduces the classic demonstration runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domains::bloch::{BlochVector, SimulationParameters};
use crate::domains::ode::SolverConfig;
use crate::error::{SimError, SimResult};
use crate::visualization::ExportFormat;

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DemoConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Reproducibility settings.
    #[validate(nested)]
    #[serde(default)]
    pub reproducibility: ReproducibilityConfig,

    /// π estimator run.
    #[validate(nested)]
    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,

    /// Optical Bloch equation run.
    #[validate(nested)]
    #[serde(default)]
    pub bloch: BlochConfig,

    /// Where and how results are written.
    #[validate(nested)]
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            reproducibility: ReproducibilityConfig::default(),
            monte_carlo: MonteCarloConfig::default(),
            bloch: BlochConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - YAML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SimResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Run both validation layers.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for range violations and `Config` for semantic ones.
    pub fn check(&self) -> SimResult<()> {
        self.validate()?;
        self.validate_semantic()
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> DemoConfigBuilder {
        DemoConfigBuilder::default()
    }

    fn validate_semantic(&self) -> SimResult<()> {
        if !self.monte_carlo.enabled && !self.bloch.enabled {
            return Err(SimError::config(
                "nothing to run: both monte_carlo and bloch are disabled",
            ));
        }

        let b = &self.bloch;
        for (name, value) in [
            ("omega", b.omega),
            ("delta", b.delta),
            ("gamma", b.gamma),
            ("population_decay", b.population_decay.unwrap_or(0.0)),
            ("horizon", b.horizon),
        ] {
            if !value.is_finite() {
                return Err(SimError::config(format!("bloch.{name} must be finite")));
            }
        }
        if b.initial_state.iter().any(|v| !v.is_finite()) {
            return Err(SimError::config("bloch.initial_state must be finite"));
        }
        if b.horizon <= 0.0 {
            return Err(SimError::config(format!(
                "bloch.horizon must be positive, got {}",
                b.horizon
            )));
        }
        b.solver
            .validate()
            .map_err(|e| SimError::config(format!("bloch.solver: {e}")))?;

        Ok(())
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct DemoConfigBuilder {
    seed: Option<u64>,
    pi_samples: Option<u64>,
    frames: Option<usize>,
    parameters: Option<SimulationParameters>,
    horizon: Option<f64>,
    solver: Option<SolverConfig>,
    format: Option<ExportFormat>,
}

impl DemoConfigBuilder {
    /// Set the random seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of π samples.
    #[must_use]
    pub const fn pi_samples(mut self, samples: u64) -> Self {
        self.pi_samples = Some(samples);
        self
    }

    /// Set the number of π animation frames.
    #[must_use]
    pub const fn frames(mut self, frames: usize) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Set the Bloch parameters.
    #[must_use]
    pub const fn parameters(mut self, params: SimulationParameters) -> Self {
        self.parameters = Some(params);
        self
    }

    /// Set the integration horizon.
    #[must_use]
    pub const fn horizon(mut self, horizon: f64) -> Self {
        self.horizon = Some(horizon);
        self
    }

    /// Set the ODE solver.
    #[must_use]
    pub const fn solver(mut self, solver: SolverConfig) -> Self {
        self.solver = Some(solver);
        self
    }

    /// Set the output format.
    #[must_use]
    pub const fn format(mut self, format: ExportFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> DemoConfig {
        let mut config = DemoConfig::default();

        if let Some(seed) = self.seed {
            config.reproducibility.seed = seed;
        }
        if let Some(samples) = self.pi_samples {
            config.monte_carlo.samples = samples;
        }
        if let Some(frames) = self.frames {
            config.monte_carlo.frames = frames;
        }
        if let Some(p) = self.parameters {
            config.bloch.omega = p.omega;
            config.bloch.delta = p.delta;
            config.bloch.gamma = p.gamma;
            config.bloch.population_decay = Some(p.population_decay);
        }
        if let Some(horizon) = self.horizon {
            config.bloch.horizon = horizon;
        }
        if let Some(solver) = self.solver {
            config.bloch.solver = solver;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }

        config
    }
}

/// Reproducibility settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ReproducibilityConfig {
    /// Master seed for all RNG.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

const fn default_seed() -> u64 {
    42
}

impl Default for ReproducibilityConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

/// π estimator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct MonteCarloConfig {
    /// Whether the estimator runs.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of samples.
    #[validate(range(min = 1))]
    #[serde(default = "default_pi_samples")]
    pub samples: u64,
    /// Animation frames when exporting rendered frames.
    #[validate(range(min = 1))]
    #[serde(default = "default_frames")]
    pub frames: usize,
}

const fn default_true() -> bool {
    true
}

const fn default_pi_samples() -> u64 {
    1_000_000
}

const fn default_frames() -> usize {
    50
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            samples: default_pi_samples(),
            frames: default_frames(),
        }
    }
}

/// Optical Bloch equation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct BlochConfig {
    /// Whether the integrator runs.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Rabi frequency Ω.
    #[serde(default = "default_omega")]
    pub omega: f64,
    /// Detuning Δ.
    #[serde(default)]
    pub delta: f64,
    /// Coherence decay rate γ.
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    /// Population decay rate Γ; `2γ` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population_decay: Option<f64>,
    /// Initial Bloch vector.
    #[serde(default = "default_initial_state")]
    pub initial_state: [f64; 3],
    /// Integration horizon T.
    #[serde(default = "default_horizon")]
    pub horizon: f64,
    /// Number of output samples.
    #[validate(range(min = 2))]
    #[serde(default = "default_bloch_samples")]
    pub samples: usize,
    /// ODE solver.
    #[serde(default)]
    pub solver: SolverConfig,
}

const fn default_omega() -> f64 {
    2.0
}

const fn default_gamma() -> f64 {
    0.3
}

const fn default_initial_state() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}

const fn default_horizon() -> f64 {
    10.0
}

const fn default_bloch_samples() -> usize {
    100
}

impl Default for BlochConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            omega: default_omega(),
            delta: 0.0,
            gamma: default_gamma(),
            population_decay: None,
            initial_state: default_initial_state(),
            horizon: default_horizon(),
            samples: default_bloch_samples(),
            solver: SolverConfig::default(),
        }
    }
}

impl BlochConfig {
    /// Physical parameters, applying `Γ = 2γ` when Γ is not given.
    #[must_use]
    pub fn parameters(&self) -> SimulationParameters {
        match self.population_decay {
            Some(decay) => SimulationParameters::new(self.omega, self.delta, self.gamma, decay),
            None => SimulationParameters::radiative(self.omega, self.delta, self.gamma),
        }
    }

    /// Initial state as a Bloch vector.
    #[must_use]
    pub fn initial(&self) -> BlochVector {
        BlochVector::from(self.initial_state)
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving `pi.*` and `bloch.*`.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Artifact format.
    #[serde(default)]
    pub format: ExportFormat,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            format: ExportFormat::default(),
        }
    }
}

impl OutputConfig {
    /// Path of the artifact named `stem` in the configured format.
    #[must_use]
    pub fn artifact(&self, stem: &str) -> PathBuf {
        let file = match self.format {
            ExportFormat::Csv => format!("{stem}.csv"),
            ExportFormat::JsonLines => format!("{stem}.jsonl"),
            ExportFormat::Frames => format!("{stem}.frames.jsonl"),
        };
        self.directory.join(file)
    }
}
