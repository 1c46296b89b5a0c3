//! Configuration system with YAML schema and validation.
//!
//! Implements Poka-Yoke (mistake-proofing) through:
//! - Type-safe configuration structs
//! - Schema ranges checked by `validator`
//! - Runtime semantic validation
//!
//! # Example
//!
//! ```yaml
//! schema_version: "1.0"
//! simulation:
//!   name: driven-lato
//! physics:
//!   bodies:
//!     - { arm_length: 1.0, mass: 0.1, radius: 0.05 }
//!     - { arm_length: 1.0, mass: 0.1, radius: 0.05 }
//!   drive: { model: angular, amplitude: 0.1, angular_frequency: 2.0 }
//!   restitution: 0.9
//! initial:
//!   angles: [0.1, -0.1]
//! run:
//!   t_end: 20.0
//!   sample_count: 2001
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::domains::collision::DEFAULT_REFINE_ITERATIONS;
use crate::engine::jidoka::JidokaConfig;
use crate::engine::params::PhysicalParameters;
use crate::error::{SimError, SimResult};

/// Top-level simulation configuration.
///
/// Loaded from YAML files with full schema validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimConfig {
    /// Schema version for forward compatibility.
    #[validate(length(min = 1))]
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Simulation metadata.
    #[validate(nested)]
    #[serde(default)]
    pub simulation: SimulationMeta,

    /// Physical parameters.
    #[serde(default)]
    pub physics: PhysicalParameters,

    /// Initial conditions.
    #[serde(default)]
    pub initial: InitialConditions,

    /// Integrator settings.
    #[validate(nested)]
    #[serde(default)]
    pub solver: SolverConfig,

    /// Collision detection settings.
    #[validate(nested)]
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Run span and sampling.
    #[validate(nested)]
    #[serde(default)]
    pub run: RunConfig,

    /// Jidoka (stop-on-error) configuration.
    #[validate(nested)]
    #[serde(default)]
    pub jidoka: JidokaConfig,
}

fn default_schema_version() -> String {
    "1.0".to_string()
}

impl SimConfig {
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

        // Poka-Yoke: validate all constraints
        config.validate()?;

        // Additional semantic validation
        config.validate_semantic()?;

        Ok(config)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> SimResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Create a builder for configuration.
    #[must_use]
    pub fn builder() -> SimConfigBuilder {
        SimConfigBuilder::default()
    }

    /// Validate semantic constraints beyond schema.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` for inconsistent run or solver settings
    /// and `SimError::InvalidParameters` for invalid physics or initial
    /// conditions.
    pub fn validate_semantic(&self) -> SimResult<()> {
        let run = &self.run;
        if !run.t0.is_finite() || !run.t_end.is_finite() {
            return Err(SimError::config("Run times must be finite"));
        }
        if run.t_end <= run.t0 {
            return Err(SimError::config(format!(
                "t_end ({}) must be greater than t0 ({})",
                run.t_end, run.t0
            )));
        }

        let solver = &self.solver;
        if solver.min_step >= solver.max_step {
            return Err(SimError::config(format!(
                "min_step ({}) must be smaller than max_step ({})",
                solver.min_step, solver.max_step
            )));
        }

        self.physics.check()?;
        self.initial.check()?;

        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            simulation: SimulationMeta::default(),
            physics: PhysicalParameters::default(),
            initial: InitialConditions::default(),
            solver: SolverConfig::default(),
            detection: DetectionConfig::default(),
            run: RunConfig::default(),
            jidoka: JidokaConfig::default(),
        }
    }
}

/// Configuration builder for programmatic construction.
#[derive(Debug, Default)]
pub struct SimConfigBuilder {
    name: Option<String>,
    physics: Option<PhysicalParameters>,
    initial: Option<InitialConditions>,
    span: Option<(f64, f64)>,
    sample_count: Option<usize>,
    tolerances: Option<(f64, f64)>,
    max_step: Option<f64>,
    refine_iterations: Option<u32>,
    time_budget_secs: Option<f64>,
    jidoka: Option<JidokaConfig>,
}

impl SimConfigBuilder {
    /// Set the simulation name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the physical parameters.
    #[must_use]
    pub const fn physics(mut self, physics: PhysicalParameters) -> Self {
        self.physics = Some(physics);
        self
    }

    /// Set initial angles and angular velocities.
    #[must_use]
    pub const fn initial(mut self, angles: [f64; 2], angular_velocities: [f64; 2]) -> Self {
        self.initial = Some(InitialConditions {
            angles,
            angular_velocities,
        });
        self
    }

    /// Set the run span.
    #[must_use]
    pub const fn span(mut self, t0: f64, t_end: f64) -> Self {
        self.span = Some((t0, t_end));
        self
    }

    /// Set the number of evenly spaced samples.
    #[must_use]
    pub const fn sample_count(mut self, count: usize) -> Self {
        self.sample_count = Some(count);
        self
    }

    /// Set relative and absolute tolerances.
    #[must_use]
    pub const fn tolerances(mut self, rtol: f64, atol: f64) -> Self {
        self.tolerances = Some((rtol, atol));
        self
    }

    /// Set the maximum step size in seconds.
    #[must_use]
    pub const fn max_step(mut self, max_step: f64) -> Self {
        self.max_step = Some(max_step);
        self
    }

    /// Set the collision refinement iterations.
    #[must_use]
    pub const fn refine_iterations(mut self, iterations: u32) -> Self {
        self.refine_iterations = Some(iterations);
        self
    }

    /// Set the wall-clock budget in seconds.
    #[must_use]
    pub const fn time_budget_secs(mut self, secs: f64) -> Self {
        self.time_budget_secs = Some(secs);
        self
    }

    /// Set Jidoka configuration.
    #[must_use]
    pub const fn jidoka(mut self, config: JidokaConfig) -> Self {
        self.jidoka = Some(config);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SimConfig {
        let mut config = SimConfig::default();

        if let Some(name) = self.name {
            config.simulation.name = name;
        }
        if let Some(physics) = self.physics {
            config.physics = physics;
        }
        if let Some(initial) = self.initial {
            config.initial = initial;
        }
        if let Some((t0, t_end)) = self.span {
            config.run.t0 = t0;
            config.run.t_end = t_end;
        }
        if let Some(count) = self.sample_count {
            config.run.sample_count = count;
        }
        if let Some((rtol, atol)) = self.tolerances {
            config.solver.rtol = rtol;
            config.solver.atol = atol;
        }
        if let Some(max_step) = self.max_step {
            config.solver.max_step = max_step;
        }
        if let Some(iterations) = self.refine_iterations {
            config.detection.refine_iterations = iterations;
        }
        if self.time_budget_secs.is_some() {
            config.run.time_budget_secs = self.time_budget_secs;
        }
        if let Some(jidoka) = self.jidoka {
            config.jidoka = jidoka;
        }

        config
    }
}

/// Simulation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate)]
pub struct SimulationMeta {
    /// Simulation name.
    #[serde(default)]
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
}

/// Initial conditions at `t0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitialConditions {
    /// Initial angles (rad).
    pub angles: [f64; 2],
    /// Initial angular velocities (rad/s).
    #[serde(default)]
    pub angular_velocities: [f64; 2],
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            angles: [0.1, -0.1],
            angular_velocities: [0.0, 0.0],
        }
    }
}

impl InitialConditions {
    /// Check that all values are finite.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidParameters` for a non-finite value.
    pub fn check(&self) -> SimResult<()> {
        if self
            .angles
            .iter()
            .chain(&self.angular_velocities)
            .all(|v| v.is_finite())
        {
            Ok(())
        } else {
            Err(SimError::invalid_parameters(
                "initial angles and angular velocities must be finite",
            ))
        }
    }
}

/// Integrator settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SolverConfig {
    /// Relative tolerance.
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    #[serde(default = "default_rtol")]
    pub rtol: f64,
    /// Absolute tolerance.
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    #[serde(default = "default_atol")]
    pub atol: f64,
    /// Maximum step size (s).
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    #[serde(default = "default_max_step")]
    pub max_step: f64,
    /// Step size floor (s) below which integration is declared divergent.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_min_step")]
    pub min_step: f64,
}

const fn default_rtol() -> f64 {
    1e-6
}

const fn default_atol() -> f64 {
    1e-8
}

const fn default_max_step() -> f64 {
    0.01
}

const fn default_min_step() -> f64 {
    1e-10
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            rtol: default_rtol(),
            atol: default_atol(),
            max_step: default_max_step(),
            min_step: default_min_step(),
        }
    }
}

/// Collision detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct DetectionConfig {
    /// Bisection iterations on the dense output (0 = linear estimate).
    #[validate(range(max = 200))]
    #[serde(default = "default_refine_iterations")]
    pub refine_iterations: u32,
}

const fn default_refine_iterations() -> u32 {
    DEFAULT_REFINE_ITERATIONS
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            refine_iterations: default_refine_iterations(),
        }
    }
}

/// Run span and sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Start time (s).
    #[serde(default)]
    pub t0: f64,
    /// End time (s).
    #[serde(default = "default_t_end")]
    pub t_end: f64,
    /// Number of evenly spaced samples, both ends included.
    #[validate(range(min = 2))]
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,
    /// Wall-clock budget (s); unlimited when absent.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub time_budget_secs: Option<f64>,
}

const fn default_t_end() -> f64 {
    10.0
}

const fn default_sample_count() -> usize {
    1000
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            t0: 0.0,
            t_end: default_t_end(),
            sample_count: default_sample_count(),
            time_budget_secs: None,
        }
    }
}
