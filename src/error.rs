//! Error types for latolato.
//!
//! All fallible operations return `Result<T, SimError>` instead of
//! panicking. Construction-time errors abort before any state exists;
//! run-time errors travel inside [`RunFailure`] together with the partial
//! trajectory produced so far.

use std::time::Duration;

use thiserror::Error;

use crate::engine::trajectory::Trajectory;

/// Result type alias for latolato operations.
pub type SimResult<T> = Result<T, SimError>;

/// Unified error type for all latolato operations.
#[derive(Debug, Error)]
pub enum SimError {
    // ===== Construction Errors =====
    /// Physical parameters or initial conditions out of range.
    #[error("Invalid parameters: {message}")]
    InvalidParameters {
        /// Description of the offending parameter.
        message: String,
    },

    // ===== Run-time Errors =====
    /// Adaptive step size collapsed below the configured floor.
    #[error("Integration diverged at t={time:.6e}: step {step:.3e} below floor {min_step:.3e}")]
    IntegrationDivergence {
        /// Time of the last accepted state.
        time: f64,
        /// Step size that would have been tried next.
        step: f64,
        /// Configured minimum step size.
        min_step: f64,
    },

    /// Zero arm length met while converting collision velocities.
    #[error("Degenerate geometry: body {body} has zero arm length")]
    DegenerateGeometry {
        /// Index of the offending body.
        body: usize,
    },

    /// Wall-clock budget exceeded.
    #[error("Cancelled at t={time:.6}: wall-clock budget of {budget:?} exceeded")]
    Cancelled {
        /// Simulation time reached when the run was aborted.
        time: f64,
        /// Configured budget.
        budget: Duration,
    },

    // ===== Jidoka Violations =====
    /// Energy conservation violated beyond tolerance.
    #[error("Jidoka: energy drift {drift:.6e} exceeds tolerance {tolerance:.6e}")]
    EnergyDrift {
        /// Relative energy drift from the baseline.
        drift: f64,
        /// Configured tolerance threshold.
        tolerance: f64,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SimError {
    /// Create an invalid-parameters error with a message.
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error can only arise while a run is in progress.
    #[must_use]
    pub const fn is_run_time(&self) -> bool {
        matches!(
            self,
            Self::IntegrationDivergence { .. }
                | Self::DegenerateGeometry { .. }
                | Self::Cancelled { .. }
                | Self::EnergyDrift { .. }
        )
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// A run that stopped before reaching its end time.
///
/// Carries the trajectory up to the last good state so the caller can
/// decide whether a partial result is acceptable.
#[derive(Debug, Error)]
#[error("{error} ({} samples recovered)", .partial.len())]
pub struct RunFailure {
    /// Why the run stopped.
    #[source]
    pub error: SimError,
    /// Samples and collisions recorded before the failure.
    pub partial: Trajectory,
}

impl RunFailure {
    /// Bundle an error with the trajectory produced so far.
    #[must_use]
    pub const fn new(error: SimError, partial: Trajectory) -> Self {
        Self { error, partial }
    }
}
