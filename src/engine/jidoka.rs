//! Jidoka (自働化) - Autonomous anomaly detection.
//!
//! Implements Toyota's Jidoka principle: stop the run as soon as the
//! numerics produce something physically impossible, instead of handing a
//! corrupted trajectory downstream.
//!
//! # Monitored Anomaly
//!
//! **Energy drift**: between collisions an undriven, undamped lato-lato
//! conserves mechanical energy. Relative drift from the baseline is
//! classified with graduated severity:
//! - **Acceptable**: Within tolerance, continue normally
//! - **Warning**: Approaching tolerance, log and continue
//! - **Critical**: Tolerance exceeded, stop the line
//! - **Fatal**: Non-finite energy, halt immediately
//!
//! The baseline is re-taken after every collision, since an inelastic
//! exchange legitimately removes energy. Driven or damped systems exchange
//! energy with the environment and are never checked.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::params::PhysicalParameters;
use crate::engine::state::SystemState;
use crate::error::{SimError, SimResult};

/// Severity levels for Jidoka violations.
///
/// Graduated response avoids false positives (Muda of over-processing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationSeverity {
    /// Acceptable variance within tolerance (continue).
    Acceptable,
    /// Warning: approaching tolerance boundary (log, continue).
    Warning,
    /// Critical: tolerance exceeded (stop the line).
    Critical,
    /// Fatal: unrecoverable state (halt immediately).
    Fatal,
}

/// Warning from Jidoka check (non-critical issue).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JidokaWarning {
    /// Energy drift approaching tolerance.
    EnergyDriftApproaching {
        /// Simulation time of the check.
        time: f64,
        /// Current drift value.
        drift: f64,
        /// Tolerance threshold.
        tolerance: f64,
    },
}

/// Classifier for graduated Jidoka responses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct SeverityClassifier {
    /// Warning threshold as fraction of tolerance (e.g., 0.8 = warn at 80%).
    #[validate(range(min = 0.0, max = 1.0))]
    pub warning_fraction: f64,
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self {
            warning_fraction: 0.8,
        }
    }
}

impl SeverityClassifier {
    /// Create a new severity classifier.
    #[must_use]
    pub const fn new(warning_fraction: f64) -> Self {
        Self { warning_fraction }
    }

    /// Classify energy drift severity.
    #[must_use]
    pub fn classify_energy_drift(&self, drift: f64, tolerance: f64) -> ViolationSeverity {
        if drift.is_nan() || drift.is_infinite() {
            ViolationSeverity::Fatal
        } else if drift > tolerance {
            ViolationSeverity::Critical
        } else if drift > tolerance * self.warning_fraction {
            ViolationSeverity::Warning
        } else {
            ViolationSeverity::Acceptable
        }
    }
}

/// Jidoka guard configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct JidokaConfig {
    /// Enable energy conservation check.
    #[serde(default)]
    pub check_energy: bool,
    /// Maximum allowed relative energy drift.
    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_energy_tolerance")]
    pub energy_tolerance: f64,
    /// Severity classifier for graduated responses.
    #[validate(nested)]
    #[serde(default)]
    pub severity_classifier: SeverityClassifier,
}

const fn default_energy_tolerance() -> f64 {
    0.01
}

impl Default for JidokaConfig {
    fn default() -> Self {
        Self {
            check_energy: false,
            energy_tolerance: default_energy_tolerance(),
            severity_classifier: SeverityClassifier::default(),
        }
    }
}

impl JidokaConfig {
    /// Enabled energy check with the given tolerance.
    #[must_use]
    pub fn energy(tolerance: f64) -> Self {
        Self {
            check_energy: true,
            energy_tolerance: tolerance,
            ..Self::default()
        }
    }
}

/// Jidoka guard for autonomous anomaly detection.
///
/// # Example
///
/// ```rust
/// use latolato::engine::jidoka::{JidokaConfig, JidokaGuard};
/// use latolato::engine::params::{DriveConfig, PhysicalParameters};
/// use latolato::engine::state::SystemState;
///
/// let params = PhysicalParameters::default().with_drive(DriveConfig::none());
/// let mut guard = JidokaGuard::new(JidokaConfig::energy(0.01), &params);
/// let state = SystemState::from_initial(0.0, [0.1, -0.1], [0.0, 0.0]);
///
/// // First check records the baseline
/// assert!(guard.check(&state).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct JidokaGuard {
    /// Configuration.
    config: JidokaConfig,
    /// Parameters used to evaluate energy.
    params: PhysicalParameters,
    /// Baseline energy (set on first check).
    baseline: Option<f64>,
}

impl JidokaGuard {
    /// Create a new Jidoka guard with given configuration.
    #[must_use]
    pub const fn new(config: JidokaConfig, params: &PhysicalParameters) -> Self {
        Self {
            config,
            params: *params,
            baseline: None,
        }
    }

    /// Whether checks run at all for these parameters.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.config.check_energy && self.params.is_conservative()
    }

    /// Check state with graduated severity.
    ///
    /// Call after every accepted step. Returns a warning for drift
    /// approaching the tolerance without stopping.
    ///
    /// # Errors
    ///
    /// Returns `SimError::EnergyDrift` for Critical or Fatal drift.
    pub fn check(&mut self, state: &SystemState) -> SimResult<Option<JidokaWarning>> {
        if !self.is_active() {
            return Ok(None);
        }

        let current = self.params.mechanical_energy(state);
        let Some(baseline) = self.baseline else {
            self.baseline = Some(current);
            return Ok(None);
        };

        // A system at rest has nothing to drift from.
        if baseline.abs() < f64::EPSILON && current.is_finite() {
            return Ok(None);
        }

        let drift = (current - baseline).abs() / baseline.abs().max(f64::EPSILON);
        let tolerance = self.config.energy_tolerance;
        match self
            .config
            .severity_classifier
            .classify_energy_drift(drift, tolerance)
        {
            ViolationSeverity::Acceptable => Ok(None),
            ViolationSeverity::Warning => Ok(Some(JidokaWarning::EnergyDriftApproaching {
                time: state.time,
                drift,
                tolerance,
            })),
            ViolationSeverity::Critical | ViolationSeverity::Fatal => {
                Err(SimError::EnergyDrift { drift, tolerance })
            }
        }
    }

    /// Take a new baseline from `state` (after a collision).
    pub fn rebaseline(&mut self, state: &SystemState) {
        if self.is_active() {
            self.baseline = Some(self.params.mechanical_energy(state));
        }
    }

    /// Reset the guard (clear baseline).
    pub fn reset(&mut self) {
        self.baseline = None;
    }

    /// Current baseline energy.
    #[must_use]
    pub const fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Get current configuration.
    #[must_use]
    pub const fn config(&self) -> &JidokaConfig {
        &self.config
    }
}
