//! Lato-lato scenarios.
//!
//! Ready-made parameter sets for the classic experiments:
//! - Symmetric release (two identical balls dropped from ±0.1 rad)
//! - Hand-rocked pivot (angular drive)
//! - Resonant drive at the natural frequency
//! - Vertically oscillating pivot
//! - Inelastic and damped variants

use serde::{Deserialize, Serialize};

use crate::config::InitialConditions;
use crate::engine::params::{BodyParameters, DriveConfig, PhysicalParameters};
use crate::engine::Simulator;
use crate::error::SimResult;

/// A parameter set together with its initial conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatoLatoScenario {
    /// Physical parameters.
    pub params: PhysicalParameters,
    /// Initial angles and angular velocities.
    pub initial: InitialConditions,
}

impl Default for LatoLatoScenario {
    fn default() -> Self {
        Self::symmetric_release()
    }
}

impl LatoLatoScenario {
    /// Create a scenario.
    #[must_use]
    pub const fn new(params: PhysicalParameters, initial: InitialConditions) -> Self {
        Self { params, initial }
    }

    /// Identical balls (L = 1 m, m = 0.1 kg, r = 0.05 m) released from
    /// ±0.1 rad on an undriven pivot, elastic collisions.
    #[must_use]
    pub fn symmetric_release() -> Self {
        Self {
            params: PhysicalParameters::symmetric(BodyParameters::default())
                .with_drive(DriveConfig::none()),
            initial: InitialConditions::default(),
        }
    }

    /// Hand-rocked pivot: driving angle `0.1 sin(2 t)`.
    #[must_use]
    pub fn driven() -> Self {
        let base = Self::symmetric_release();
        Self {
            params: base.params.with_drive(DriveConfig::angular(0.1, 2.0)),
            ..base
        }
    }

    /// Angular drive at the small-oscillation natural frequency `√(g/L)`.
    #[must_use]
    pub fn resonant() -> Self {
        let base = Self::symmetric_release();
        let natural = (base.params.gravity / base.params.bodies[0].arm_length).sqrt();
        Self {
            params: base.params.with_drive(DriveConfig::angular(0.1, natural)),
            ..base
        }
    }

    /// Pivot oscillating vertically with amplitude 0.1 m at 2 rad/s.
    #[must_use]
    pub fn vertical_pivot() -> Self {
        let base = Self::symmetric_release();
        Self {
            params: base.params.with_drive(DriveConfig::vertical_pivot(0.1, 2.0)),
            ..base
        }
    }

    /// Symmetric release with restitution `e`.
    #[must_use]
    pub fn inelastic(restitution: f64) -> Self {
        let base = Self::symmetric_release();
        Self {
            params: base.params.with_restitution(restitution),
            ..base
        }
    }

    /// Symmetric release with linear angular damping.
    #[must_use]
    pub fn damped(damping: f64) -> Self {
        let base = Self::symmetric_release();
        Self {
            params: base.params.with_damping(damping),
            ..base
        }
    }

    /// Override the initial conditions.
    #[must_use]
    pub const fn with_initial(mut self, angles: [f64; 2], angular_velocities: [f64; 2]) -> Self {
        self.initial = InitialConditions {
            angles,
            angular_velocities,
        };
        self
    }

    /// Small-oscillation period of body 0.
    #[must_use]
    pub fn small_angle_period(&self) -> f64 {
        self.params.small_angle_period(0)
    }

    /// Build a simulator for this scenario.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidParameters` if the scenario was modified
    /// into an invalid state.
    pub fn simulator(&self) -> SimResult<Simulator> {
        Simulator::new(
            self.initial.angles,
            self.initial.angular_velocities,
            self.params,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::engine::params::DriveModel;

    #[test]
    fn test_symmetric_release() {
        let s = LatoLatoScenario::symmetric_release();
        assert!(s.params.is_conservative());
        assert!((s.params.restitution - 1.0).abs() < f64::EPSILON);
        assert_eq!(s.initial.angles, [0.1, -0.1]);
        assert_eq!(LatoLatoScenario::default(), s);
    }

    #[test]
    fn test_driven() {
        let s = LatoLatoScenario::driven();
        assert_eq!(s.params.drive.model, DriveModel::Angular);
        assert!((s.params.drive.amplitude - 0.1).abs() < f64::EPSILON);
        assert!(!s.params.is_conservative());
    }

    #[test]
    fn test_resonant_frequency() {
        let s = LatoLatoScenario::resonant();
        let period = 2.0 * std::f64::consts::PI / s.params.drive.angular_frequency;
        assert!((period - s.small_angle_period()).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_pivot() {
        let s = LatoLatoScenario::vertical_pivot();
        assert_eq!(s.params.drive.model, DriveModel::VerticalPivot);
    }

    #[test]
    fn test_variants_valid() {
        for s in [
            LatoLatoScenario::symmetric_release(),
            LatoLatoScenario::driven(),
            LatoLatoScenario::resonant(),
            LatoLatoScenario::vertical_pivot(),
            LatoLatoScenario::inelastic(0.5),
            LatoLatoScenario::damped(0.1),
        ] {
            assert!(s.params.check().is_ok());
            assert!(s.simulator().is_ok());
        }
    }

    #[test]
    fn test_invalid_restitution_rejected() {
        assert!(LatoLatoScenario::inelastic(2.0).simulator().is_err());
    }

    #[test]
    fn test_with_initial() {
        let s = LatoLatoScenario::symmetric_release().with_initial([0.3, 0.0], [0.0, 1.0]);
        assert_eq!(s.initial.angles, [0.3, 0.0]);
        assert_eq!(s.initial.angular_velocities, [0.0, 1.0]);
    }
}
