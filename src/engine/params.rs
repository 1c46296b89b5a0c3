//! Physical parameters of a lato-lato system.
//!
//! Parameters are fixed for the lifetime of a run. Validation happens once,
//! at simulator construction, and reports `SimError::InvalidParameters`;
//! nothing downstream re-checks them.

use serde::{Deserialize, Serialize};

use crate::engine::state::SystemState;
use crate::error::{SimError, SimResult};

/// Geometry and inertia of one pendulum body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyParameters {
    /// Arm (string) length from pivot to ball centre (m).
    pub arm_length: f64,
    /// Ball mass (kg).
    pub mass: f64,
    /// Ball radius (m).
    pub radius: f64,
}

impl Default for BodyParameters {
    fn default() -> Self {
        Self {
            arm_length: 1.0,
            mass: 0.1,
            radius: 0.05,
        }
    }
}

/// Pivot driving model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriveModel {
    /// No driving.
    None,
    /// Sinusoidal driving angle added to each body's angle (hand rocking).
    #[default]
    Angular,
    /// Sinusoidal vertical oscillation of the pivot.
    VerticalPivot,
}

/// Driving configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Driving model.
    #[serde(default)]
    pub model: DriveModel,
    /// Amplitude (rad for `angular`, m for `vertical-pivot`).
    #[serde(default)]
    pub amplitude: f64,
    /// Angular frequency (rad/s).
    #[serde(default = "default_drive_frequency")]
    pub angular_frequency: f64,
}

const fn default_drive_frequency() -> f64 {
    2.0
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            model: DriveModel::Angular,
            amplitude: 0.0,
            angular_frequency: default_drive_frequency(),
        }
    }
}

impl DriveConfig {
    /// Undriven pivot.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            model: DriveModel::None,
            amplitude: 0.0,
            angular_frequency: 0.0,
        }
    }

    /// Sinusoidal driving angle `A sin(ω t)`.
    #[must_use]
    pub const fn angular(amplitude: f64, angular_frequency: f64) -> Self {
        Self {
            model: DriveModel::Angular,
            amplitude,
            angular_frequency,
        }
    }

    /// Vertical pivot oscillation `A cos(ω t)`.
    #[must_use]
    pub const fn vertical_pivot(amplitude: f64, angular_frequency: f64) -> Self {
        Self {
            model: DriveModel::VerticalPivot,
            amplitude,
            angular_frequency,
        }
    }

    /// Whether the drive does any work on the system.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.model != DriveModel::None && self.amplitude != 0.0
    }
}

/// Process-wide, read-only parameters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhysicalParameters {
    /// Gravitational acceleration (m/s²).
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    /// Body parameters, indexed 0 and 1.
    pub bodies: [BodyParameters; 2],
    /// Pivot driving.
    #[serde(default)]
    pub drive: DriveConfig,
    /// Coefficient of restitution (1 = elastic, 0 = perfectly inelastic).
    #[serde(default = "default_restitution")]
    pub restitution: f64,
    /// Linear angular damping coefficient (1/s).
    #[serde(default)]
    pub damping: f64,
}

const fn default_gravity() -> f64 {
    9.81
}

const fn default_restitution() -> f64 {
    1.0
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self {
            gravity: default_gravity(),
            bodies: [BodyParameters::default(); 2],
            drive: DriveConfig::default(),
            restitution: default_restitution(),
            damping: 0.0,
        }
    }
}

impl PhysicalParameters {
    /// Both bodies identical.
    #[must_use]
    pub fn symmetric(body: BodyParameters) -> Self {
        Self {
            bodies: [body; 2],
            ..Self::default()
        }
    }

    /// Set the restitution coefficient.
    #[must_use]
    pub const fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set the drive.
    #[must_use]
    pub const fn with_drive(mut self, drive: DriveConfig) -> Self {
        self.drive = drive;
        self
    }

    /// Set the damping coefficient.
    #[must_use]
    pub const fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set both ball radii.
    #[must_use]
    pub fn with_radii(mut self, r1: f64, r2: f64) -> Self {
        self.bodies[0].radius = r1;
        self.bodies[1].radius = r2;
        self
    }

    /// Arm lengths `[L1, L2]`.
    #[must_use]
    pub const fn arm_lengths(&self) -> [f64; 2] {
        [self.bodies[0].arm_length, self.bodies[1].arm_length]
    }

    /// Masses `[m1, m2]`.
    #[must_use]
    pub const fn masses(&self) -> [f64; 2] {
        [self.bodies[0].mass, self.bodies[1].mass]
    }

    /// Centre distance below which the balls are in contact: `r1 + r2`.
    #[must_use]
    pub fn contact_distance(&self) -> f64 {
        self.bodies[0].radius + self.bodies[1].radius
    }

    /// Whether mechanical energy is conserved between collisions.
    #[must_use]
    pub fn is_conservative(&self) -> bool {
        !self.drive.is_active() && self.damping == 0.0
    }

    /// Kinetic plus gravitational potential energy, relative to both balls
    /// hanging at rest. Driving work is ignored.
    #[must_use]
    pub fn mechanical_energy(&self, state: &SystemState) -> f64 {
        self.bodies
            .iter()
            .zip(&state.bodies)
            .map(|(body, s)| {
                let l = body.arm_length;
                let kinetic = 0.5 * body.mass * l * l * s.angular_velocity * s.angular_velocity;
                let potential = body.mass * self.gravity * l * (1.0 - s.angle.cos());
                kinetic + potential
            })
            .sum()
    }

    /// Small-oscillation period `2π √(L/g)` of one body.
    #[must_use]
    pub fn small_angle_period(&self, body: usize) -> f64 {
        2.0 * std::f64::consts::PI * (self.bodies[body].arm_length / self.gravity).sqrt()
    }

    /// Validate parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidParameters` if:
    /// - an arm length, mass, or radius is non-positive or non-finite
    /// - restitution lies outside [0, 1]
    /// - gravity or damping is negative or non-finite
    /// - drive amplitude or frequency is non-finite
    pub fn check(&self) -> SimResult<()> {
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(SimError::invalid_parameters(format!(
                "gravity must be finite and non-negative, got {}",
                self.gravity
            )));
        }

        for (i, body) in self.bodies.iter().enumerate() {
            for (name, value) in [
                ("arm_length", body.arm_length),
                ("mass", body.mass),
                ("radius", body.radius),
            ] {
                if !value.is_finite() || value <= 0.0 {
                    return Err(SimError::invalid_parameters(format!(
                        "bodies[{i}].{name} must be finite and positive, got {value}"
                    )));
                }
            }
        }

        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(SimError::invalid_parameters(format!(
                "restitution must lie in [0, 1], got {}",
                self.restitution
            )));
        }

        if !self.damping.is_finite() || self.damping < 0.0 {
            return Err(SimError::invalid_parameters(format!(
                "damping must be finite and non-negative, got {}",
                self.damping
            )));
        }

        if !self.drive.amplitude.is_finite() || !self.drive.angular_frequency.is_finite() {
            return Err(SimError::invalid_parameters(
                "drive amplitude and angular frequency must be finite",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_valid() {
        let params = PhysicalParameters::default();
        assert!(params.check().is_ok());
        assert!((params.gravity - 9.81).abs() < f64::EPSILON);
        assert!((params.contact_distance() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_arm_length_rejected() {
        let mut params = PhysicalParameters::default();
        params.bodies[1].arm_length = 0.0;
        let err = params.check().unwrap_err();
        assert!(matches!(err, SimError::InvalidParameters { .. }));
        assert!(err.to_string().contains("bodies[1].arm_length"));
    }

    #[test]
    fn test_negative_mass_rejected() {
        let mut params = PhysicalParameters::default();
        params.bodies[0].mass = -0.1;
        assert!(matches!(
            params.check(),
            Err(SimError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_nan_radius_rejected() {
        let params = PhysicalParameters::default().with_radii(f64::NAN, 0.05);
        assert!(params.check().is_err());
    }

    #[test]
    fn test_restitution_bounds() {
        assert!(PhysicalParameters::default().with_restitution(0.0).check().is_ok());
        assert!(PhysicalParameters::default().with_restitution(1.0).check().is_ok());
        assert!(PhysicalParameters::default().with_restitution(1.01).check().is_err());
        assert!(PhysicalParameters::default().with_restitution(-0.01).check().is_err());
        assert!(PhysicalParameters::default().with_restitution(f64::NAN).check().is_err());
    }

    #[test]
    fn test_negative_damping_rejected() {
        let params = PhysicalParameters::default().with_damping(-1.0);
        assert!(params.check().is_err());
    }

    #[test]
    fn test_tiny_arm_length_accepted() {
        let mut params = PhysicalParameters::default();
        params.bodies[0].arm_length = 1e-20;
        assert!(params.check().is_ok());
    }

    #[test]
    fn test_conservative_flags() {
        let params = PhysicalParameters::default().with_drive(DriveConfig::none());
        assert!(params.is_conservative());
        assert!(!params.with_damping(0.1).is_conservative());
        assert!(!params.with_drive(DriveConfig::angular(0.1, 2.0)).is_conservative());
        assert!(params.with_drive(DriveConfig::angular(0.0, 2.0)).is_conservative());
    }

    #[test]
    fn test_mechanical_energy_at_rest_is_zero() {
        let params = PhysicalParameters::default();
        let state = SystemState::from_initial(0.0, [0.0, 0.0], [0.0, 0.0]);
        assert!(params.mechanical_energy(&state).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mechanical_energy_horizontal() {
        // Both arms horizontal at rest: PE = m g L per body
        let params = PhysicalParameters::default();
        let half_pi = std::f64::consts::FRAC_PI_2;
        let state = SystemState::from_initial(0.0, [half_pi, -half_pi], [0.0, 0.0]);
        let expected = 2.0 * 0.1 * 9.81 * 1.0;
        assert!((params.mechanical_energy(&state) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_small_angle_period() {
        let params = PhysicalParameters::default();
        assert!((params.small_angle_period(0) - 2.006).abs() < 0.01);
    }

    #[test]
    fn test_yaml_defaults() {
        let yaml = r"
bodies:
  - { arm_length: 1.0, mass: 0.1, radius: 0.05 }
  - { arm_length: 0.8, mass: 0.2, radius: 0.04 }
drive:
  model: vertical-pivot
  amplitude: 0.1
";
        let params: PhysicalParameters = serde_yaml::from_str(yaml).unwrap();
        assert!((params.gravity - 9.81).abs() < f64::EPSILON);
        assert!((params.restitution - 1.0).abs() < f64::EPSILON);
        assert_eq!(params.drive.model, DriveModel::VerticalPivot);
        assert!((params.drive.angular_frequency - 2.0).abs() < f64::EPSILON);
        assert!((params.bodies[1].arm_length - 0.8).abs() < f64::EPSILON);
    }
}
