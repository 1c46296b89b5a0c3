//! Physics domain: forcing models and pendulum dynamics.
//!
//! Implements the continuous part of the hybrid system:
//! - Forcing (angular drive, vertical pivot oscillation, none)
//! - The ODE right-hand side for two independent pendulums
//!
//! # Equations of Motion
//!
//! For body i with arm length `L_i`:
//!
//! ```text
//! θ_i' = ω_i
//! ω_i' = -((g + ÿ_p(t)) / L_i) sin(θ_i + φ_d(t)) - c ω_i
//! ```
//!
//! where `φ_d` is the driving angle, `ÿ_p` the pivot acceleration and `c`
//! the damping coefficient. The bodies only interact through collisions,
//! which never enter the right-hand side.

use crate::engine::params::{DriveConfig, DriveModel, PhysicalParameters};
use crate::engine::state::STATE_DIM;

/// Time-dependent pivot forcing.
///
/// Implementations are deterministic and stateless: every method is a pure
/// function of `t`.
pub trait Forcing {
    /// Instantaneous drive value (angle in rad, or pivot height in m).
    fn drive(&self, t: f64) -> f64;

    /// Angle added to each body's angle inside the gravity term.
    fn angle_offset(&self, _t: f64) -> f64 {
        0.0
    }

    /// Vertical pivot acceleration added to gravity.
    fn pivot_acceleration(&self, _t: f64) -> f64 {
        0.0
    }
}

/// Undriven pivot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDrive;

impl Forcing for NoDrive {
    fn drive(&self, _t: f64) -> f64 {
        0.0
    }
}

/// Sinusoidal driving angle `A sin(ω t)`.
#[derive(Debug, Clone, Copy)]
pub struct SinusoidalDrive {
    /// Amplitude (rad).
    pub amplitude: f64,
    /// Angular frequency (rad/s).
    pub angular_frequency: f64,
}

impl SinusoidalDrive {
    /// Create a new sinusoidal drive.
    #[must_use]
    pub const fn new(amplitude: f64, angular_frequency: f64) -> Self {
        Self {
            amplitude,
            angular_frequency,
        }
    }
}

impl Forcing for SinusoidalDrive {
    fn drive(&self, t: f64) -> f64 {
        self.amplitude * (self.angular_frequency * t).sin()
    }

    fn angle_offset(&self, t: f64) -> f64 {
        self.drive(t)
    }
}

/// Pivot oscillating vertically with height `A cos(ω t)`.
#[derive(Debug, Clone, Copy)]
pub struct VerticalPivotDrive {
    /// Amplitude (m).
    pub amplitude: f64,
    /// Angular frequency (rad/s).
    pub angular_frequency: f64,
}

impl VerticalPivotDrive {
    /// Create a new vertical pivot drive.
    #[must_use]
    pub const fn new(amplitude: f64, angular_frequency: f64) -> Self {
        Self {
            amplitude,
            angular_frequency,
        }
    }
}

impl Forcing for VerticalPivotDrive {
    fn drive(&self, t: f64) -> f64 {
        self.amplitude * (self.angular_frequency * t).cos()
    }

    fn pivot_acceleration(&self, t: f64) -> f64 {
        let w = self.angular_frequency;
        -self.amplitude * w * w * (w * t).cos()
    }
}

impl DriveConfig {
    /// Build the forcing model described by this configuration.
    #[must_use]
    pub fn forcing(&self) -> Box<dyn Forcing + Send + Sync> {
        match self.model {
            DriveModel::None => Box::new(NoDrive),
            DriveModel::Angular => {
                Box::new(SinusoidalDrive::new(self.amplitude, self.angular_frequency))
            }
            DriveModel::VerticalPivot => Box::new(VerticalPivotDrive::new(
                self.amplitude,
                self.angular_frequency,
            )),
        }
    }
}

/// First-order ODE system over the flattened state vector.
pub trait OdeSystem {
    /// Time derivative of `y` at time `t`.
    fn derivative(&self, t: f64, y: &[f64; STATE_DIM]) -> [f64; STATE_DIM];
}

/// Right-hand side for two pendulums hanging from a common pivot.
pub struct PendulumDynamics {
    gravity: f64,
    arm_lengths: [f64; 2],
    damping: f64,
    forcing: Box<dyn Forcing + Send + Sync>,
}

impl PendulumDynamics {
    /// Create dynamics from validated parameters.
    #[must_use]
    pub fn new(params: &PhysicalParameters) -> Self {
        Self {
            gravity: params.gravity,
            arm_lengths: params.arm_lengths(),
            damping: params.damping,
            forcing: params.drive.forcing(),
        }
    }

    /// Arm lengths `[L1, L2]`.
    #[must_use]
    pub const fn arm_lengths(&self) -> [f64; 2] {
        self.arm_lengths
    }

    /// Current drive value.
    #[must_use]
    pub fn drive(&self, t: f64) -> f64 {
        self.forcing.drive(t)
    }
}

impl std::fmt::Debug for PendulumDynamics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendulumDynamics")
            .field("gravity", &self.gravity)
            .field("arm_lengths", &self.arm_lengths)
            .field("damping", &self.damping)
            .finish_non_exhaustive()
    }
}

impl OdeSystem for PendulumDynamics {
    fn derivative(&self, t: f64, y: &[f64; STATE_DIM]) -> [f64; STATE_DIM] {
        let offset = self.forcing.angle_offset(t);
        let g_eff = self.gravity + self.forcing.pivot_acceleration(t);

        let mut dy = [0.0; STATE_DIM];
        for (i, &length) in self.arm_lengths.iter().enumerate() {
            let theta = y[2 * i];
            let omega = y[2 * i + 1];
            dy[2 * i] = omega;
            dy[2 * i + 1] = -(g_eff / length) * (theta + offset).sin() - self.damping * omega;
        }
        dy
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Drive is bounded by its amplitude.
        #[test]
        fn prop_drive_bounded(
            amplitude in 0.0f64..1.0,
            frequency in 0.0f64..50.0,
            t in -100.0f64..100.0,
        ) {
            let angular = SinusoidalDrive::new(amplitude, frequency);
            let vertical = VerticalPivotDrive::new(amplitude, frequency);
            prop_assert!(angular.drive(t).abs() <= amplitude + 1e-15);
            prop_assert!(vertical.drive(t).abs() <= amplitude + 1e-15);
        }

        /// Drive is a pure function of time.
        #[test]
        fn prop_drive_deterministic(t in -100.0f64..100.0) {
            let f = DriveConfig::angular(0.1, 2.0).forcing();
            prop_assert_eq!(f.drive(t).to_bits(), f.drive(t).to_bits());
        }

        /// Undamped, undriven acceleration never exceeds g / L.
        #[test]
        fn prop_acceleration_bounded(
            theta in -10.0f64..10.0,
            omega in -10.0f64..10.0,
            length in 0.1f64..5.0,
        ) {
            let mut params = PhysicalParameters::default().with_drive(DriveConfig::none());
            params.bodies[0].arm_length = length;
            let dynamics = PendulumDynamics::new(&params);
            let dy = dynamics.derivative(0.0, &[theta, omega, 0.0, 0.0]);
            prop_assert!(dy[1].abs() <= 9.81 / length + 1e-9);
        }
    }
}
