//! Simulation state snapshots.
//!
//! Implements the world state with:
//! - Per-body angle and angular velocity
//! - Immutable system snapshots stamped with simulation time
//! - Cartesian geometry derived on demand from angles and arm lengths
//!
//! A `SystemState` is a `Copy` value. Every integration step and every
//! collision correction produces a new snapshot, so trajectory history and
//! collision rewind never alias mutable data.

use serde::{Deserialize, Serialize};

/// Number of entries in the flattened ODE state vector `(θ1, ω1, θ2, ω2)`.
pub const STATE_DIM: usize = 4;

/// 2D vector for Cartesian positions and velocities (pivot at the origin,
/// `y` pointing up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Vec2 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Magnitude (length).
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Dot product.
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Scale by scalar.
    #[must_use]
    pub fn scale(&self, s: f64) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
        }
    }

    /// Check if all components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.scale(rhs)
    }
}

/// Angular state of one pendulum body.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PendulumState {
    /// Angle from the downward vertical (rad). Not wrapped.
    pub angle: f64,
    /// Angular velocity (rad/s).
    pub angular_velocity: f64,
}

impl PendulumState {
    /// Create a new body state.
    #[must_use]
    pub const fn new(angle: f64, angular_velocity: f64) -> Self {
        Self {
            angle,
            angular_velocity,
        }
    }

    /// Bob position relative to the pivot for an arm of the given length.
    #[must_use]
    pub fn position(&self, arm_length: f64) -> Vec2 {
        Vec2::new(
            arm_length * self.angle.sin(),
            -arm_length * self.angle.cos(),
        )
    }

    /// Bob velocity (tangent to the arc) for an arm of the given length.
    #[must_use]
    pub fn velocity(&self, arm_length: f64) -> Vec2 {
        let speed = arm_length * self.angular_velocity;
        Vec2::new(speed * self.angle.cos(), speed * self.angle.sin())
    }

    /// Check if angle and angular velocity are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.angle.is_finite() && self.angular_velocity.is_finite()
    }
}

/// Snapshot of both pendulums at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SystemState {
    /// Simulation time (s).
    pub time: f64,
    /// Body states, indexed 0 and 1.
    pub bodies: [PendulumState; 2],
}

impl SystemState {
    /// Create a new snapshot.
    #[must_use]
    pub const fn new(time: f64, bodies: [PendulumState; 2]) -> Self {
        Self { time, bodies }
    }

    /// Create a snapshot from initial angles and angular velocities.
    #[must_use]
    pub const fn from_initial(time: f64, angles: [f64; 2], angular_velocities: [f64; 2]) -> Self {
        Self {
            time,
            bodies: [
                PendulumState::new(angles[0], angular_velocities[0]),
                PendulumState::new(angles[1], angular_velocities[1]),
            ],
        }
    }

    /// Rebuild a snapshot from the flattened ODE vector `(θ1, ω1, θ2, ω2)`.
    #[must_use]
    pub const fn from_vector(time: f64, y: &[f64; STATE_DIM]) -> Self {
        Self {
            time,
            bodies: [
                PendulumState::new(y[0], y[1]),
                PendulumState::new(y[2], y[3]),
            ],
        }
    }

    /// Flatten into the ODE vector `(θ1, ω1, θ2, ω2)`.
    #[must_use]
    pub const fn to_vector(&self) -> [f64; STATE_DIM] {
        [
            self.bodies[0].angle,
            self.bodies[0].angular_velocity,
            self.bodies[1].angle,
            self.bodies[1].angular_velocity,
        ]
    }

    /// Angle of a body.
    ///
    /// # Panics
    ///
    /// Panics if `body` is not 0 or 1.
    #[must_use]
    pub const fn angle(&self, body: usize) -> f64 {
        self.bodies[body].angle
    }

    /// Angular velocity of a body.
    ///
    /// # Panics
    ///
    /// Panics if `body` is not 0 or 1.
    #[must_use]
    pub const fn angular_velocity(&self, body: usize) -> f64 {
        self.bodies[body].angular_velocity
    }

    /// Copy of this snapshot with replaced angular velocities.
    #[must_use]
    pub const fn with_angular_velocities(&self, angular_velocities: [f64; 2]) -> Self {
        Self {
            time: self.time,
            bodies: [
                PendulumState::new(self.bodies[0].angle, angular_velocities[0]),
                PendulumState::new(self.bodies[1].angle, angular_velocities[1]),
            ],
        }
    }

    /// Bob positions for the given arm lengths.
    #[must_use]
    pub fn positions(&self, arm_lengths: [f64; 2]) -> [Vec2; 2] {
        [
            self.bodies[0].position(arm_lengths[0]),
            self.bodies[1].position(arm_lengths[1]),
        ]
    }

    /// Euclidean distance between the two bob centres.
    #[must_use]
    pub fn separation(&self, arm_lengths: [f64; 2]) -> f64 {
        let [p1, p2] = self.positions(arm_lengths);
        (p2 - p1).magnitude()
    }

    /// Rate of change of the squared separation, halved: `Δr · Δv`.
    ///
    /// Negative while the bodies approach each other.
    #[must_use]
    pub fn closing_rate(&self, arm_lengths: [f64; 2]) -> f64 {
        let [p1, p2] = self.positions(arm_lengths);
        let v1 = self.bodies[0].velocity(arm_lengths[0]);
        let v2 = self.bodies[1].velocity(arm_lengths[1]);
        (p2 - p1).dot(&(v2 - v1))
    }

    /// Check if every state variable is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.time.is_finite() && self.bodies.iter().all(PendulumState::is_finite)
    }
}
