//! Time-ordered run output.
//!
//! A [`Trajectory`] is what external collaborators (plotting, animation,
//! FFT post-analysis) consume. Sample times are strictly increasing; at a
//! collision instant the sample holds the post-collision state and the
//! matching [`CollisionEvent`] holds both sides of the discontinuity.

use serde::{Deserialize, Serialize};

use crate::engine::params::PhysicalParameters;
use crate::engine::state::{SystemState, Vec2};

/// One ball-ball collision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    /// Collision instant (s).
    pub time: f64,
    /// State just before the restitution exchange.
    pub before: SystemState,
    /// State just after the restitution exchange.
    pub after: SystemState,
}

/// Sampled trajectory of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    arm_lengths: [f64; 2],
    samples: Vec<SystemState>,
    collisions: Vec<CollisionEvent>,
}

impl Trajectory {
    /// Create an empty trajectory for the given arm lengths.
    #[must_use]
    pub const fn new(arm_lengths: [f64; 2]) -> Self {
        Self {
            arm_lengths,
            samples: Vec::new(),
            collisions: Vec::new(),
        }
    }

    /// Append a sample.
    ///
    /// A sample at the same time as the last one replaces it, so a
    /// post-collision state overrides a scheduled sample at that instant.
    /// Samples earlier than the last one are dropped.
    pub fn push(&mut self, state: SystemState) {
        match self.samples.last_mut() {
            Some(last) if state.time == last.time => *last = state,
            Some(last) if state.time < last.time => {}
            _ => self.samples.push(state),
        }
    }

    /// Record a collision and its post-collision sample.
    pub fn record_collision(&mut self, event: CollisionEvent) {
        self.push(event.after);
        self.collisions.push(event);
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no samples were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Arm lengths used to derive Cartesian positions.
    #[must_use]
    pub const fn arm_lengths(&self) -> [f64; 2] {
        self.arm_lengths
    }

    /// All samples in time order.
    #[must_use]
    pub fn samples(&self) -> &[SystemState] {
        &self.samples
    }

    /// Sample at an index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SystemState> {
        self.samples.get(index)
    }

    /// Final sample.
    #[must_use]
    pub fn last(&self) -> Option<&SystemState> {
        self.samples.last()
    }

    /// Recorded collisions in time order.
    #[must_use]
    pub fn collisions(&self) -> &[CollisionEvent] {
        &self.collisions
    }

    /// Iterate over `(time, θ1, ω1, θ2, ω2)` tuples.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64, f64, f64)> + '_ {
        self.samples.iter().map(|s| {
            (
                s.time,
                s.bodies[0].angle,
                s.bodies[0].angular_velocity,
                s.bodies[1].angle,
                s.bodies[1].angular_velocity,
            )
        })
    }

    /// Sample times.
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.time)
    }

    /// Cartesian ball positions of one sample.
    #[must_use]
    pub fn cartesian(&self, index: usize) -> Option<[Vec2; 2]> {
        self.samples
            .get(index)
            .map(|s| s.positions(self.arm_lengths))
    }

    /// Cartesian positions of one body over the whole run.
    ///
    /// Returns an empty vector for a body index other than 0 or 1.
    #[must_use]
    pub fn positions(&self, body: usize) -> Vec<Vec2> {
        let Some(&length) = self.arm_lengths.get(body) else {
            return Vec::new();
        };
        self.samples
            .iter()
            .map(|s| s.bodies[body].position(length))
            .collect()
    }

    /// Mechanical energy of every sample.
    #[must_use]
    pub fn mechanical_energy(&self, params: &PhysicalParameters) -> Vec<f64> {
        self.samples
            .iter()
            .map(|s| params.mechanical_energy(s))
            .collect()
    }

    /// Largest relative deviation of mechanical energy from the first sample.
    ///
    /// Returns 0.0 for an empty trajectory or a zero-energy start.
    #[must_use]
    pub fn max_energy_drift(&self, params: &PhysicalParameters) -> f64 {
        let Some(first) = self.samples.first() else {
            return 0.0;
        };
        let e0 = params.mechanical_energy(first);
        if e0.abs() < f64::EPSILON {
            return 0.0;
        }
        self.samples
            .iter()
            .map(|s| ((params.mechanical_energy(s) - e0) / e0).abs())
            .fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a SystemState;
    type IntoIter = std::slice::Iter<'a, SystemState>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn state(t: f64, theta: f64) -> SystemState {
        SystemState::from_initial(t, [theta, -theta], [0.0, 0.0])
    }

    #[test]
    fn test_push_keeps_times_increasing() {
        let mut traj = Trajectory::new([1.0, 1.0]);
        traj.push(state(0.0, 0.1));
        traj.push(state(0.5, 0.05));
        traj.push(state(0.25, 0.0));
        traj.push(state(1.0, 0.0));

        let times: Vec<f64> = traj.times().collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_push_same_time_replaces() {
        let mut traj = Trajectory::new([1.0, 1.0]);
        traj.push(state(0.0, 0.1));
        traj.push(state(0.5, 0.05));
        traj.push(state(0.5, 0.07));

        assert_eq!(traj.len(), 2);
        assert!((traj.last().unwrap().angle(0) - 0.07).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_collision() {
        let mut traj = Trajectory::new([1.0, 1.0]);
        traj.push(state(0.0, 0.1));
        let before = SystemState::from_initial(0.4, [0.02, -0.02], [-1.0, 1.0]);
        let after = before.with_angular_velocities([1.0, -1.0]);
        traj.record_collision(CollisionEvent {
            time: 0.4,
            before,
            after,
        });

        assert_eq!(traj.len(), 2);
        assert_eq!(traj.collisions().len(), 1);
        assert_eq!(*traj.last().unwrap(), after);
    }

    #[test]
    fn test_iter_tuples() {
        let mut traj = Trajectory::new([1.0, 1.0]);
        traj.push(SystemState::from_initial(0.0, [0.1, 0.2], [0.3, 0.4]));
        let tuples: Vec<_> = traj.iter().collect();
        assert_eq!(tuples, vec![(0.0, 0.1, 0.3, 0.2, 0.4)]);
    }

    #[test]
    fn test_cartesian_and_positions() {
        let mut traj = Trajectory::new([2.0, 1.0]);
        traj.push(state(0.0, 0.0));
        traj.push(state(1.0, std::f64::consts::FRAC_PI_2));

        let [p1, p2] = traj.cartesian(0).unwrap();
        assert!((p1.y + 2.0).abs() < 1e-12);
        assert!((p2.y + 1.0).abs() < 1e-12);
        assert!(traj.cartesian(5).is_none());

        let path = traj.positions(0);
        assert_eq!(path.len(), 2);
        assert!((path[1].x - 2.0).abs() < 1e-12);
        assert!(traj.positions(2).is_empty());
    }

    #[test]
    fn test_energy_drift_constant_energy() {
        let params = PhysicalParameters::default();
        let mut traj = Trajectory::new(params.arm_lengths());
        traj.push(state(0.0, 0.1));
        traj.push(state(1.0, -0.1));
        assert!(traj.max_energy_drift(&params) < 1e-12);
        assert_eq!(traj.mechanical_energy(&params).len(), 2);
    }

    #[test]
    fn test_serialize_json() {
        let mut traj = Trajectory::new([1.0, 1.0]);
        traj.push(state(0.0, 0.1));
        let json = serde_json::to_string(&traj).unwrap();
        let back: Trajectory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, traj);
    }
}
