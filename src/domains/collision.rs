//! Ball-ball collision detection and restitution response.
//!
//! Detection is a pure predicate over an accepted integrator step: its two
//! endpoints plus, for fast passes, the dense output in between. The
//! contact threshold is the Euclidean centre distance `r1 + r2`, with
//! positions measured from the common pivot:
//!
//! ```text
//! x_i = L_i sin θ_i
//! y_i = -L_i cos θ_i
//! ```
//!
//! Response follows the one-dimensional restitution law on the tangential
//! speeds `v_i = L_i ω_i`:
//!
//! ```text
//! v1' = ((m1 - e m2) v1 + (1 + e) m2 v2) / (m1 + m2)
//! v2' = ((m2 - e m1) v2 + (1 + e) m1 v1) / (m1 + m2)
//! ```

use serde::{Deserialize, Serialize};

use crate::domains::integrator::Step;
use crate::engine::params::PhysicalParameters;
use crate::engine::state::SystemState;
use crate::error::{SimError, SimResult};

/// Relative tolerance under which a pair is treated as already touching.
pub const CONTACT_SLOP: f64 = 1e-6;

/// Default number of bisection iterations on the dense output.
pub const DEFAULT_REFINE_ITERATIONS: u32 = 30;

// Bisection depth when searching a step for its separation minimum.
const MINIMUM_SEARCH_ITERATIONS: u32 = 50;

/// How a collision was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    /// The pair crossed the contact threshold during the step.
    Entry,
    /// The pair was already touching and is still approaching.
    Contact,
}

/// Localized collision instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionInstant {
    /// Collision time (s).
    pub time: f64,
    /// Detection case.
    pub kind: CollisionKind,
}

/// Detects threshold crossings between consecutive states.
#[derive(Debug, Clone, Copy)]
pub struct CollisionDetector {
    arm_lengths: [f64; 2],
    threshold: f64,
    refine_iterations: u32,
}

impl CollisionDetector {
    /// Create a detector for the given parameters.
    #[must_use]
    pub fn new(params: &PhysicalParameters) -> Self {
        Self {
            arm_lengths: params.arm_lengths(),
            threshold: params.contact_distance(),
            refine_iterations: DEFAULT_REFINE_ITERATIONS,
        }
    }

    /// Set the number of bisection iterations (0 keeps the linear estimate).
    #[must_use]
    pub const fn with_refine_iterations(mut self, iterations: u32) -> Self {
        self.refine_iterations = iterations;
        self
    }

    /// Contact distance `r1 + r2`.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Bisection iterations used by [`Self::detect_in_step`].
    #[must_use]
    pub const fn refine_iterations(&self) -> u32 {
        self.refine_iterations
    }

    /// Check whether a collision happened between `prev` and `next`, looking
    /// at the endpoints only.
    ///
    /// Entry crossings are localized by linear interpolation of the
    /// separation. A pair already in contact at `prev` only collides again
    /// if it is still approaching at `next`, which is then the reported
    /// instant.
    #[must_use]
    pub fn detect(&self, prev: &SystemState, next: &SystemState) -> Option<CollisionInstant> {
        let d_next = next.separation(self.arm_lengths);
        if d_next >= self.threshold {
            return None;
        }

        let d_prev = prev.separation(self.arm_lengths);
        if d_prev < self.threshold * (1.0 + CONTACT_SLOP) {
            return (next.closing_rate(self.arm_lengths) < 0.0).then_some(CollisionInstant {
                time: next.time,
                kind: CollisionKind::Contact,
            });
        }

        let alpha = (d_prev - self.threshold) / (d_prev - d_next);
        let time = prev.time + alpha * (next.time - prev.time);
        Some(CollisionInstant {
            time: if time > prev.time && time <= next.time {
                time
            } else {
                next.time
            },
            kind: CollisionKind::Entry,
        })
    }

    /// Detect over an accepted integrator step, refining entry instants by
    /// bisection on the step's dense output.
    ///
    /// A pair that is clear of contact at both ends of the step can still
    /// have passed through each other in between. When the closing rate
    /// changes sign inside the step, the separation minimum is searched on
    /// the dense output and an overlap there is reported as an entry.
    #[must_use]
    pub fn detect_in_step(&self, step: &Step) -> Option<CollisionInstant> {
        if let Some(instant) = self.detect(&step.start, &step.end) {
            if instant.kind == CollisionKind::Contact || self.refine_iterations == 0 {
                return Some(instant);
            }
            return Some(CollisionInstant {
                time: self.refine(step, step.start.time, step.end.time),
                kind: CollisionKind::Entry,
            });
        }

        let overlap = self.interior_overlap(step)?;
        Some(CollisionInstant {
            time: if self.refine_iterations == 0 {
                overlap
            } else {
                self.refine(step, step.start.time, overlap)
            },
            kind: CollisionKind::Entry,
        })
    }

    /// A time inside `step` at which the pair overlaps although both
    /// endpoints are clear, found by bisection on the closing rate.
    fn interior_overlap(&self, step: &Step) -> Option<f64> {
        let lengths = self.arm_lengths;
        if step.start.separation(lengths) < self.threshold * (1.0 + CONTACT_SLOP)
            || step.start.closing_rate(lengths) >= 0.0
            || step.end.closing_rate(lengths) <= 0.0
        {
            return None;
        }

        let mut lo = step.start.time;
        let mut hi = step.end.time;
        for _ in 0..MINIMUM_SEARCH_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            if mid <= lo || mid >= hi {
                break;
            }
            let state = step.interpolate(mid);
            if state.separation(lengths) < self.threshold {
                return Some(mid);
            }
            if state.closing_rate(lengths) < 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        None
    }

    /// Bisection for the threshold crossing in `[lo, hi]`, where the pair
    /// is clear at `lo` and overlapping at `hi`.
    ///
    /// Returns the earliest bracketed time at which the pair overlaps, so
    /// the state handed to the resolver is always inside contact.
    fn refine(&self, step: &Step, mut lo: f64, mut hi: f64) -> f64 {
        for _ in 0..self.refine_iterations {
            let mid = 0.5 * (lo + hi);
            if mid <= lo || mid >= hi {
                break;
            }
            if step.interpolate(mid).separation(self.arm_lengths) < self.threshold {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        hi
    }
}

/// Applies the restitution law at a collision instant.
#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    arm_lengths: [f64; 2],
    masses: [f64; 2],
    restitution: f64,
}

impl CollisionResolver {
    /// Create a resolver for the given parameters.
    #[must_use]
    pub fn new(params: &PhysicalParameters) -> Self {
        Self {
            arm_lengths: params.arm_lengths(),
            masses: params.masses(),
            restitution: params.restitution,
        }
    }

    /// Post-collision state. Angles and time are unchanged.
    ///
    /// # Errors
    ///
    /// Returns `SimError::DegenerateGeometry` if an arm length is zero.
    pub fn resolve(&self, state: &SystemState) -> SimResult<SystemState> {
        if let Some(body) = self.arm_lengths.iter().position(|&l| l == 0.0) {
            return Err(SimError::DegenerateGeometry { body });
        }

        let v = [
            self.arm_lengths[0] * state.angular_velocity(0),
            self.arm_lengths[1] * state.angular_velocity(1),
        ];
        let [v1, v2] = exchange(v, self.masses, self.restitution);
        Ok(state.with_angular_velocities([v1 / self.arm_lengths[0], v2 / self.arm_lengths[1]]))
    }
}

/// One-dimensional restitution exchange of speeds `v` between masses `m`.
#[must_use]
pub fn exchange(v: [f64; 2], m: [f64; 2], e: f64) -> [f64; 2] {
    let total = m[0] + m[1];
    [
        ((m[0] - e * m[1]) * v[0] + (1.0 + e) * m[1] * v[1]) / total,
        ((m[1] - e * m[0]) * v[1] + (1.0 + e) * m[0] * v[0]) / total,
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::domains::integrator::DormandPrince;
    use crate::domains::physics::PendulumDynamics;
    use crate::engine::params::DriveConfig;

    fn params() -> PhysicalParameters {
        PhysicalParameters::default().with_drive(DriveConfig::none())
    }

    #[test]
    fn test_no_collision_when_apart() {
        let det = CollisionDetector::new(&params());
        let a = SystemState::from_initial(0.0, [0.3, -0.3], [-1.0, 1.0]);
        let b = SystemState::from_initial(0.01, [0.29, -0.29], [-1.0, 1.0]);
        assert!(det.detect(&a, &b).is_none());
    }

    #[test]
    fn test_entry_linear_estimate() {
        let det = CollisionDetector::new(&params());
        // Separation 2 sin(Δθ/2): ~0.12 before, ~0.08 after; threshold 0.1
        let a = SystemState::from_initial(0.0, [0.06, -0.06], [-1.0, 1.0]);
        let b = SystemState::from_initial(0.02, [0.04, -0.04], [-1.0, 1.0]);
        let hit = det.detect(&a, &b).unwrap();
        assert_eq!(hit.kind, CollisionKind::Entry);
        assert!(hit.time > 0.0 && hit.time < 0.02);
        assert!((hit.time - 0.01).abs() < 1e-3);
    }

    #[test]
    fn test_contact_approaching_reports_endpoint() {
        let det = CollisionDetector::new(&params());
        let a = SystemState::from_initial(0.0, [0.04, -0.04], [-1.0, 1.0]);
        let b = SystemState::from_initial(0.01, [0.03, -0.03], [-1.0, 1.0]);
        let hit = det.detect(&a, &b).unwrap();
        assert_eq!(hit.kind, CollisionKind::Contact);
        assert!((hit.time - 0.01).abs() < f64::EPSILON);
    }

    #[test]
    fn test_contact_separating_ignored() {
        let det = CollisionDetector::new(&params());
        let a = SystemState::from_initial(0.0, [0.03, -0.03], [1.0, -1.0]);
        let b = SystemState::from_initial(0.01, [0.04, -0.04], [1.0, -1.0]);
        assert!(det.detect(&a, &b).is_none());
    }

    #[test]
    fn test_refined_instant_on_threshold() {
        let p = params();
        let dynamics = PendulumDynamics::new(&p);
        let det = CollisionDetector::new(&p);
        let mut dp = DormandPrince::default();

        let mut state = SystemState::from_initial(0.0, [0.1, -0.1], [0.0, 0.0]);
        let (step, hit) = loop {
            let step = dp.step(&dynamics, &state, 10.0).unwrap();
            if let Some(hit) = det.detect_in_step(&step) {
                break (step, hit);
            }
            state = step.end;
        };

        assert_eq!(hit.kind, CollisionKind::Entry);
        let at = step.interpolate(hit.time);
        assert!(at.separation(p.arm_lengths()) < det.threshold());
        assert!((at.separation(p.arm_lengths()) - det.threshold()).abs() < 1e-9);
    }

    #[test]
    fn test_zero_refinement_keeps_linear_estimate() {
        let p = params();
        let det = CollisionDetector::new(&p).with_refine_iterations(0);
        assert_eq!(det.refine_iterations(), 0);
        let dynamics = PendulumDynamics::new(&p);
        let mut dp = DormandPrince::default();

        let mut state = SystemState::from_initial(0.0, [0.1, -0.1], [0.0, 0.0]);
        loop {
            let step = dp.step(&dynamics, &state, 10.0).unwrap();
            if let Some(hit) = det.detect_in_step(&step) {
                let linear = det.detect(&step.start, &step.end).unwrap();
                assert!((hit.time - linear.time).abs() < f64::EPSILON);
                break;
            }
            state = step.end;
        }
    }

    #[test]
    fn test_fast_pass_inside_one_step() {
        let p = params().with_radii(0.001, 0.001);
        let det = CollisionDetector::new(&p);
        let dynamics = PendulumDynamics::new(&p);
        let mut dp = DormandPrince::default().with_step_limits(0.005, 0.01);

        // Balls cross the vertical around t = 0.002, well inside the first step
        let state = SystemState::from_initial(0.0, [0.004, -0.004], [-2.0, 2.0]);
        let step = dp.step(&dynamics, &state, 1.0).unwrap();
        assert!(step.start.separation(p.arm_lengths()) > det.threshold());
        assert!(step.end.separation(p.arm_lengths()) > det.threshold());
        assert!(det.detect(&step.start, &step.end).is_none());

        let hit = det.detect_in_step(&step).unwrap();
        assert_eq!(hit.kind, CollisionKind::Entry);
        // Contact at 2θ = 0.002, i.e. θ = 0.001
        assert!((hit.time - 0.0015).abs() < 1e-4);
        let at = step.interpolate(hit.time);
        assert!(at.separation(p.arm_lengths()) < det.threshold());
        assert!((at.separation(p.arm_lengths()) - det.threshold()).abs() < 1e-9);
    }

    #[test]
    fn test_fast_pass_without_refinement_overlaps() {
        let p = params().with_radii(0.001, 0.001);
        let det = CollisionDetector::new(&p).with_refine_iterations(0);
        let dynamics = PendulumDynamics::new(&p);
        let mut dp = DormandPrince::default().with_step_limits(0.005, 0.01);

        let state = SystemState::from_initial(0.0, [0.004, -0.004], [-2.0, 2.0]);
        let step = dp.step(&dynamics, &state, 1.0).unwrap();
        let hit = det.detect_in_step(&step).unwrap();
        assert!(hit.time > step.start.time && hit.time < step.end.time);
        assert!(step.interpolate(hit.time).separation(p.arm_lengths()) < det.threshold());
    }

    #[test]
    fn test_fast_pass_at_different_heights_misses() {
        let mut p = params().with_radii(0.001, 0.001);
        p.bodies[1].arm_length = 0.9;
        let det = CollisionDetector::new(&p);
        let dynamics = PendulumDynamics::new(&p);
        let mut dp = DormandPrince::default().with_step_limits(0.005, 0.01);

        let state = SystemState::from_initial(0.0, [0.004, -0.004], [-2.0, 2.0]);
        let step = dp.step(&dynamics, &state, 1.0).unwrap();
        assert!(det.detect_in_step(&step).is_none());
    }

    #[test]
    fn test_elastic_equal_masses_swap() {
        let resolver = CollisionResolver::new(&params());
        let state = SystemState::from_initial(1.0, [0.05, -0.05], [-0.3, 0.7]);
        let after = resolver.resolve(&state).unwrap();
        assert!((after.angular_velocity(0) - 0.7).abs() < 1e-12);
        assert!((after.angular_velocity(1) + 0.3).abs() < 1e-12);
        assert!((after.angle(0) - 0.05).abs() < f64::EPSILON);
        assert!((after.time - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_inelastic_equal_speeds() {
        let mut p = params().with_restitution(0.0);
        p.bodies[1].mass = 0.3;
        p.bodies[1].arm_length = 0.8;
        let resolver = CollisionResolver::new(&p);
        let state = SystemState::from_initial(0.0, [0.05, -0.05], [-1.0, 2.0]);
        let after = resolver.resolve(&state).unwrap();
        let v1 = 1.0 * after.angular_velocity(0);
        let v2 = 0.8 * after.angular_velocity(1);
        assert!((v1 - v2).abs() < 1e-12);
    }

    #[test]
    fn test_zero_arm_length_degenerate() {
        let mut p = params();
        p.bodies[0].arm_length = 0.0;
        let resolver = CollisionResolver::new(&p);
        let state = SystemState::from_initial(0.0, [0.0, 0.0], [1.0, -1.0]);
        assert!(matches!(
            resolver.resolve(&state),
            Err(SimError::DegenerateGeometry { body: 0 })
        ));
    }
}
