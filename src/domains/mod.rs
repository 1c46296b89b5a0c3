//! Domain engines of the hybrid simulation.
//!
//! - Physics: forcing models and the pendulum ODE right-hand side
//! - Integrator: adaptive Dormand-Prince 5(4) with dense output
//! - Collision: threshold detection and restitution response
//! - Sweep: work-stealing execution of independent runs

pub mod collision;
pub mod integrator;
pub mod physics;
pub mod sweep;

pub use collision::{CollisionDetector, CollisionInstant, CollisionKind, CollisionResolver};
pub use integrator::{DormandPrince, IntegratorStats, Step, StepController, Tolerances};
pub use physics::{
    Forcing, NoDrive, OdeSystem, PendulumDynamics, SinusoidalDrive, VerticalPivotDrive,
};
pub use sweep::{ParameterSweep, SweepCase, SweepOutcome};
