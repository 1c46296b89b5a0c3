//! Core simulation engine.
//!
//! Implements the hybrid simulation loop with:
//! - Adaptive integration between scheduled sample times
//! - Collision detection on every accepted step
//! - Restitution response and resumption from the corrected state
//! - Jidoka guards for stop-on-error
//! - Wall-clock budget for cancellation
//!
//! # State Machine
//!
//! ```text
//! Running ──collision──▶ CollisionPending ──resolved──▶ Running
//!    │                         │
//!    ├──reached t_end──▶ Completed
//!    └──divergence / cancel / degenerate──▶ Failed
//! ```

pub mod jidoka;
pub mod params;
pub mod state;
pub mod trajectory;

use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

pub use jidoka::{JidokaConfig, JidokaGuard};
pub use params::{BodyParameters, DriveConfig, DriveModel, PhysicalParameters};
pub use state::{PendulumState, SystemState, Vec2};
pub use trajectory::{CollisionEvent, Trajectory};

use crate::config::SimConfig;
use crate::domains::collision::{CollisionDetector, CollisionResolver};
use crate::domains::integrator::{DormandPrince, IntegratorStats, Tolerances};
use crate::domains::physics::PendulumDynamics;
use crate::error::{RunFailure, SimError, SimResult};

/// Lifecycle state of a [`Simulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimStatus {
    /// Integrating between collisions.
    Running,
    /// A collision was detected and is being resolved.
    CollisionPending,
    /// Reached the end time.
    Completed,
    /// Stopped on an error; the partial trajectory was returned.
    Failed,
}

/// Lato-lato simulator.
///
/// Owns the only mutable cursor of a run; everything it calls works on
/// immutable [`SystemState`] snapshots.
///
/// # Example
///
/// ```rust
/// use latolato::prelude::*;
///
/// let params = PhysicalParameters::default();
/// let mut sim = Simulator::new([0.1, -0.1], [0.0, 0.0], params).unwrap();
/// let trajectory = sim.run(0.0, 2.0, 201).unwrap();
///
/// assert_eq!(sim.status(), SimStatus::Completed);
/// assert!(!trajectory.collisions().is_empty());
/// ```
#[derive(Debug)]
pub struct Simulator {
    params: PhysicalParameters,
    initial_angles: [f64; 2],
    initial_angular_velocities: [f64; 2],
    dynamics: PendulumDynamics,
    integrator: DormandPrince,
    detector: CollisionDetector,
    resolver: CollisionResolver,
    jidoka: JidokaGuard,
    time_budget: Option<Duration>,
    status: SimStatus,
}

impl Simulator {
    /// Create a simulator from initial conditions and parameters.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidParameters` if the parameters fail
    /// validation or an initial condition is not finite.
    pub fn new(
        initial_angles: [f64; 2],
        initial_angular_velocities: [f64; 2],
        parameters: PhysicalParameters,
    ) -> SimResult<Self> {
        parameters.check()?;
        if !initial_angles
            .iter()
            .chain(&initial_angular_velocities)
            .all(|v| v.is_finite())
        {
            return Err(SimError::invalid_parameters(
                "initial angles and angular velocities must be finite",
            ));
        }

        Ok(Self {
            params: parameters,
            initial_angles,
            initial_angular_velocities,
            dynamics: PendulumDynamics::new(&parameters),
            integrator: DormandPrince::default(),
            detector: CollisionDetector::new(&parameters),
            resolver: CollisionResolver::new(&parameters),
            jidoka: JidokaGuard::new(JidokaConfig::default(), &parameters),
            time_budget: None,
            status: SimStatus::Running,
        })
    }

    /// Create a simulator from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the physical parameters or initial conditions are
    /// invalid, or the time budget cannot be represented.
    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        let solver = &config.solver;
        let integrator = DormandPrince::new(Tolerances::new(solver.rtol, solver.atol))
            .with_step_limits(solver.min_step, solver.max_step);

        let mut sim = Self::new(
            config.initial.angles,
            config.initial.angular_velocities,
            config.physics,
        )?
        .with_integrator(integrator)
        .with_refine_iterations(config.detection.refine_iterations)
        .with_jidoka(config.jidoka);

        if let Some(secs) = config.run.time_budget_secs {
            let budget = Duration::try_from_secs_f64(secs)
                .map_err(|e| SimError::config(format!("invalid time budget {secs}: {e}")))?;
            sim = sim.with_time_budget(budget);
        }
        Ok(sim)
    }

    /// Replace the integrator (tolerances and step limits).
    #[must_use]
    pub fn with_integrator(mut self, integrator: DormandPrince) -> Self {
        self.integrator = integrator;
        self
    }

    /// Set the number of bisection iterations for collision localization.
    #[must_use]
    pub fn with_refine_iterations(mut self, iterations: u32) -> Self {
        self.detector = self.detector.with_refine_iterations(iterations);
        self
    }

    /// Abort runs that take longer than `budget` of wall-clock time.
    #[must_use]
    pub const fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Configure the Jidoka energy guard.
    #[must_use]
    pub fn with_jidoka(mut self, config: JidokaConfig) -> Self {
        self.jidoka = JidokaGuard::new(config, &self.params);
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn status(&self) -> SimStatus {
        self.status
    }

    /// Parameters of this simulator.
    #[must_use]
    pub const fn parameters(&self) -> &PhysicalParameters {
        &self.params
    }

    /// Integrator counters of the last run.
    #[must_use]
    pub const fn integrator_stats(&self) -> IntegratorStats {
        self.integrator.stats()
    }

    /// Initial snapshot at time `t0`.
    #[must_use]
    pub const fn initial_state(&self, t0: f64) -> SystemState {
        SystemState::from_initial(t0, self.initial_angles, self.initial_angular_velocities)
    }

    /// Run from `t0` to `t_end`, sampling `sample_count` evenly spaced
    /// times (both ends included) plus every collision instant.
    ///
    /// Each call starts a fresh run from the initial conditions.
    ///
    /// # Errors
    ///
    /// Returns a `RunFailure` with the partial trajectory if:
    /// - the arguments are invalid (`SimError::Config`)
    /// - the step size collapses (`SimError::IntegrationDivergence`)
    /// - the wall-clock budget runs out (`SimError::Cancelled`)
    /// - a collision meets a zero arm length (`SimError::DegenerateGeometry`)
    /// - the Jidoka guard stops the line (`SimError::EnergyDrift`)
    pub fn run(
        &mut self,
        t0: f64,
        t_end: f64,
        sample_count: usize,
    ) -> Result<Trajectory, RunFailure> {
        let mut trajectory = Trajectory::new(self.params.arm_lengths());

        if !t0.is_finite() || !t_end.is_finite() || t_end <= t0 {
            return Err(self.fail(
                SimError::config(format!("invalid time span [{t0}, {t_end}]")),
                trajectory,
            ));
        }
        if sample_count < 2 {
            return Err(self.fail(
                SimError::config(format!("sample_count must be at least 2, got {sample_count}")),
                trajectory,
            ));
        }

        self.integrator.reset();
        self.jidoka.reset();
        self.status = SimStatus::Running;
        let started = Instant::now();

        let mut state = self.initial_state(t0);
        trajectory.push(state);
        if let Err(e) = self.jidoka.check(&state) {
            return Err(self.fail(e, trajectory));
        }

        let span = t_end - t0;
        let intervals = (sample_count - 1) as f64;
        for k in 1..sample_count {
            let target = if k == sample_count - 1 {
                t_end
            } else {
                t0 + span * (k as f64) / intervals
            };

            while state.time < target {
                if let Some(budget) = self.time_budget {
                    if started.elapsed() >= budget {
                        let cancelled = SimError::Cancelled {
                            time: state.time,
                            budget,
                        };
                        return Err(self.fail(cancelled, trajectory));
                    }
                }

                let step = match self.integrator.step(&self.dynamics, &state, target) {
                    Ok(step) => step,
                    Err(e) => return Err(self.fail(e, trajectory)),
                };

                if let Some(hit) = self.detector.detect_in_step(&step) {
                    self.status = SimStatus::CollisionPending;
                    let before = step.interpolate(hit.time);
                    let after = match self.resolver.resolve(&before) {
                        Ok(after) => after,
                        Err(e) => return Err(self.fail(e, trajectory)),
                    };
                    debug!(
                        "collision #{} at t={:.6} ({:?}): ω {:?} -> {:?}",
                        trajectory.collisions().len() + 1,
                        hit.time,
                        hit.kind,
                        [before.angular_velocity(0), before.angular_velocity(1)],
                        [after.angular_velocity(0), after.angular_velocity(1)],
                    );
                    trajectory.record_collision(CollisionEvent {
                        time: hit.time,
                        before,
                        after,
                    });
                    self.jidoka.rebaseline(&after);
                    state = after;
                    self.status = SimStatus::Running;
                    debug!("resuming integration at t={:.6}", state.time);
                    continue;
                }

                state = step.end;
                match self.jidoka.check(&state) {
                    Ok(Some(warning)) => warn!("Jidoka warning: {warning:?}"),
                    Ok(None) => {}
                    Err(e) => return Err(self.fail(e, trajectory)),
                }
            }

            trajectory.push(state);
        }

        self.status = SimStatus::Completed;
        let stats = self.integrator.stats();
        info!(
            "run completed: t=[{t0}, {t_end}], {} samples, {} collisions, {} steps ({} rejected)",
            trajectory.len(),
            trajectory.collisions().len(),
            stats.accepted,
            stats.rejected,
        );
        Ok(trajectory)
    }

    fn fail(&mut self, error: SimError, partial: Trajectory) -> RunFailure {
        self.status = SimStatus::Failed;
        error!("run failed: {error}");
        RunFailure::new(error, partial)
    }
}
