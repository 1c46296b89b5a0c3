//! Adaptive Dormand-Prince 5(4) integrator.
//!
//! Implements the continuous half of the hybrid simulation:
//! - Embedded 5th/4th order Runge-Kutta pair with FSAL
//! - Max-norm error control with relative and absolute tolerances
//! - Cubic Hermite dense output over each accepted step
//!
//! # Step Size Control
//!
//! ```text
//! err    = max_i |e_i| / (atol + rtol * max(|y_i|, |y_new_i|))
//! h_new  = h * clamp(safety * err^(-1/5), min_factor, max_factor)
//! ```
//!
//! The suggested step persists between calls, so resuming from a
//! collision-corrected state keeps the adaptation of the previous segment.
//! A rejection that would shrink the step below `min_step` is reported as
//! [`SimError::IntegrationDivergence`].

use log::trace;
use serde::{Deserialize, Serialize};

use crate::domains::physics::{OdeSystem, PendulumDynamics};
use crate::engine::state::{SystemState, STATE_DIM};
use crate::engine::trajectory::Trajectory;
use crate::error::{RunFailure, SimError, SimResult};

type Vector = [f64; STATE_DIM];

// Dormand-Prince 5(4) tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th order weights (also the 7th stage row).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Error weights: 5th order minus embedded 4th order.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339_200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

/// Error tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Relative tolerance.
    pub rtol: f64,
    /// Absolute tolerance.
    pub atol: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-8,
        }
    }
}

impl Tolerances {
    /// Create tolerances.
    #[must_use]
    pub const fn new(rtol: f64, atol: f64) -> Self {
        Self { rtol, atol }
    }

    fn scale(&self, a: f64, b: f64) -> f64 {
        self.atol + self.rtol * a.abs().max(b.abs())
    }
}

/// Step size controller.
///
/// Uses the standard formula:
/// `h_new = safety * h * error^(-1/p)`, clamped to `[min_factor, max_factor]`.
#[derive(Debug, Clone, Copy)]
pub struct StepController {
    /// Safety factor.
    pub safety: f64,
    /// Maximum growth factor per step.
    pub max_factor: f64,
    /// Minimum reduction factor per step.
    pub min_factor: f64,
    /// Exponent `1/p` for an order-4 error estimate.
    pub exponent: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            safety: 0.9,
            max_factor: 5.0,
            min_factor: 0.2,
            exponent: 1.0 / 5.0,
        }
    }
}

impl StepController {
    /// Step size multiplier for a normalized error.
    #[must_use]
    pub fn factor(&self, error: f64) -> f64 {
        if !error.is_finite() {
            return self.min_factor;
        }
        if error <= f64::MIN_POSITIVE {
            return self.max_factor;
        }
        (self.safety * error.powf(-self.exponent)).clamp(self.min_factor, self.max_factor)
    }
}

/// Integration statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegratorStats {
    /// Accepted steps.
    pub accepted: u64,
    /// Rejected steps.
    pub rejected: u64,
    /// Right-hand side evaluations.
    pub evaluations: u64,
}

/// One accepted step with dense output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// State at the beginning of the step.
    pub start: SystemState,
    /// State at the end of the step.
    pub end: SystemState,
    f_start: Vector,
    f_end: Vector,
}

impl Step {
    /// Step length (s).
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end.time - self.start.time
    }

    /// Cubic Hermite interpolation of the state at time `t`.
    ///
    /// `t` is clamped to the step interval.
    #[must_use]
    pub fn interpolate(&self, t: f64) -> SystemState {
        let h = self.duration();
        if h <= 0.0 || t >= self.end.time {
            return self.end;
        }
        if t <= self.start.time {
            return self.start;
        }

        let s = (t - self.start.time) / h;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        let y0 = self.start.to_vector();
        let y1 = self.end.to_vector();
        let mut y = [0.0; STATE_DIM];
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = h00 * y0[i] + h10 * h * self.f_start[i] + h01 * y1[i] + h11 * h * self.f_end[i];
        }
        SystemState::from_vector(t, &y)
    }
}

/// Adaptive Dormand-Prince 5(4) integrator.
#[derive(Debug, Clone)]
pub struct DormandPrince {
    tolerances: Tolerances,
    controller: StepController,
    max_step: f64,
    min_step: f64,
    suggested: Option<f64>,
    fsal: Option<(SystemState, Vector)>,
    stats: IntegratorStats,
}

impl Default for DormandPrince {
    fn default() -> Self {
        Self::new(Tolerances::default())
    }
}

impl DormandPrince {
    /// Create an integrator with default step limits (`max_step` 0.01 s,
    /// `min_step` 1e-10 s).
    #[must_use]
    pub fn new(tolerances: Tolerances) -> Self {
        Self {
            tolerances,
            controller: StepController::default(),
            max_step: 0.01,
            min_step: 1e-10,
            suggested: None,
            fsal: None,
            stats: IntegratorStats::default(),
        }
    }

    /// Set step size limits.
    #[must_use]
    pub const fn with_step_limits(mut self, min_step: f64, max_step: f64) -> Self {
        self.min_step = min_step;
        self.max_step = max_step;
        self
    }

    /// Tolerances in use.
    #[must_use]
    pub const fn tolerances(&self) -> Tolerances {
        self.tolerances
    }

    /// Maximum step size (s).
    #[must_use]
    pub const fn max_step(&self) -> f64 {
        self.max_step
    }

    /// Minimum step size (s).
    #[must_use]
    pub const fn min_step(&self) -> f64 {
        self.min_step
    }

    /// Step size that will be tried next, if one has been chosen.
    #[must_use]
    pub const fn suggested_step(&self) -> Option<f64> {
        self.suggested
    }

    /// Counters since the last reset.
    #[must_use]
    pub const fn stats(&self) -> IntegratorStats {
        self.stats
    }

    /// Forget step size history, cached derivatives and counters.
    pub fn reset(&mut self) {
        self.suggested = None;
        self.fsal = None;
        self.stats = IntegratorStats::default();
    }

    /// Take one accepted step from `state` towards `t_target`.
    ///
    /// The step never overshoots `t_target`; when it reaches it, the end
    /// time equals `t_target` exactly.
    ///
    /// # Errors
    ///
    /// - `SimError::Config` if `t_target` does not lie after `state.time`
    /// - `SimError::IntegrationDivergence` if a rejection shrinks the step
    ///   below `min_step`
    pub fn step<S: OdeSystem + ?Sized>(
        &mut self,
        system: &S,
        state: &SystemState,
        t_target: f64,
    ) -> SimResult<Step> {
        let t = state.time;
        let remaining = t_target - t;
        if remaining.is_nan() || remaining <= 0.0 {
            return Err(SimError::config(format!(
                "step target {t_target} must lie after current time {t}"
            )));
        }

        let y = state.to_vector();
        let f0 = self.derivative_at(system, state);

        let mut h = match self.suggested {
            Some(h) => h,
            None => self.initial_step(system, t, &y, &f0),
        };

        loop {
            let clamped = h >= remaining;
            let h_try = if clamped { remaining } else { h };
            let t_end = if clamped { t_target } else { t + h_try };

            let (y_new, f_new, error) = self.attempt(system, t, &y, &f0, h_try, t_end);
            let finite = error.is_finite() && y_new.iter().all(|v| v.is_finite());

            if finite && error <= 1.0 {
                let factor = self.controller.factor(error);
                let next = (h_try * factor).clamp(self.min_step, self.max_step);
                self.suggested = Some(if clamped { h.max(next).min(self.max_step) } else { next });
                self.stats.accepted += 1;

                let end = SystemState::from_vector(t_end, &y_new);
                self.fsal = Some((end, f_new));
                return Ok(Step {
                    start: *state,
                    end,
                    f_start: f0,
                    f_end: f_new,
                });
            }

            self.stats.rejected += 1;
            let factor = if finite {
                self.controller.factor(error)
            } else {
                self.controller.min_factor
            };
            h = h_try * factor;
            trace!("rejected step at t={t:.6e}, error={error:.3e}, retrying with h={h:.3e}");

            if h < self.min_step {
                self.suggested = Some(h);
                return Err(SimError::IntegrationDivergence {
                    time: t,
                    step: h,
                    min_step: self.min_step,
                });
            }
        }
    }

    /// Integrate without collision handling, recording every accepted step.
    ///
    /// # Errors
    ///
    /// Returns a `RunFailure` carrying the states accepted so far if
    /// `max_step` is not positive, `t_end` does not lie after the initial
    /// time, or the integration diverges.
    pub fn integrate(
        &mut self,
        dynamics: &PendulumDynamics,
        initial: &SystemState,
        t_end: f64,
        max_step: f64,
    ) -> Result<Trajectory, RunFailure> {
        let mut trajectory = Trajectory::new(dynamics.arm_lengths());

        if !max_step.is_finite() || max_step <= 0.0 {
            return Err(RunFailure::new(
                SimError::config(format!("max_step must be positive, got {max_step}")),
                trajectory,
            ));
        }
        if t_end.is_nan() || t_end <= initial.time {
            return Err(RunFailure::new(
                SimError::config(format!(
                    "t_end {t_end} must lie after initial time {}",
                    initial.time
                )),
                trajectory,
            ));
        }

        self.reset();
        let configured = self.max_step;
        self.max_step = max_step.max(self.min_step);
        trajectory.push(*initial);

        let mut state = *initial;
        let mut failure = None;
        while state.time < t_end {
            match self.step(dynamics, &state, t_end) {
                Ok(step) => {
                    state = step.end;
                    trajectory.push(state);
                }
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            }
        }

        // The cap only applies to this call.
        self.max_step = configured;
        self.suggested = self.suggested.map(|h| h.min(configured));
        match failure {
            Some(error) => Err(RunFailure::new(error, trajectory)),
            None => Ok(trajectory),
        }
    }

    fn derivative_at<S: OdeSystem + ?Sized>(&mut self, system: &S, state: &SystemState) -> Vector {
        if let Some((cached, f)) = &self.fsal {
            if cached == state {
                return *f;
            }
        }
        self.stats.evaluations += 1;
        system.derivative(state.time, &state.to_vector())
    }

    /// Returns the 5th order solution, its derivative, and the normalized
    /// error estimate.
    fn attempt<S: OdeSystem + ?Sized>(
        &mut self,
        system: &S,
        t: f64,
        y: &Vector,
        k1: &Vector,
        h: f64,
        t_end: f64,
    ) -> (Vector, Vector, f64) {
        let k2 = system.derivative(t + C2 * h, &combine(y, h, &[(A21, k1)]));
        let k3 = system.derivative(t + C3 * h, &combine(y, h, &[(A31, k1), (A32, &k2)]));
        let k4 = system.derivative(
            t + C4 * h,
            &combine(y, h, &[(A41, k1), (A42, &k2), (A43, &k3)]),
        );
        let k5 = system.derivative(
            t + C5 * h,
            &combine(y, h, &[(A51, k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
        );
        let k6 = system.derivative(
            t + h,
            &combine(
                y,
                h,
                &[(A61, k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)],
            ),
        );
        let y_new = combine(
            y,
            h,
            &[(B1, k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)],
        );
        let k7 = system.derivative(t_end, &y_new);
        self.stats.evaluations += 6;

        let err = combine(
            &[0.0; STATE_DIM],
            h,
            &[
                (E1, k1),
                (E3, &k3),
                (E4, &k4),
                (E5, &k5),
                (E6, &k6),
                (E7, &k7),
            ],
        );
        let error = err
            .iter()
            .zip(y.iter().zip(&y_new))
            .map(|(e, (a, b))| e.abs() / self.tolerances.scale(*a, *b))
            .fold(0.0, f64::max);

        // NaN does not survive `f64::max`; surface it explicitly.
        let error = if err.iter().all(|e| e.is_finite()) {
            error
        } else {
            f64::NAN
        };

        (y_new, k7, error)
    }

    /// Initial step size heuristic (Hairer, Nørsett & Wanner).
    fn initial_step<S: OdeSystem + ?Sized>(
        &mut self,
        system: &S,
        t: f64,
        y: &Vector,
        f0: &Vector,
    ) -> f64 {
        let norm = |v: &Vector| {
            v.iter()
                .zip(y)
                .map(|(vi, yi)| (vi / self.tolerances.scale(*yi, *yi)).abs())
                .fold(0.0, f64::max)
        };

        let d0 = norm(y);
        let d1 = norm(f0);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };

        let y1 = combine(y, h0, &[(1.0, f0)]);
        let f1 = system.derivative(t + h0, &y1);
        self.stats.evaluations += 1;

        let mut diff = [0.0; STATE_DIM];
        for (d, (a, b)) in diff.iter_mut().zip(f1.iter().zip(f0)) {
            *d = a - b;
        }
        let d2 = norm(&diff) / h0;

        let h1 = if d1.max(d2) <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / 5.0)
        };

        let h = (100.0 * h0).min(h1);
        if h.is_finite() {
            h.clamp(self.min_step, self.max_step)
        } else {
            self.min_step
        }
    }
}

/// `y + h Σ a_j k_j`
fn combine(y: &Vector, h: f64, terms: &[(f64, &Vector)]) -> Vector {
    let mut out = *y;
    for (a, k) in terms {
        for (o, ki) in out.iter_mut().zip(k.iter()) {
            *o += h * a * ki;
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::engine::params::{DriveConfig, PhysicalParameters};

    /// Two independent harmonic oscillators with ω = 1 and ω = 2.
    struct Harmonic;

    impl OdeSystem for Harmonic {
        fn derivative(&self, _t: f64, y: &Vector) -> Vector {
            [y[1], -y[0], y[3], -4.0 * y[2]]
        }
    }

    /// Blows up in finite time: y' = y².
    struct Blowup;

    impl OdeSystem for Blowup {
        fn derivative(&self, _t: f64, y: &Vector) -> Vector {
            [y[0] * y[0], 0.0, 0.0, 0.0]
        }
    }

    fn undriven() -> PhysicalParameters {
        PhysicalParameters::default().with_drive(DriveConfig::none())
    }

    #[test]
    fn test_tableau_consistency() {
        // Row sums equal the nodes
        assert!((A21 - C2).abs() < 1e-15);
        assert!((A31 + A32 - C3).abs() < 1e-15);
        assert!((A41 + A42 + A43 - C4).abs() < 1e-14);
        assert!((A51 + A52 + A53 + A54 - C5).abs() < 1e-14);
        assert!((A61 + A62 + A63 + A64 + A65 - 1.0).abs() < 1e-14);
        // Weights sum to one, error weights to zero
        assert!((B1 + B3 + B4 + B5 + B6 - 1.0).abs() < 1e-14);
        assert!((E1 + E3 + E4 + E5 + E6 + E7).abs() < 1e-15);
    }

    #[test]
    fn test_controller_factor_bounds() {
        let c = StepController::default();
        assert!((c.factor(0.0) - 5.0).abs() < f64::EPSILON);
        assert!((c.factor(1e10) - 0.2).abs() < f64::EPSILON);
        assert!((c.factor(f64::NAN) - 0.2).abs() < f64::EPSILON);
        assert!((c.factor(1.0) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_harmonic_accuracy() {
        let mut dp = DormandPrince::new(Tolerances::new(1e-10, 1e-12)).with_step_limits(1e-12, 0.1);
        let mut state = SystemState::new(0.0, [Default::default(); 2]);
        state.bodies[0].angle = 1.0;
        state.bodies[1].angle = 1.0;

        let t_end = 2.0 * std::f64::consts::PI;
        while state.time < t_end {
            state = dp.step(&Harmonic, &state, t_end).unwrap().end;
        }

        assert!((state.time - t_end).abs() < f64::EPSILON);
        assert!((state.angle(0) - 1.0).abs() < 1e-8);
        assert!(state.angular_velocity(0).abs() < 1e-8);
        assert!((state.angle(1) - 1.0).abs() < 1e-8);
        assert!(dp.stats().accepted > 0);
    }

    #[test]
    fn test_step_hits_target_exactly() {
        let mut dp = DormandPrince::default();
        let mut state = SystemState::from_initial(0.0, [0.1, -0.1], [0.0, 0.0]);
        let target = 0.123_456_7;
        while state.time < target {
            state = dp.step(&Harmonic, &state, target).unwrap().end;
        }
        assert_eq!(state.time.to_bits(), target.to_bits());
    }

    #[test]
    fn test_step_never_exceeds_max_step() {
        let mut dp = DormandPrince::default().with_step_limits(1e-10, 0.05);
        let mut state = SystemState::from_initial(0.0, [0.1, -0.1], [0.0, 0.0]);
        for _ in 0..50 {
            let step = dp.step(&Harmonic, &state, 100.0).unwrap();
            assert!(step.duration() <= 0.05 + 1e-15);
            state = step.end;
        }
    }

    #[test]
    fn test_clamping_preserves_suggestion() {
        let mut dp = DormandPrince::default().with_step_limits(1e-10, 0.05);
        let mut state = SystemState::from_initial(0.0, [0.1, -0.1], [0.0, 0.0]);
        for _ in 0..20 {
            state = dp.step(&Harmonic, &state, 100.0).unwrap().end;
        }
        let before = dp.suggested_step().unwrap();
        dp.step(&Harmonic, &state, state.time + 1e-6).unwrap();
        assert!(dp.suggested_step().unwrap() >= before);
    }

    #[test]
    fn test_target_not_after_state_rejected() {
        let mut dp = DormandPrince::default();
        let state = SystemState::from_initial(1.0, [0.1, -0.1], [0.0, 0.0]);
        assert!(matches!(
            dp.step(&Harmonic, &state, 1.0),
            Err(SimError::Config { .. })
        ));
    }

    #[test]
    fn test_blowup_diverges() {
        let mut dp = DormandPrince::default();
        let mut state = SystemState::from_initial(0.0, [1.0, 0.0], [0.0, 0.0]);
        // Exact solution 1/(1-t) blows up at t = 1
        let result = loop {
            match dp.step(&Blowup, &state, 2.0) {
                Ok(step) => state = step.end,
                Err(e) => break e,
            }
        };
        assert!(matches!(result, SimError::IntegrationDivergence { .. }));
        if let SimError::IntegrationDivergence { time, step, min_step } = result {
            assert!(time < 1.0 + 1e-3);
            assert!(step < min_step);
        }
    }

    #[test]
    fn test_dense_output_endpoints_and_midpoint() {
        let mut dp = DormandPrince::new(Tolerances::new(1e-10, 1e-12));
        let state = SystemState::from_initial(0.0, [1.0, 1.0], [0.0, 0.0]);
        let step = dp.step(&Harmonic, &state, 0.01).unwrap();

        assert_eq!(step.interpolate(step.start.time), step.start);
        assert_eq!(step.interpolate(step.end.time), step.end);

        let t_mid = 0.5 * step.end.time;
        let mid = step.interpolate(t_mid);
        assert!((mid.angle(0) - t_mid.cos()).abs() < 1e-9);
        assert!((mid.angular_velocity(0) + t_mid.sin()).abs() < 1e-7);
        assert!((mid.time - t_mid).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fsal_reuses_derivative() {
        let mut dp = DormandPrince::default();
        let state = SystemState::from_initial(0.0, [0.1, -0.1], [0.0, 0.0]);
        let first = dp.step(&Harmonic, &state, 1.0).unwrap();
        let evals = dp.stats().evaluations;
        let accepted_before = dp.stats().accepted;
        dp.step(&Harmonic, &first.end, 1.0).unwrap();
        let stats = dp.stats();
        // 6 evaluations per attempt, no fresh k1
        let attempts = stats.accepted - accepted_before + stats.rejected;
        assert_eq!(stats.evaluations - evals, 6 * attempts);
    }

    #[test]
    fn test_integrate_conserves_energy() {
        let params = undriven();
        let dynamics = PendulumDynamics::new(&params);
        let initial = SystemState::from_initial(0.0, [0.3, -0.5], [0.0, 0.0]);
        let mut dp = DormandPrince::default();

        let traj = dp.integrate(&dynamics, &initial, 10.0, 0.01).unwrap();
        assert!((traj.last().unwrap().time - 10.0).abs() < f64::EPSILON);
        assert!(traj.max_energy_drift(&params) < 1e-4);
    }

    #[test]
    fn test_integrate_tiny_arm_diverges() {
        let mut params = undriven();
        params.bodies[0].arm_length = 1e-20;
        let dynamics = PendulumDynamics::new(&params);
        let initial = SystemState::from_initial(0.0, [0.1, -0.1], [0.0, 0.0]);
        let mut dp = DormandPrince::default();

        let failure = dp.integrate(&dynamics, &initial, 1.0, 0.01).unwrap_err();
        assert!(matches!(
            failure.error,
            SimError::IntegrationDivergence { .. }
        ));
        assert!(!failure.partial.is_empty());
    }

    #[test]
    fn test_integrate_keeps_configured_max_step() {
        let dynamics = PendulumDynamics::new(&undriven());
        let initial = SystemState::from_initial(0.0, [0.1, -0.1], [0.0, 0.0]);
        let mut dp = DormandPrince::default().with_step_limits(1e-10, 0.002);

        let traj = dp.integrate(&dynamics, &initial, 1.0, 0.05).unwrap();
        assert!((traj.last().unwrap().time - 1.0).abs() < f64::EPSILON);
        assert!((dp.max_step() - 0.002).abs() < f64::EPSILON);
        assert!(dp.suggested_step().unwrap() <= 0.002);

        let step = dp.step(&dynamics, &traj.last().copied().unwrap(), 2.0).unwrap();
        assert!(step.duration() <= 0.002 + f64::EPSILON);
    }

    #[test]
    fn test_integrate_rejects_bad_arguments() {
        let dynamics = PendulumDynamics::new(&undriven());
        let initial = SystemState::from_initial(0.0, [0.1, -0.1], [0.0, 0.0]);
        let mut dp = DormandPrince::default();
        assert!(dp.integrate(&dynamics, &initial, 1.0, 0.0).is_err());
        assert!(dp.integrate(&dynamics, &initial, -1.0, 0.01).is_err());
    }
}
