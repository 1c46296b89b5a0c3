//! # latolato
//!
//! Hybrid continuous/discrete simulator for the lato-lato toy: two
//! pendulums hanging from a common, optionally driven pivot, colliding
//! with each other.
//!
//! - Nonlinear pendulum ODEs with time-dependent forcing
//! - Adaptive Dormand-Prince 5(4) integration with dense output
//! - Ball-ball collision detection layered on the continuous integration
//! - Restitution-law response applied mid-integration
//! - Jidoka energy guard, YAML configuration, work-stealing sweeps
//!
//! ## Example
//!
//! ```rust
//! use latolato::prelude::*;
//!
//! let params = PhysicalParameters::default().with_restitution(0.9);
//! let mut sim = Simulator::new([0.1, -0.1], [0.0, 0.0], params).unwrap();
//! let trajectory = sim.run(0.0, 1.0, 101).unwrap();
//!
//! for (t, theta1, _, theta2, _) in trajectory.iter().take(3) {
//!     println!("{t:.2} {theta1:.4} {theta2:.4}");
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::float_cmp,             // Exact zero checks on validated parameters
    clippy::suboptimal_flops,      // Tableau arithmetic written as published
    clippy::imprecise_flops,
    clippy::too_many_lines,
    clippy::missing_const_for_fn,
    clippy::needless_range_loop,
    clippy::manual_midpoint,
)]

pub mod cli;
pub mod config;
pub mod domains;
pub mod engine;
pub mod error;
pub mod scenarios;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{SimConfig, SimConfigBuilder};
    pub use crate::domains::sweep::{ParameterSweep, SweepCase};
    pub use crate::engine::jidoka::{JidokaConfig, JidokaGuard};
    pub use crate::engine::params::{BodyParameters, DriveConfig, DriveModel, PhysicalParameters};
    pub use crate::engine::state::SystemState;
    pub use crate::engine::trajectory::{CollisionEvent, Trajectory};
    pub use crate::engine::{SimStatus, Simulator};
    pub use crate::error::{RunFailure, SimError, SimResult};
    pub use crate::scenarios::LatoLatoScenario;
}

/// Re-export for public API
pub use error::{RunFailure, SimError, SimResult};
