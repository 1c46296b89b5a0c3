//! Pre-built simulation scenarios.
//!
//! Provides ready-to-use lato-lato setups taken from the classic
//! experiments: symmetric release, driven and resonant pivots, vertical
//! pivot oscillation, inelastic and damped variants.

pub mod lato_lato;

pub use lato_lato::LatoLatoScenario;
