//! CLI module for latolato.
//!
//! All CLI logic lives here so `main.rs` stays a thin wrapper and the
//! parsing and formatting can be unit tested.

mod args;
mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::run_cli;
pub use output::{format_run_summary, format_sweep_table, print_help, print_version};
