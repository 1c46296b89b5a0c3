//! latolato CLI
//!
//! Runs lato-lato simulations from YAML configuration files.

use std::process::ExitCode;

use latolato::cli::{run_cli, Args};

fn main() -> ExitCode {
    env_logger::init();
    run_cli(Args::parse())
}
