//! CLI command handlers.

use std::path::Path;
use std::process::ExitCode;

use log::info;

use crate::config::SimConfig;
use crate::domains::sweep::{restitution_sweep, ParameterSweep};
use crate::engine::Simulator;
use crate::error::SimError;

use super::output::{
    format_sweep_table, print_help, print_run_failure, print_run_summary, print_version,
};
use super::{Args, Command};

/// Main CLI entry point.
///
/// Dispatches to the appropriate command handler based on parsed arguments.
#[must_use]
pub fn run_cli(args: Args) -> ExitCode {
    match args.command {
        Command::Run { config_path, json } => run_simulation(&config_path, json),
        Command::Validate { config_path } => validate_config(&config_path),
        Command::Sweep {
            config_path,
            restitution,
        } => run_sweep(&config_path, &restitution),
        Command::Help => {
            print_help();
            ExitCode::SUCCESS
        }
        Command::Version => {
            print_version();
            ExitCode::SUCCESS
        }
    }
}

fn load(path: &Path) -> Option<SimConfig> {
    match SimConfig::load(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("✗ {}: {e}", path.display());
            None
        }
    }
}

/// Run a simulation from a YAML file.
#[must_use]
pub fn run_simulation(path: &Path, json: bool) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::from(2);
    };

    let mut sim = match Simulator::from_config(&config) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("✗ {e}");
            return ExitCode::from(2);
        }
    };

    info!("running {}", path.display());
    let run = config.run;
    match sim.run(run.t0, run.t_end, run.sample_count) {
        Ok(trajectory) => {
            if json {
                match serde_json::to_string_pretty(&trajectory).map_err(SimError::from) {
                    Ok(s) => println!("{s}"),
                    Err(e) => {
                        eprintln!("✗ {e}");
                        return ExitCode::from(1);
                    }
                }
            } else {
                print_run_summary(&config, &trajectory);
            }
            ExitCode::SUCCESS
        }
        Err(failure) => {
            print_run_failure(&failure);
            ExitCode::from(1)
        }
    }
}

/// Validate a YAML file.
#[must_use]
pub fn validate_config(path: &Path) -> ExitCode {
    match load(path) {
        Some(_) => {
            println!("✓ {} is valid", path.display());
            ExitCode::SUCCESS
        }
        None => ExitCode::from(1),
    }
}

/// Run a restitution sweep.
#[must_use]
pub fn run_sweep(path: &Path, restitution: &[f64]) -> ExitCode {
    let Some(config) = load(path) else {
        return ExitCode::from(2);
    };

    let outcomes = ParameterSweep::new().run(restitution_sweep(&config, restitution));
    print!("{}", format_sweep_table(&outcomes));

    if outcomes.iter().all(|o| o.is_completed()) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
