//! CLI output formatting.

use crate::config::SimConfig;
use crate::domains::sweep::SweepOutcome;
use crate::engine::trajectory::Trajectory;
use crate::error::RunFailure;

/// Print version information.
pub fn print_version() {
    println!("latolato {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message.
pub fn print_help() {
    println!(
        r"latolato - two colliding pendulums on a driven pivot

USAGE:
    latolato <config.yaml> [--json]
    latolato <COMMAND> [OPTIONS]

COMMANDS:
    run <config.yaml>           Run a simulation and print a summary
        --json                  Print the trajectory as JSON instead

    validate <config.yaml>      Check a configuration without running it

    sweep <config.yaml>         Run once per restitution coefficient
        --restitution <LIST>    Comma-separated values (default: 1,0.75,0.5,0.25,0)

    help                        Show this help message
    version                     Show version information

Set RUST_LOG=debug to log every collision."
    );
}

/// Summary lines for a completed run.
#[must_use]
pub fn format_run_summary(config: &SimConfig, trajectory: &Trajectory) -> String {
    let mut out = String::new();
    let name = if config.simulation.name.is_empty() {
        "(unnamed)"
    } else {
        &config.simulation.name
    };
    out.push_str(&format!("Simulation: {name}\n"));
    out.push_str(&format!(
        "Span:       [{}, {}] s, {} samples\n",
        config.run.t0,
        config.run.t_end,
        trajectory.len()
    ));
    out.push_str(&format!("Collisions: {}\n", trajectory.collisions().len()));
    if let Some(first) = trajectory.collisions().first() {
        out.push_str(&format!("First at:   t = {:.6} s\n", first.time));
    }
    if let Some(last) = trajectory.last() {
        out.push_str(&format!(
            "Final:      θ = ({:.6}, {:.6}) rad, ω = ({:.6}, {:.6}) rad/s\n",
            last.angle(0),
            last.angle(1),
            last.angular_velocity(0),
            last.angular_velocity(1)
        ));
    }
    if config.physics.is_conservative() && config.physics.restitution == 1.0 {
        out.push_str(&format!(
            "Energy drift (max, relative): {:.3e}\n",
            trajectory.max_energy_drift(&config.physics)
        ));
    }
    out
}

/// Print a completed run.
pub fn print_run_summary(config: &SimConfig, trajectory: &Trajectory) {
    print!("{}", format_run_summary(config, trajectory));
}

/// Print a failed run.
pub fn print_run_failure(failure: &RunFailure) {
    eprintln!("✗ Run failed: {}", failure.error);
    if let Some(last) = failure.partial.last() {
        eprintln!("  Last good state at t = {:.6} s", last.time);
    }
    eprintln!(
        "  Recovered {} samples, {} collisions",
        failure.partial.len(),
        failure.partial.collisions().len()
    );
}

/// One line per sweep outcome.
#[must_use]
pub fn format_sweep_table(outcomes: &[SweepOutcome]) -> String {
    let mut out = format!("{:<14} {:>10} {:>10}\n", "case", "status", "collisions");
    for outcome in outcomes {
        let status = if outcome.is_completed() { "ok" } else { "failed" };
        out.push_str(&format!(
            "{:<14} {:>10} {:>10}\n",
            outcome.label,
            status,
            outcome.collision_count()
        ));
    }
    out
}
