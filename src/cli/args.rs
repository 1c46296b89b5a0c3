//! CLI argument parsing.
//!
//! Accepts any iterator of strings so parsing is testable without
//! touching `std::env::args()`.

use std::path::PathBuf;

/// CLI arguments container.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    /// The command to execute.
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run a simulation from a config file.
    Run {
        /// Path to the YAML configuration.
        config_path: PathBuf,
        /// Print the serialized trajectory as JSON.
        json: bool,
    },
    /// Validate a config file without running it.
    Validate {
        /// Path to the YAML configuration.
        config_path: PathBuf,
    },
    /// Run the config once per restitution coefficient.
    Sweep {
        /// Path to the YAML configuration.
        config_path: PathBuf,
        /// Restitution coefficients to try.
        restitution: Vec<f64>,
    },
    /// Show help
    Help,
    /// Show version
    Version,
}

impl Args {
    /// Parse command-line arguments from an iterator.
    #[must_use]
    pub fn parse_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        Self::parse_from_vec(&args)
    }

    /// Parse command-line arguments from the environment.
    #[must_use]
    pub fn parse() -> Self {
        Self::parse_from(std::env::args())
    }

    fn parse_from_vec(args: &[String]) -> Self {
        if args.len() < 2 {
            return Self {
                command: Command::Help,
            };
        }

        let command = match args[1].as_str() {
            "run" => Self::parse_run_command(&args[2..]),
            "validate" => Self::parse_validate_command(&args[2..]),
            "sweep" => Self::parse_sweep_command(&args[2..]),
            "-h" | "--help" | "help" => Command::Help,
            "-V" | "--version" | "version" => Command::Version,
            // Bare `latolato <config.yaml> [--json]`
            path if !path.starts_with('-') => Self::parse_run_command(&args[1..]),
            unknown => {
                eprintln!("Unknown option: {unknown}");
                Command::Help
            }
        };

        Self { command }
    }

    fn parse_run_command(rest: &[String]) -> Command {
        let Some(path) = rest.first() else {
            eprintln!("Error: 'run' command requires a config path");
            return Command::Help;
        };

        Command::Run {
            config_path: PathBuf::from(path),
            json: rest[1..].iter().any(|a| a == "--json"),
        }
    }

    fn parse_validate_command(rest: &[String]) -> Command {
        let Some(path) = rest.first() else {
            eprintln!("Error: 'validate' command requires a config path");
            return Command::Help;
        };

        Command::Validate {
            config_path: PathBuf::from(path),
        }
    }

    fn parse_sweep_command(rest: &[String]) -> Command {
        let Some(path) = rest.first() else {
            eprintln!("Error: 'sweep' command requires a config path");
            return Command::Help;
        };

        let mut restitution = vec![1.0, 0.75, 0.5, 0.25, 0.0];
        let mut i = 1;
        while i < rest.len() {
            if rest[i] == "--restitution" && i + 1 < rest.len() {
                match rest[i + 1]
                    .split(',')
                    .map(|v| v.trim().parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                {
                    Ok(values) if !values.is_empty() => restitution = values,
                    _ => {
                        eprintln!("Error: invalid restitution list '{}'", rest[i + 1]);
                        return Command::Help;
                    }
                }
                i += 2;
            } else {
                i += 1;
            }
        }

        Command::Sweep {
            config_path: PathBuf::from(path),
            restitution,
        }
    }
}
