//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

/// Non-blocking file writer guard; dropping it flushes buffered lines.
pub static FILE_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> =
    Mutex::new(None);
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();
/// Subcommand name of the current invocation, echoed in JSON output.
pub static COMMAND: OnceLock<&'static str> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "stride", version, about = "Two-joint leg motion CLI (simulated backend)")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/stride.toml")]
    pub config: PathBuf,

    /// Log as JSON lines and print results as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find the travel limits of one axis and re-zero it at the midpoint
    Home {
        /// Driver id of the axis (one of `[axes] ids`)
        #[arg(long, value_name = "ID")]
        axis: u8,
    },
    /// Play a waypoint path through the kinematics and both axis interpolators
    Run {
        /// Waypoint CSV with header `x,y`; defaults to a unit square
        #[arg(long, value_name = "FILE")]
        waypoints: Option<PathBuf>,
        /// Override [command].max_run_ms
        #[arg(long, value_name = "MS")]
        max_run_ms: Option<u64>,
    },
    /// Move both axes to zero and stop
    Park,
    /// Print the shaped table of one easing curve
    Curve {
        /// Curve name, e.g. `cubic_in_out`
        #[arg(long)]
        name: String,
        /// Number of evenly spaced progress samples (>= 2)
        #[arg(long, default_value_t = 11)]
        samples: usize,
    },
    /// Validate config and construct the backend
    SelfCheck,
}

impl Commands {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Home { .. } => "home",
            Self::Run { .. } => "run",
            Self::Park => "park",
            Self::Curve { .. } => "curve",
            Self::SelfCheck => "self-check",
        }
    }
}
