use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Countdown CLI definition.
#[derive(Debug, Parser)]
#[command(name = "countdown")]
#[command(about = "Counts down to a fixed instant in days, hours, minutes and seconds", version)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Verbose logging with timestamps")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(
        long,
        global = true,
        requires = "log_json",
        help = "Pretty-print JSON logs (with --log-json)"
    )]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a live countdown, updated once per tick.
    Run(RunArgs),
    /// Evaluate the countdown a single time and print it.
    Once(OnceArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct TargetArgs {
    #[arg(
        long,
        help = "Target instant (RFC 3339, YYYY-MM-DDTHH:MM[:SS] in local time, or YYYY-MM-DD as UTC)"
    )]
    pub target: Option<String>,

    #[arg(
        long,
        help = "Path to a YAML config file (defaults to ~/.countdown/config.yaml if present)"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: TargetArgs,

    #[arg(long, help = "Milliseconds between updates (default 1000)")]
    pub tick_ms: Option<u64>,

    #[arg(
        long,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Stop after this many updates (at least 1)"
    )]
    pub ticks: Option<u64>,

    #[arg(long, help = "Stop once the target has been reached")]
    pub exit_on_expiry: bool,

    #[arg(long, help = "Print one line per update instead of redrawing in place")]
    pub lines: bool,
}

#[derive(Debug, Args, Clone, Default)]
pub struct OnceArgs {
    #[command(flatten)]
    pub source: TargetArgs,

    #[arg(long, help = "Evaluate at this instant instead of the current time")]
    pub at: Option<String>,

    #[arg(long, help = "Print the snapshot as JSON")]
    pub json: bool,
}
