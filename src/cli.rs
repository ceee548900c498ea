//! CLI argument parsing for hookprof

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for measurement reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Log lines only (default)
    Text,
    /// Also print each report to stdout as JSON
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "hookprof")]
#[command(version)]
#[command(
    about = "Hook call-frequency profiler with spatial hotspot reports",
    long_about = "Reads console commands from stdin. Start a measurement with \
                  `debughookcalls.start <hook name> <seconds>`, inject events with \
                  `fire <hook name> [x y z]`, list hooks with `hooks`."
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Seed for the synthetic workload generator
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}
