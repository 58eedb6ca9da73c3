//! Command-line interface definitions for propmatch.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// propmatch - typed property matchers for plain Rust structs
#[derive(Parser, Debug)]
#[command(name = "propmatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to propmatch.toml configuration file
    #[arg(short, long, global = true, env = "PROPMATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Source root to scan (overrides config file)
    #[arg(short, long, global = true)]
    pub source: Option<PathBuf>,

    /// Output directory override (overrides config file)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Enable verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate matchers for the given modules or types
    Generate(GenerateArgs),

    /// Show candidates, eligibility and properties without writing anything
    Info(InfoArgs),

    /// Initialize a new propmatch.toml configuration file
    Init(InitArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Module paths or type paths (defaults to `generation.inputs`)
    pub inputs: Vec<String>,

    /// Write generated files one after another
    #[arg(long)]
    pub sequential: bool,

    /// Output format for the generation report
    #[arg(long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Module paths or type paths (defaults to `generation.inputs`)
    pub inputs: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Directory to create propmatch.toml in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing propmatch.toml if present
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Pretty,
    /// JSON output
    Json,
}
