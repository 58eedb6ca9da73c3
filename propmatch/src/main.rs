mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over -v/-q
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!("Parsed command line: {:?}", cli);

    let result = match &cli.command {
        Commands::Generate(args) => commands::generate::run(&cli, args),
        Commands::Info(args) => commands::info::run(&cli, args),
        Commands::Init(args) => commands::init::run(&cli, args),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
