//! Generate command - runs the full pipeline and reports the outcome.

use super::{inputs_or_configured, load_config};
use crate::cli::{Cli, GenerateArgs, OutputFormat};
use propmatch_core::error::Result;
use propmatch_core::{GenerationReport, generate_with_config};
use std::process::ExitCode;
use tracing::info;

/// Runs the generate command.
///
/// Exits with 2 when some candidates failed but the batch succeeded.
pub fn run(cli: &Cli, args: &GenerateArgs) -> Result<ExitCode> {
    let mut config = load_config(cli)?;
    if args.sequential {
        config.generation.parallel = false;
    }
    let inputs = inputs_or_configured(&args.inputs, &config);

    info!("Generating matchers into {:?}", config.output.path);
    let report = generate_with_config(&config, &inputs)?;

    match args.format {
        OutputFormat::Pretty => print_report(&report),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(if report.failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

fn print_report(report: &GenerationReport) {
    println!(
        "Generated {} matchers ({} candidates found, {} eligible)",
        report.artifacts.len(),
        report.candidates_found,
        report.candidates_eligible
    );
    for artifact in &report.artifacts {
        println!(
            "  {} -> {} ({})",
            artifact.based_on,
            artifact.qualified_name(),
            artifact.source_path().display()
        );
    }

    for input in &report.unresolved {
        eprintln!("warning: {}", input);
    }
    for failure in &report.failures {
        eprintln!(
            "failed: {} [{}] {}",
            failure.candidate, failure.kind, failure.cause
        );
    }
}
