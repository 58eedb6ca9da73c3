//! Info command - shows what `generate` would do without writing anything.

use super::{inputs_or_configured, load_config};
use crate::cli::{Cli, InfoArgs, OutputFormat};
use propmatch_core::error::Result;
use propmatch_core::extract::PropertyExtractor;
use propmatch_core::filter::EligibilityFilter;
use propmatch_core::finder::CandidateFinder;
use propmatch_core::model::{Candidate, Property, PropertyAccess};
use propmatch_core::naming::NamingStrategy;
use propmatch_core::{MatcherPipeline, SourceIndex};
use serde_json::{Value, json};
use std::process::ExitCode;

/// Runs the info command.
pub fn run(cli: &Cli, args: &InfoArgs) -> Result<ExitCode> {
    let config = load_config(cli)?;
    let inputs = inputs_or_configured(&args.inputs, &config);
    let index = SourceIndex::scan(&config.source.root, &config.crate_name())?;
    let pipeline = MatcherPipeline::from_config(&config);

    let found = CandidateFinder::new(&index).find(&inputs);
    let candidates: Vec<Value> = found
        .candidates
        .iter()
        .map(|candidate| describe(&pipeline, candidate))
        .collect();

    match args.format {
        OutputFormat::Pretty => {
            println!("\n=== Source ===\n");
            println!("Root:    {}", config.source.root.display());
            println!("Crate:   {}", index.crate_name());
            println!("Modules: {}", index.modules().count());
            println!("Types:   {}", index.type_count());
            println!("Output:  {}", config.output.path.display());

            println!("\n=== Candidates ===\n");
            if candidates.is_empty() {
                println!("(none)");
            }
            for candidate in &candidates {
                print_candidate(candidate);
            }

            if !found.unresolved.is_empty() {
                println!("\n=== Unresolved ===\n");
                for input in &found.unresolved {
                    println!("{}", input.input);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "source_root": config.source.root,
                "crate_name": index.crate_name(),
                "output_path": config.output.path,
                "candidates": candidates,
                "unresolved": found.unresolved,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn describe(pipeline: &MatcherPipeline, candidate: &Candidate) -> Value {
    let generator = pipeline.generator();
    match pipeline.filter().check(candidate) {
        Err(reason) => json!({
            "type": candidate.path,
            "kind": candidate.kind.to_string(),
            "eligible": false,
            "reason": reason.to_string(),
        }),
        Ok(()) => {
            let naming = generator.naming().decide(candidate);
            let scope = match &naming {
                Ok(naming) => naming.matcher_path().module,
                Err(_) => candidate.path.module.clone(),
            };
            let matcher = naming
                .map(|naming| naming.matcher_path().qualified())
                .map_err(|e| e.to_string());
            let properties: Vec<Value> = generator
                .extractor()
                .extract(candidate, &scope)
                .iter()
                .map(describe_property)
                .collect();
            json!({
                "type": candidate.path,
                "kind": candidate.kind.to_string(),
                "eligible": true,
                "matcher": matcher.as_ref().ok(),
                "naming_error": matcher.as_ref().err(),
                "properties": properties,
            })
        }
    }
}

fn describe_property(property: &Property) -> Value {
    let access = match property.access {
        PropertyAccess::Borrowed => "borrowed",
        PropertyAccess::Owned => "owned",
        PropertyAccess::Field => "field",
    };
    json!({
        "name": property.name,
        "type": property.value_type,
        "access": access,
        "accessor": property.accessor,
        "setter": property.setter,
    })
}

fn print_candidate(candidate: &Value) {
    let path = candidate["type"].as_str().unwrap_or_default();
    if candidate["eligible"].as_bool() != Some(true) {
        println!(
            "{}  skipped: {}",
            path,
            candidate["reason"].as_str().unwrap_or_default()
        );
        return;
    }

    match candidate["matcher"].as_str() {
        Some(matcher) => println!("{}  -> {}", path, matcher),
        None => println!(
            "{}  naming failed: {}",
            path,
            candidate["naming_error"].as_str().unwrap_or_default()
        ),
    }
    for property in candidate["properties"].as_array().into_iter().flatten() {
        println!(
            "    {}: {} ({}, {})",
            property["name"].as_str().unwrap_or_default(),
            property["type"].as_str().unwrap_or_default(),
            property["accessor"].as_str().unwrap_or_default(),
            property["access"].as_str().unwrap_or_default()
        );
    }
}
