//! Command handlers for the propmatch CLI.

pub mod generate;
pub mod info;
pub mod init;

use crate::cli::Cli;
use propmatch_core::config::{PropmatchConfig, find_config_file};
use propmatch_core::error::{PropmatchError, Result};
use std::env;
use tracing::{debug, info};

/// Loads the configuration named by `--config`, else the nearest
/// `propmatch.toml` above the current directory, else the defaults.
/// `--source` and `--output` are applied on top.
pub fn load_config(cli: &Cli) -> Result<PropmatchConfig> {
    let mut config = match &cli.config {
        Some(path) => PropmatchConfig::from_toml_path(path)?,
        None => {
            let cwd = env::current_dir()?;
            match find_config_file(&cwd) {
                Ok(path) => PropmatchConfig::from_toml_path(path)?,
                Err(PropmatchError::ConfigNotFound { .. }) => {
                    info!("No propmatch.toml found, using default configuration");
                    let mut config = PropmatchConfig::default();
                    config.resolve_paths(&cwd);
                    config
                }
                Err(e) => return Err(e),
            }
        }
    };

    if let Some(source) = &cli.source {
        debug!("Overriding source root with {:?}", source);
        config.source.root = source.clone();
    }
    if let Some(output) = &cli.output {
        debug!("Overriding output path with {:?}", output);
        config.output.path = output.clone();
    }
    Ok(config)
}

/// Command-line inputs if any were given, else the configured ones.
pub fn inputs_or_configured(inputs: &[String], config: &PropmatchConfig) -> Vec<String> {
    if inputs.is_empty() {
        config.generation.inputs.clone()
    } else {
        inputs.to_vec()
    }
}
