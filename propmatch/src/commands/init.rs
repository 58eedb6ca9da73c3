//! Init command - writes a default propmatch.toml.

use crate::cli::{Cli, InitArgs};
use propmatch_core::config::CONFIG_FILE_NAME;
use propmatch_core::error::Result;
use std::fs;
use std::process::ExitCode;
use tracing::{error, info};

pub const DEFAULT_CONFIG: &str = r#"# propmatch configuration

[source]
# Source root of the crate to scan
root = "src"
# Name used for the crate in paths; defaults to the package name
# crate_name = "my_crate"

[output]
# Directory generated matchers are written below
path = "target/propmatch"
# How generated code refers to the scanned crate
type_path_root = "crate"
runtime_crate = "propmatch_runtime"

[generation]
# Module paths or type paths to generate matchers for
inputs = []
# "accessors" (get_x/is_x methods) or "fields"
properties = "accessors"
require_default_constructor = true
parallel = true

[generation.naming]
# "same_module" or "sub_module"
strategy = "same_module"
prefix = ""
suffix = "Matcher"
"#;

/// Runs the init command.
pub fn run(_cli: &Cli, args: &InitArgs) -> Result<ExitCode> {
    let config_path = args.path.join(CONFIG_FILE_NAME);

    if config_path.exists() && !args.force {
        error!("{} already exists. Use --force to overwrite.", config_path.display());
        return Ok(ExitCode::FAILURE);
    }

    fs::create_dir_all(&args.path)?;
    fs::write(&config_path, DEFAULT_CONFIG)?;
    info!("Created {}", config_path.display());

    println!("Created {}", config_path.display());
    println!("Next steps:");
    println!("  1. List the modules or types to cover under [generation] inputs");
    println!("  2. Run 'propmatch generate'");
    println!("  3. Mount the generated files next to the types they match");

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use propmatch_core::PropmatchConfig;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let config = PropmatchConfig::parse_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, PropmatchConfig::default());
    }
}
