//! Build-time entry points.
//!
//! ## Quick Start (in build.rs)
//!
//! ```rust,ignore
//! fn main() {
//!     propmatch_core::tooling::generate().expect("Matcher generation failed");
//!     println!("cargo:rerun-if-changed=src/");
//!     println!("cargo:rerun-if-changed=propmatch.toml");
//! }
//! ```
//!
//! Generated matchers are then mounted next to the types they match:
//!
//! ```rust,ignore
//! // src/model.rs
//! #[cfg(test)]
//! pub mod person_matcher {
//!     include!(concat!(env!("OUT_DIR"), "/model/person_matcher.rs"));
//! }
//! ```

use crate::config::PropmatchConfig;
use crate::error::Result;
use crate::pipeline::{GenerationReport, MatcherPipeline};
use crate::scan::SourceIndex;
use tracing::info;

/// Generates matchers for the inputs configured in `propmatch.toml`.
///
/// The configuration is searched from `CARGO_MANIFEST_DIR` upward.
///
/// # Errors
///
/// Returns `PropmatchError` if:
/// - Configuration file cannot be found or parsed
/// - The source root cannot be scanned
/// - None of the configured inputs resolves
/// - No generated source could be verified
pub fn generate() -> Result<GenerationReport> {
    let config = PropmatchConfig::from_toml()?;
    let inputs = config.generation.inputs.clone();
    generate_with_config(&config, &inputs)
}

/// Generates matchers for `inputs` with a custom configuration.
///
/// `inputs` takes precedence over `generation.inputs`; pass an empty slice
/// to use the configured ones.
pub fn generate_with_config<S: AsRef<str>>(
    config: &PropmatchConfig,
    inputs: &[S],
) -> Result<GenerationReport> {
    let crate_name = config.crate_name();
    info!(
        "Scanning {:?} as crate '{}'",
        config.source.root, crate_name
    );
    let index = SourceIndex::scan(&config.source.root, &crate_name)?;
    let pipeline = MatcherPipeline::from_config(config);

    if inputs.is_empty() {
        pipeline.run(&index, &config.generation.inputs)
    } else {
        pipeline.run(&index, inputs)
    }
}
