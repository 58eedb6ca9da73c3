// propmatch - property matcher generation for plain Rust structs

// Common modules
pub mod config;
pub mod error;
pub mod model;
pub mod type_shape;

// Pipeline stages
pub mod compile;
pub mod extract;
pub mod filter;
pub mod finder;
pub mod generate;
pub mod naming;
pub mod pipeline;
pub mod scan;

// Build-time entry points
pub mod tooling;

// Re-export commonly used items for convenience
pub use config::PropmatchConfig;
pub use error::{PropmatchError, Result};
pub use pipeline::{CandidateFailure, GenerationReport, MatcherPipeline};
pub use scan::SourceIndex;
pub use tooling::{generate, generate_with_config};
