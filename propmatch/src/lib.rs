pub use propmatch_core::{
    GenerationReport, MatcherPipeline, PropmatchConfig, PropmatchError, Result, SourceIndex,
    config, error, generate, generate_with_config, model, pipeline,
};
pub use propmatch_runtime::{
    Description, EqualTo, GeneratedMatcher, Matcher, PropertyMatcher, anything, assert_that,
    equal_to, not,
};

pub mod prelude {
    pub use propmatch_runtime::{Matcher, assert_that, equal_to, not};
}
