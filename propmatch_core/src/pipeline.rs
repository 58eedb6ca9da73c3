//! One generation batch: FIND -> FILTER -> GENERATE -> COMPILE.
//!
//! Failures scoped to a candidate are recorded in the [`GenerationReport`]
//! and never stop the batch. Only a batch in which no input resolved, or in
//! which nothing written could be verified, is an error.

use crate::compile::{MatcherCompiler, SynCompiler};
use crate::config::PropmatchConfig;
use crate::error::{
    CompileError, FailureKind, GenerationError, PropmatchError, Result, UnresolvedInput,
};
use crate::filter::{EligibilityFilter, StandardFilter};
use crate::finder::CandidateFinder;
use crate::generate::MatcherGenerator;
use crate::model::{Candidate, GeneratedArtifact, MatcherSource, TypePath};
use crate::scan::SourceIndex;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// A candidate that was dropped, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateFailure {
    pub candidate: TypePath,
    pub kind: FailureKind,
    pub cause: String,
}

impl From<&GenerationError> for CandidateFailure {
    fn from(err: &GenerationError) -> Self {
        CandidateFailure {
            candidate: err.candidate().clone(),
            kind: err.kind(),
            cause: err.to_string(),
        }
    }
}

impl From<CompileError> for CandidateFailure {
    fn from(err: CompileError) -> Self {
        CandidateFailure {
            cause: err.to_string(),
            candidate: err.candidate,
            kind: FailureKind::Compile,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub artifacts: Vec<GeneratedArtifact>,
    pub failures: Vec<CandidateFailure>,
    pub unresolved: Vec<UnresolvedInput>,
    pub candidates_found: usize,
    pub candidates_eligible: usize,
    pub sources_written: usize,
}

impl GenerationReport {
    /// Every eligible candidate produced an artifact.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.unresolved.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn failures_of(&self, kind: FailureKind) -> impl Iterator<Item = &CandidateFailure> {
        self.failures.iter().filter(move |failure| failure.kind == kind)
    }

    fn record(&mut self, failure: CandidateFailure) {
        warn!(
            candidate = %failure.candidate,
            kind = %failure.kind,
            cause = %failure.cause,
            "Candidate dropped from generation"
        );
        self.failures.push(failure);
    }
}

pub struct MatcherPipeline {
    generator: MatcherGenerator,
    filter: Box<dyn EligibilityFilter>,
    compiler: Box<dyn MatcherCompiler>,
    parallel: bool,
}

impl MatcherPipeline {
    pub fn new(generator: MatcherGenerator) -> Self {
        MatcherPipeline {
            generator,
            filter: Box::new(StandardFilter::default()),
            compiler: Box::new(SynCompiler),
            parallel: true,
        }
    }

    /// Wires generator, filter and compiler from a loaded configuration.
    pub fn from_config(config: &PropmatchConfig) -> Self {
        let generation = &config.generation;
        let generator = MatcherGenerator::builder()
            .output_root(config.output.path.clone())
            .extractor(generation.properties.extractor())
            .naming(generation.naming.strategy())
            .type_path_root(config.output.type_path_root.clone())
            .runtime_crate(config.output.runtime_crate.clone())
            .build();

        MatcherPipeline::new(generator)
            .with_filter(StandardFilter {
                require_default_constructor: generation.require_default_constructor,
            })
            .parallel(generation.parallel)
    }

    pub fn with_filter(mut self, filter: impl EligibilityFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn with_compiler(mut self, compiler: impl MatcherCompiler + 'static) -> Self {
        self.compiler = Box::new(compiler);
        self
    }

    /// Whether generated files are written on the rayon pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn generator(&self) -> &MatcherGenerator {
        &self.generator
    }

    pub fn filter(&self) -> &dyn EligibilityFilter {
        self.filter.as_ref()
    }

    pub fn run<S: AsRef<str>>(&self, index: &SourceIndex, inputs: &[S]) -> Result<GenerationReport> {
        let mut report = GenerationReport::default();
        if inputs.is_empty() {
            warn!("No inputs given, nothing to generate");
            return Ok(report);
        }

        info!("Finding candidates for {} inputs", inputs.len());
        let found = CandidateFinder::new(index).find(inputs);
        if found.unresolved.len() == inputs.len() {
            return Err(PropmatchError::NothingResolved {
                inputs: inputs.iter().map(|i| i.as_ref().to_string()).collect(),
            });
        }
        report.unresolved = found.unresolved;
        report.candidates_found = found.candidates.len();

        let eligible = self.filter.filter(found.candidates);
        report.candidates_eligible = eligible.len();
        info!(
            "{} of {} candidates are eligible",
            report.candidates_eligible, report.candidates_found
        );

        let written = self.generate_all(&eligible, &mut report);
        report.sources_written = written.len();
        if written.is_empty() {
            info!("No matcher sources written");
            return Ok(report);
        }

        info!("Verifying {} generated sources", written.len());
        let outcome = self.compiler.compile(&written);
        if outcome.artifacts.is_empty() {
            return Err(PropmatchError::NoCompiledOutput {
                attempted: written.len(),
            });
        }
        // Already logged by the compiler.
        report
            .failures
            .extend(outcome.failures.into_iter().map(CandidateFailure::from));
        report.artifacts = outcome.artifacts;

        info!(
            "Generated {} matchers, {} candidates failed",
            report.artifacts.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Prepares every candidate, claims output paths in candidate order,
    /// then writes what was claimed. Returns the sources that were written.
    fn generate_all(&self, candidates: &[Candidate], report: &mut GenerationReport) -> Vec<MatcherSource> {
        let mut claimed: HashMap<PathBuf, TypePath> = HashMap::new();
        let mut prepared = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let result = self.generator.prepare(candidate).and_then(|source| {
                match claimed.get(&source.output_path) {
                    Some(owner) => Err(GenerationError::PathCollision {
                        candidate: candidate.path.clone(),
                        path: source.output_path.clone(),
                        claimed_by: owner.clone(),
                    }),
                    None => {
                        claimed.insert(source.output_path.clone(), candidate.path.clone());
                        Ok(source)
                    }
                }
            });

            match result {
                Ok(source) => prepared.push(source),
                Err(err) => report.record(CandidateFailure::from(&err)),
            }
        }

        debug!("Writing {} sources (parallel: {})", prepared.len(), self.parallel);
        let write = |source: MatcherSource| {
            let result = self.generator.write(&source);
            (source, result)
        };
        let results: Vec<_> = if self.parallel {
            prepared.into_par_iter().map(write).collect()
        } else {
            prepared.into_iter().map(write).collect()
        };

        let mut written = Vec::with_capacity(results.len());
        for (source, result) in results {
            match result {
                Ok(()) => written.push(source),
                Err(err) => report.record(CandidateFailure::from(&err)),
            }
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::CompileOutcome;
    use crate::model::{ModulePath, TypePath};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn index() -> SourceIndex {
        let mut index = SourceIndex::new("demo");
        index
            .parse_module(
                "model",
                r#"
                #[derive(Default)]
                pub struct Person { name: String }
                impl Person {
                    pub fn get_name(&self) -> &String { &self.name }
                }
                #[derive(Default)]
                pub struct Address;
                pub trait Named {}
                pub struct NoCtor { id: u32 }
                "#,
            )
            .unwrap();
        index
    }

    fn pipeline(dir: &TempDir) -> MatcherPipeline {
        MatcherPipeline::new(MatcherGenerator::builder().output_root(dir.path()).build())
    }

    #[test]
    fn test_run_counts_and_artifacts() {
        let dir = TempDir::new().unwrap();
        let report = pipeline(&dir).run(&index(), &["model"]).unwrap();

        assert_eq!(report.candidates_found, 4);
        assert_eq!(report.candidates_eligible, 2);
        assert_eq!(report.sources_written, 2);
        assert!(report.is_success());
        let names: Vec<_> = report.artifacts.iter().map(|a| a.qualified_name()).collect();
        assert_eq!(
            names,
            vec![
                "model::person_matcher::PersonMatcher",
                "model::address_matcher::AddressMatcher"
            ]
        );
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let parallel_dir = TempDir::new().unwrap();
        let sequential_dir = TempDir::new().unwrap();
        let parallel = pipeline(&parallel_dir).run(&index(), &["model"]).unwrap();
        let sequential = pipeline(&sequential_dir)
            .parallel(false)
            .run(&index(), &["model"])
            .unwrap();

        assert_eq!(parallel.artifacts.len(), sequential.artifacts.len());
        for (a, b) in parallel.artifacts.iter().zip(&sequential.artifacts) {
            assert_eq!(
                std::fs::read_to_string(&a.source_path).unwrap(),
                std::fs::read_to_string(&b.source_path).unwrap()
            );
        }
    }

    #[test]
    fn test_empty_inputs_give_empty_report() {
        let dir = TempDir::new().unwrap();
        let report = pipeline(&dir).run::<&str>(&index(), &[]).unwrap();
        assert_eq!(report.candidates_found, 0);
        assert!(report.artifacts.is_empty());
    }

    #[test]
    fn test_nothing_resolved_fails_batch() {
        let dir = TempDir::new().unwrap();
        let err = pipeline(&dir)
            .run(&index(), &["missing", "model::Ghost"])
            .unwrap_err();
        match err {
            PropmatchError::NothingResolved { inputs } => {
                assert_eq!(inputs, vec!["missing", "model::Ghost"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_partially_resolved_inputs_are_reported() {
        let dir = TempDir::new().unwrap();
        let report = pipeline(&dir)
            .run(&index(), &["model::Person", "model::Ghost"])
            .unwrap();
        assert_eq!(report.artifacts.len(), 1);
        assert_eq!(report.unresolved, vec![UnresolvedInput { input: "model::Ghost".to_string() }]);
        assert!(!report.is_success());
    }

    #[test]
    fn test_compiler_rejecting_everything_fails_batch() {
        struct RejectAll;
        impl MatcherCompiler for RejectAll {
            fn compile(&self, sources: &[MatcherSource]) -> CompileOutcome {
                CompileOutcome {
                    artifacts: Vec::new(),
                    failures: sources
                        .iter()
                        .map(|s| CompileError {
                            candidate: s.candidate.clone(),
                            path: s.output_path.clone(),
                            message: "rejected".to_string(),
                        })
                        .collect(),
                }
            }
        }

        let dir = TempDir::new().unwrap();
        let err = pipeline(&dir)
            .with_compiler(RejectAll)
            .run(&index(), &["model"])
            .unwrap_err();
        assert!(matches!(err, PropmatchError::NoCompiledOutput { attempted: 2 }));
    }

    #[test]
    fn test_report_json() {
        let dir = TempDir::new().unwrap();
        let report = pipeline(&dir).run(&index(), &["model::Person"]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["candidates_eligible"], 1);
        assert_eq!(json["artifacts"][0]["type_name"], "PersonMatcher");
        assert_eq!(json["artifacts"][0]["based_on"], "model::Person");
    }

    #[test]
    fn test_compile_failure_becomes_candidate_failure() {
        let failure = CandidateFailure::from(CompileError {
            candidate: TypePath::new(ModulePath::parse("model"), "Person"),
            path: PathBuf::from("model/person_matcher.rs"),
            message: "struct PersonMatcher is missing".to_string(),
        });
        assert_eq!(failure.kind, FailureKind::Compile);
        assert!(failure.cause.contains("struct PersonMatcher is missing"));
    }
}
