//! Matcher source synthesis.
//!
//! [`MatcherGenerator`] turns one candidate into one matcher source file:
//! it asks the [`NamingStrategy`] where the matcher goes, the
//! [`PropertyExtractor`] what it matches on, builds a [`MatcherSpec`] and
//! hands it to a [`SourceEmitter`].

mod emit;
mod ir;

pub use emit::{EmitError, RustEmitter, SourceEmitter};
pub use ir::{DELEGATES, GENERATOR_NAME, MatcherSpec, Projection, PropertySpec};

use crate::error::{GenerationError, NamingError};
use crate::extract::{AccessorExtractor, PropertyExtractor};
use crate::model::{Candidate, MatcherSource, NamingDecision, Property, PropertyAccess, factory_name};
use crate::naming::{NamingStrategy, SameModuleNaming};
use crate::type_shape::{is_matcher, parse_type};
use bon::Builder;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Builder)]
pub struct MatcherGenerator {
    /// Directory generated files are written below.
    #[builder(into)]
    output_root: PathBuf,
    #[builder(default = Arc::new(AccessorExtractor) as Arc<dyn PropertyExtractor>)]
    extractor: Arc<dyn PropertyExtractor>,
    #[builder(default = Arc::new(SameModuleNaming::default()) as Arc<dyn NamingStrategy>)]
    naming: Arc<dyn NamingStrategy>,
    #[builder(default = Arc::new(RustEmitter) as Arc<dyn SourceEmitter>)]
    emitter: Arc<dyn SourceEmitter>,
    /// How generated code names the scanned crate: `crate` when the
    /// matchers are mounted inside it, the crate name from integration tests.
    #[builder(into, default = "crate".to_string())]
    type_path_root: String,
    #[builder(into, default = "propmatch_runtime".to_string())]
    runtime_crate: String,
}

impl MatcherGenerator {
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn extractor(&self) -> &dyn PropertyExtractor {
        self.extractor.as_ref()
    }

    pub fn naming(&self) -> &dyn NamingStrategy {
        self.naming.as_ref()
    }

    /// Generates and writes the matcher for one candidate.
    #[tracing::instrument(skip_all, fields(candidate = %candidate.path))]
    pub fn generate_matcher_for(&self, candidate: &Candidate) -> Result<MatcherSource, GenerationError> {
        let source = self.prepare(candidate)?;
        self.write(&source)?;
        Ok(source)
    }

    /// Renders the matcher for `candidate` without touching the file system.
    pub fn prepare(&self, candidate: &Candidate) -> Result<MatcherSource, GenerationError> {
        let naming = self
            .naming
            .decide(candidate)
            .map_err(|source| GenerationError::Naming {
                candidate: candidate.path.clone(),
                source,
            })?;

        let scope = naming.matcher_path().module;
        if !candidate.visibility.is_visible_from(&scope) {
            return Err(GenerationError::Naming {
                candidate: candidate.path.clone(),
                source: NamingError::new(format!(
                    "{} is not visible from matcher module {}",
                    candidate.path, scope
                )),
            });
        }

        let properties = self.extractor.extract(candidate, &scope);
        trace!("Extracted {} properties", properties.len());

        let spec = self.spec_for(candidate, &properties, &naming)?;
        let text = self.emitter.emit(&spec).map_err(|e| GenerationError::Emit {
            candidate: candidate.path.clone(),
            message: e.to_string(),
        })?;

        let output_path = self
            .output_root
            .join(naming.relative_path(self.emitter.file_extension()));

        Ok(MatcherSource {
            candidate: candidate.path.clone(),
            naming,
            output_path,
            text,
        })
    }

    /// Writes a prepared source, creating parent directories as needed.
    pub fn write(&self, source: &MatcherSource) -> Result<(), GenerationError> {
        let io_error = |source_error| GenerationError::Io {
            candidate: source.candidate.clone(),
            path: source.output_path.clone(),
            source: source_error,
        };

        if let Some(parent) = source.output_path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(&source.output_path, &source.text).map_err(io_error)?;

        debug!(
            "Wrote {} ({} bytes)",
            source.output_path.display(),
            source.text.len()
        );
        Ok(())
    }

    /// Builds the declarative description of the matcher for `candidate`.
    pub fn spec_for(
        &self,
        candidate: &Candidate,
        properties: &[Property],
        naming: &NamingDecision,
    ) -> Result<MatcherSpec, GenerationError> {
        let mut method_names = HashSet::new();
        let mut property_specs = Vec::with_capacity(properties.len());

        for property in properties {
            let value_type = parse_type(&property.value_type).ok_or_else(|| GenerationError::Emit {
                candidate: candidate.path.clone(),
                message: format!(
                    "type '{}' of property '{}' does not parse",
                    property.value_type, property.name
                ),
            })?;

            let matcher_method = format!("with_{}", property.name);
            let equality_method = (!is_matcher(&value_type)).then(|| format!("{matcher_method}_eq"));

            for method in std::iter::once(&matcher_method).chain(equality_method.as_ref()) {
                if !method_names.insert(method.clone()) {
                    return Err(GenerationError::Emit {
                        candidate: candidate.path.clone(),
                        message: format!("method {method} would be generated twice"),
                    });
                }
            }

            let projection = match property.access {
                PropertyAccess::Borrowed => Projection::Accessor {
                    method: property.accessor.clone(),
                    borrowed: true,
                },
                PropertyAccess::Owned => Projection::Accessor {
                    method: property.accessor.clone(),
                    borrowed: false,
                },
                PropertyAccess::Field => Projection::Field {
                    field: property.accessor.clone(),
                },
            };

            property_specs.push(PropertySpec {
                name: property.name.clone(),
                value_type: property.value_type.clone(),
                projection,
                matcher_method,
                equality_method,
            });
        }

        let scope_module = if candidate.path.module.is_root() {
            self.type_path_root.clone()
        } else {
            format!("{}::{}", self.type_path_root, candidate.path.module)
        };

        Ok(MatcherSpec {
            based_on: candidate.path.qualified(),
            generator: GENERATOR_NAME.to_string(),
            bean_path: format!("{}::{}", scope_module, candidate.simple_name()),
            scope_module,
            runtime_crate: self.runtime_crate.clone(),
            type_name: naming.type_name.clone(),
            factory: factory_name(candidate.simple_name()),
            properties: property_specs,
        })
    }
}
