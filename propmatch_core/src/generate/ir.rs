//! Declarative description of one generated matcher.
//!
//! The generator decides *what* a matcher contains; a
//! [`SourceEmitter`](super::SourceEmitter) decides how it is spelled.

use serde::Serialize;

/// Methods every generated matcher forwards to its inner property matcher.
pub const DELEGATES: [&str; 3] = ["matches", "describe_to", "describe_mismatch"];

/// Name recorded as `GENERATOR` in generated sources.
pub const GENERATOR_NAME: &str = "propmatch";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatcherSpec {
    /// Candidate path relative to the crate root, recorded as `BASED_ON`.
    pub based_on: String,
    pub generator: String,
    /// Absolute path of the candidate as seen from the generated file.
    pub bean_path: String,
    /// Module whose items the generated file imports, so value types
    /// resolve as they do next to the candidate.
    pub scope_module: String,
    pub runtime_crate: String,
    pub type_name: String,
    pub factory: String,
    pub properties: Vec<PropertySpec>,
}

impl MatcherSpec {
    /// Every per-property method, in emission order.
    pub fn property_methods(&self) -> Vec<&str> {
        self.properties
            .iter()
            .flat_map(|property| {
                std::iter::once(property.matcher_method.as_str())
                    .chain(property.equality_method.as_deref())
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySpec {
    pub name: String,
    pub value_type: String,
    pub projection: Projection,
    /// `with_x(matcher)`
    pub matcher_method: String,
    /// `with_x_eq(value)`, absent for matcher-valued properties.
    pub equality_method: Option<String>,
}

/// How the property value is reached from a `&Bean`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    Accessor { method: String, borrowed: bool },
    Field { field: String },
}
