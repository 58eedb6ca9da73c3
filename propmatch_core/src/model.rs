//! Plain data shared by every pipeline stage.
//!
//! Types are kept as normalized token strings rather than `syn` trees so the
//! model stays `Send + Sync` and serializable.

use crate::error::NamingError;
use bon::Builder;
use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Path of a module inside the scanned crate. Empty is the crate root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    pub fn root() -> Self {
        ModulePath(Vec::new())
    }

    /// Parses `a::b::c`. Empty segments are dropped, so `""` is the root.
    pub fn parse(path: &str) -> Self {
        ModulePath(
            path.split("::")
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ModulePath(segments.into_iter().map(Into::into).collect())
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        ModulePath(segments)
    }

    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(ModulePath(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `self` is `ancestor` or nested below it.
    pub fn is_within(&self, ancestor: &ModulePath) -> bool {
        self.0.starts_with(&ancestor.0)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// `model::nested` -> `model/nested`.
    pub fn to_relative_dir(&self) -> PathBuf {
        self.0.iter().collect()
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("crate")
        } else {
            f.write_str(&self.0.join("::"))
        }
    }
}

impl From<String> for ModulePath {
    fn from(value: String) -> Self {
        if value == "crate" {
            return ModulePath::root();
        }
        ModulePath::parse(&value)
    }
}

impl From<ModulePath> for String {
    fn from(value: ModulePath) -> Self {
        value.to_string()
    }
}

/// A type addressed by its module and simple name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypePath {
    pub module: ModulePath,
    pub name: String,
}

impl TypePath {
    pub fn new(module: ModulePath, name: impl Into<String>) -> Self {
        TypePath {
            module,
            name: name.into(),
        }
    }

    /// Path relative to the crate root, without a `crate::` prefix.
    pub fn qualified(&self) -> String {
        if self.module.is_root() {
            self.name.clone()
        } else {
            format!("{}::{}", self.module, self.name)
        }
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

impl From<String> for TypePath {
    fn from(value: String) -> Self {
        match value.rsplit_once("::") {
            Some((module, name)) => TypePath::new(ModulePath::from(module.to_string()), name),
            None => TypePath::new(ModulePath::root(), value),
        }
    }
}

impl From<TypePath> for String {
    fn from(value: TypePath) -> Self {
        value.qualified()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Struct,
    Enum,
    Union,
    Trait,
    Alias,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKind::Struct => "struct",
            TypeKind::Enum => "enum",
            TypeKind::Union => "union",
            TypeKind::Trait => "trait",
            TypeKind::Alias => "type alias",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// `pub`
    Public,
    /// `pub(crate)`, `pub(super)`, `pub(in ..)`, resolved to the module
    /// the item is visible in.
    Restricted { scope: ModulePath },
    /// No modifier, or `pub(self)`.
    Private,
}

impl Visibility {
    /// Whether code in `module` can name the item.
    ///
    /// Private items are never reachable, even from child modules.
    pub fn is_visible_from(&self, module: &ModulePath) -> bool {
        match self {
            Visibility::Public => true,
            Visibility::Restricted { scope } => module.is_within(scope),
            Visibility::Private => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Receiver {
    None,
    Ref,
    RefMut,
    Value,
}

/// Signature of an inherent method, reduced to what property extraction needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct MethodSig {
    #[builder(into)]
    pub name: String,
    pub receiver: Receiver,
    #[builder(default)]
    pub params: Vec<String>,
    #[builder(into)]
    pub return_type: Option<String>,
    #[builder(default = Visibility::Public)]
    pub visibility: Visibility,
    #[builder(default)]
    pub is_generic: bool,
    #[builder(default)]
    pub is_async: bool,
    #[builder(default)]
    pub is_unsafe: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSig {
    pub name: String,
    pub ty: String,
    pub visibility: Visibility,
}

/// A type found by the candidate finder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct Candidate {
    pub path: TypePath,
    pub kind: TypeKind,
    #[builder(default = Visibility::Public)]
    pub visibility: Visibility,
    #[builder(default)]
    pub is_generic: bool,
    /// Declared inside a function body.
    #[builder(default)]
    pub is_local: bool,
    /// Produced by this generator.
    #[builder(default)]
    pub is_generated: bool,
    #[builder(default)]
    pub has_default_constructor: bool,
    #[builder(default)]
    pub methods: Vec<MethodSig>,
    #[builder(default)]
    pub fields: Vec<FieldSig>,
    pub source_file: Option<PathBuf>,
}

impl Candidate {
    pub fn simple_name(&self) -> &str {
        &self.path.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyAccess {
    /// Accessor returns `&V`.
    Borrowed,
    /// Accessor returns `V`.
    Owned,
    /// Public field, read through a borrow.
    Field,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    /// Declared type with one leading reference removed.
    pub value_type: String,
    pub access: PropertyAccess,
    /// Method or field the value is read through.
    pub accessor: String,
    pub setter: Option<String>,
}

/// Where a matcher goes and what it is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingDecision {
    pub module: ModulePath,
    pub type_name: String,
}

impl NamingDecision {
    pub fn new(module: ModulePath, type_name: impl Into<String>) -> Result<Self, NamingError> {
        let type_name = type_name.into();
        validate_identifier(&type_name)?;
        for segment in module.segments() {
            validate_identifier(segment)?;
        }
        Ok(NamingDecision { module, type_name })
    }

    pub fn file_stem(&self) -> String {
        self.type_name.to_case(Case::Snake)
    }

    /// `model/person_matcher.rs` relative to the output root.
    pub fn relative_path(&self, extension: &str) -> PathBuf {
        self.module
            .to_relative_dir()
            .join(format!("{}.{}", self.file_stem(), extension))
    }

    pub fn type_path(&self) -> TypePath {
        TypePath::new(self.module.clone(), self.type_name.clone())
    }

    /// Path of the matcher once its file is mounted as a child module,
    /// e.g. `model::person_matcher::PersonMatcher`.
    pub fn matcher_path(&self) -> TypePath {
        TypePath::new(self.module.child(self.file_stem()), self.type_name.clone())
    }
}

/// `Person` -> `is_person`.
pub fn factory_name(simple_name: &str) -> String {
    format!("is_{}", simple_name.to_case(Case::Snake))
}

fn validate_identifier(name: &str) -> Result<(), NamingError> {
    if name.is_empty() {
        return Err(NamingError::new("empty identifier"));
    }
    if syn::parse_str::<syn::Ident>(name).is_err() {
        return Err(NamingError::new(format!(
            "'{name}' is not a valid Rust identifier"
        )));
    }
    Ok(())
}

/// Rendered matcher source for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherSource {
    pub candidate: TypePath,
    pub naming: NamingDecision,
    pub output_path: PathBuf,
    pub text: String,
}

/// Verified handle to a generated matcher.
///
/// A matcher file is mounted as a child module of its target module, so
/// `PersonMatcher` in `model` lives at `model::person_matcher::PersonMatcher`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    pub based_on: TypePath,
    pub module: ModulePath,
    pub file_stem: String,
    pub type_name: String,
    pub factory: String,
    pub source_path: PathBuf,
    /// `with_*` methods found in the verified source, in source order.
    pub property_methods: Vec<String>,
    pub delegates: Vec<String>,
}

impl GeneratedArtifact {
    pub fn type_path(&self) -> TypePath {
        TypePath::new(self.module.child(self.file_stem.clone()), self.type_name.clone())
    }

    pub fn qualified_name(&self) -> String {
        self.type_path().qualified()
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}
