use crate::model::TypePath;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that fail a whole invocation.
///
/// Anything scoped to a single candidate is a [`GenerationError`] or a
/// [`CompileError`] instead and ends up in the generation report.
#[derive(Error, Debug)]
pub enum PropmatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in file {file}: {message}")]
    ParseError { file: PathBuf, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("propmatch.toml not found in {search_start:?} or any parent directory")]
    ConfigNotFound { search_start: PathBuf },

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("Workspace scan error: {0}")]
    WorkspaceScan(String),

    #[error("None of the inputs resolved to a module or type: [{}]", inputs.join(", "))]
    NothingResolved { inputs: Vec<String> },

    #[error("Compilation produced no matcher from {attempted} generated sources")]
    NoCompiledOutput { attempted: usize },
}

pub type Result<T> = std::result::Result<T, PropmatchError>;

impl PropmatchError {
    pub fn parse_error(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        PropmatchError::ParseError {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn workspace_scan(message: impl Into<String>) -> Self {
        PropmatchError::WorkspaceScan(message.into())
    }
}

/// A naming strategy could not produce a usable target for a candidate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct NamingError(pub String);

impl NamingError {
    pub fn new(message: impl Into<String>) -> Self {
        NamingError(message.into())
    }
}

/// Failure to produce the matcher source of one candidate.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Error on type name generation for the matcher of {candidate}: {source}")]
    Naming {
        candidate: TypePath,
        #[source]
        source: NamingError,
    },

    #[error("Error on rendering the matcher of {candidate}: {message}")]
    Emit { candidate: TypePath, message: String },

    #[error("Error on writing the matcher of {candidate} to {path:?}: {source}")]
    Io {
        candidate: TypePath,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Matcher of {candidate} would overwrite {path:?}, already generated for {claimed_by}")]
    PathCollision {
        candidate: TypePath,
        path: PathBuf,
        claimed_by: TypePath,
    },
}

impl GenerationError {
    pub fn candidate(&self) -> &TypePath {
        match self {
            GenerationError::Naming { candidate, .. }
            | GenerationError::Emit { candidate, .. }
            | GenerationError::Io { candidate, .. }
            | GenerationError::PathCollision { candidate, .. } => candidate,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            GenerationError::Naming { .. } => FailureKind::Naming,
            GenerationError::Emit { .. } => FailureKind::Emit,
            GenerationError::Io { .. } => FailureKind::GenerationIo,
            GenerationError::PathCollision { .. } => FailureKind::PathCollision,
        }
    }
}

/// A generated source that did not verify.
#[derive(Error, Debug, Clone)]
#[error("Generated matcher {path:?} for {candidate} is invalid: {message}")]
pub struct CompileError {
    pub candidate: TypePath,
    pub path: PathBuf,
    pub message: String,
}

/// An input that named neither a module nor a type.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Neither a module nor a type exists for '{input}'")]
pub struct UnresolvedInput {
    pub input: String,
}

/// Classification of a dropped candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Naming,
    Emit,
    GenerationIo,
    PathCollision,
    Compile,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Naming => "naming",
            FailureKind::Emit => "emit",
            FailureKind::GenerationIo => "generation_io",
            FailureKind::PathCollision => "path_collision",
            FailureKind::Compile => "compile",
        };
        f.write_str(name)
    }
}
