//! `propmatch.toml` loading.

use crate::error::{PropmatchError, Result};
use crate::extract::{AccessorExtractor, FieldExtractor, PropertyExtractor};
use crate::naming::{NamingStrategy, SameModuleNaming, SubModuleNaming};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

pub const CONFIG_FILE_NAME: &str = "propmatch.toml";

static ENV_VAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}")
        .expect("Invalid regex for environment variable substitution")
});

/// Where the crate to scan lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Source root, `src` by default.
    pub root: PathBuf,
    /// Name the crate is referred to by in paths. Falls back to the
    /// `[package] name` of the Cargo.toml next to the config file.
    pub crate_name: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("src"),
            crate_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory generated matchers are written below.
    pub path: PathBuf,
    /// Prefix generated code uses to name the scanned crate.
    pub type_path_root: String,
    pub runtime_crate: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("target/propmatch"),
            type_path_root: "crate".to_string(),
            runtime_crate: "propmatch_runtime".to_string(),
        }
    }
}

/// Naming strategy selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum NamingConfig {
    SameModule {
        #[serde(default)]
        prefix: String,
        #[serde(default = "default_suffix")]
        suffix: String,
    },
    SubModule {
        #[serde(default = "default_sub_module")]
        module: String,
        #[serde(default)]
        prefix: String,
        #[serde(default = "default_suffix")]
        suffix: String,
    },
}

fn default_suffix() -> String {
    "Matcher".to_string()
}

fn default_sub_module() -> String {
    "matchers".to_string()
}

impl Default for NamingConfig {
    fn default() -> Self {
        NamingConfig::SameModule {
            prefix: String::new(),
            suffix: default_suffix(),
        }
    }
}

impl NamingConfig {
    pub fn strategy(&self) -> Arc<dyn NamingStrategy> {
        match self {
            NamingConfig::SameModule { prefix, suffix } => Arc::new(SameModuleNaming {
                prefix: prefix.clone(),
                suffix: suffix.clone(),
            }),
            NamingConfig::SubModule {
                module,
                prefix,
                suffix,
            } => Arc::new(SubModuleNaming {
                module: module.clone(),
                prefix: prefix.clone(),
                suffix: suffix.clone(),
            }),
        }
    }
}

/// Where property values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertySource {
    /// `get_x`/`is_x` accessor methods
    #[default]
    Accessors,
    /// Named fields visible to the crate
    Fields,
}

impl PropertySource {
    pub fn extractor(self) -> Arc<dyn PropertyExtractor> {
        match self {
            PropertySource::Accessors => Arc::new(AccessorExtractor),
            PropertySource::Fields => Arc::new(FieldExtractor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Module paths or type paths to generate matchers for.
    pub inputs: Vec<String>,
    pub naming: NamingConfig,
    pub properties: PropertySource,
    pub require_default_constructor: bool,
    /// Write generated files on the rayon pool.
    pub parallel: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            naming: NamingConfig::default(),
            properties: PropertySource::default(),
            require_default_constructor: true,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PropmatchConfig {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub generation: GenerationConfig,
    /// Directory of the loaded config file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl PropmatchConfig {
    /// Loads `propmatch.toml`, searching from `CARGO_MANIFEST_DIR` (if set)
    /// or the current directory upward.
    ///
    /// Variables from a `.env` file are made available to `${VAR}`
    /// substitution.
    pub fn from_toml() -> Result<Self> {
        dotenv::dotenv().ok();
        let start_dir = env::var("CARGO_MANIFEST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let config_path = find_config_file(&start_dir)?;
        Self::from_toml_path(config_path)
    }

    /// Loads a specific config file. Relative paths inside it are resolved
    /// against the file's directory.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read configuration file: {}", e);
            PropmatchError::from(e)
        })?;

        let mut config = Self::parse_toml(&contents)?;
        let base_dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        config.resolve_paths(base_dir);
        Ok(config)
    }

    /// Parses config text after `${VAR}` / `${VAR:-default}` substitution.
    pub fn parse_toml(contents: &str) -> Result<Self> {
        debug!("Configuration file size: {} bytes", contents.len());
        let substituted = substitute_env_vars(contents)?;
        let config: PropmatchConfig = toml::from_str(&substituted)
            .inspect_err(|e| error!("Failed to parse TOML configuration: {}", e))?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Makes relative source and output paths absolute against `base_dir`.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        if self.source.root.is_relative() {
            self.source.root = base_dir.join(&self.source.root);
        }
        if self.output.path.is_relative() {
            self.output.path = base_dir.join(&self.output.path);
        }
        self.base_dir = Some(base_dir.to_path_buf());
    }

    /// The configured crate name, else the package name from Cargo.toml
    /// next to the config, else `crate`.
    pub fn crate_name(&self) -> String {
        if let Some(name) = &self.source.crate_name {
            return name.clone();
        }
        let manifest = self
            .base_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Cargo.toml");
        match package_name(&manifest) {
            Some(name) => name.replace('-', "_"),
            None => {
                debug!("No package name found in {:?}, using 'crate'", manifest);
                "crate".to_string()
            }
        }
    }

    pub fn builder() -> PropmatchConfigBuilder {
        PropmatchConfigBuilder::new()
    }
}

fn package_name(manifest: &Path) -> Option<String> {
    let contents = fs::read_to_string(manifest).ok()?;
    let value: toml::Value = toml::from_str(&contents).ok()?;
    value
        .get("package")?
        .get("name")?
        .as_str()
        .map(str::to_string)
}

/// Searches for `propmatch.toml` in `start_dir` and its ancestors.
pub fn find_config_file(start_dir: &Path) -> Result<PathBuf> {
    debug!("Starting config file search from: {:?}", start_dir);
    for path in start_dir.ancestors() {
        let config_path = path.join(CONFIG_FILE_NAME);
        trace!("Checking for config at: {:?}", config_path);
        if config_path.exists() {
            return Ok(config_path);
        }
    }
    Err(PropmatchError::ConfigNotFound {
        search_start: start_dir.to_path_buf(),
    })
}

/// Replaces `${VAR}` and `${VAR:-default}` with values from the environment.
pub fn substitute_env_vars(value: &str) -> Result<String> {
    let mut result = value.to_string();

    for cap in ENV_VAR.captures_iter(value) {
        let var_name = &cap[1];
        let default_value = cap.get(2).map(|m| m.as_str());

        let replacement = match env::var(var_name) {
            Ok(val) => {
                debug!("Resolved environment variable: {}", var_name);
                val
            }
            Err(_) => match default_value {
                Some(default) => {
                    warn!(
                        "Environment variable {} not set, using default: {}",
                        var_name, default
                    );
                    default.to_string()
                }
                None => {
                    error!(
                        "Environment variable {} not set and no default provided",
                        var_name
                    );
                    return Err(PropmatchError::EnvVarNotSet(var_name.to_string()));
                }
            },
        };

        result = result.replace(&cap[0], &replacement);
    }

    Ok(result)
}

/// Builder for creating a [`PropmatchConfig`] programmatically.
#[derive(Debug, Clone, Default)]
pub struct PropmatchConfigBuilder {
    config: PropmatchConfig,
}

impl PropmatchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.source.root = path.into();
        self
    }

    pub fn crate_name(mut self, name: impl Into<String>) -> Self {
        self.config.source.crate_name = Some(name.into());
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output.path = path.into();
        self
    }

    pub fn type_path_root(mut self, root: impl Into<String>) -> Self {
        self.config.output.type_path_root = root.into();
        self
    }

    pub fn runtime_crate(mut self, name: impl Into<String>) -> Self {
        self.config.output.runtime_crate = name.into();
        self
    }

    /// Adds one module or type path to generate matchers for.
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.config.generation.inputs.push(input.into());
        self
    }

    pub fn inputs(mut self, inputs: Vec<String>) -> Self {
        self.config.generation.inputs = inputs;
        self
    }

    pub fn naming(mut self, naming: NamingConfig) -> Self {
        self.config.generation.naming = naming;
        self
    }

    pub fn properties(mut self, source: PropertySource) -> Self {
        self.config.generation.properties = source;
        self
    }

    pub fn require_default_constructor(mut self, required: bool) -> Self {
        self.config.generation.require_default_constructor = required;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.generation.parallel = parallel;
        self
    }

    pub fn build(self) -> PropmatchConfig {
        self.config
    }
}
