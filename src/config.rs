//! Pipeline configuration
//!
//! Layered: built-in defaults, then an optional YAML file, then CLI flags
//! and environment variables. Everything is validated before any metadata
//! reaches the engine.
//!
//! # Config Format
//!
//! ```yaml
//! input: data/lineage.xlsx
//! sheet: metadata
//! target: sales_summary
//! output: out/lineage.json
//! render: dot
//! render_output: out/lineage.dot
//! namespace: warehouse
//! lenient: true
//! max_paths: 10000
//! ```
//!
//! Relative `input`, `output` and `render_output` paths in a config file
//! resolve against the directory holding that file. Paths given on the
//! command line resolve against the working directory, as does the default
//! `output` of `lineage.json`.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use lineage_core::{normalize_name, BuildMode, PathLimits};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_NAMESPACE: &str = "my-namespace";
pub const DEFAULT_OUTPUT: &str = "lineage.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no input file given")]
    MissingInput,

    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    #[error("cannot infer input type from {0}; pass --input-type")]
    UnknownFormat(PathBuf),

    #[error("a sheet name is required for Excel input")]
    MissingSheet,

    #[error("no target table given")]
    MissingTarget,

    #[error("output directory does not exist: {0}")]
    OutputDirMissing(PathBuf),

    #[error("namespace must not be empty")]
    EmptyNamespace,

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

/// Metadata file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Excel,
    Csv,
}

impl InputFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(InputFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(InputFormat::Excel),
            _ => None,
        }
    }
}

/// Graph rendering selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Dot,
    Mermaid,
    #[default]
    None,
}

/// Full configuration for one lineage trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Excel or CSV metadata file
    pub input: PathBuf,
    /// Inferred from the input extension when absent
    pub input_format: Option<InputFormat>,
    /// Worksheet holding the metadata (Excel only)
    pub sheet: Option<String>,
    /// Final target table
    pub target: String,
    /// Catalog JSON output path
    pub output: PathBuf,
    pub render: RenderMode,
    /// Where to write the rendered graph; returned in the report when absent
    pub render_output: Option<PathBuf>,
    /// Prefix for catalog qualified names
    pub namespace: String,
    /// Skip invalid records instead of aborting
    pub lenient: bool,
    pub max_paths: Option<usize>,
    pub max_depth: Option<usize>,
    /// Return what was found when a limit is hit
    pub allow_partial: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            input_format: None,
            sheet: None,
            target: String::new(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            render: RenderMode::None,
            render_output: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            lenient: false,
            max_paths: None,
            max_depth: None,
            allow_partial: false,
        }
    }
}

/// Values supplied on the command line or through the environment.
/// `None` keeps whatever the lower layers set.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub input_format: Option<InputFormat>,
    pub sheet: Option<String>,
    pub target: Option<String>,
    pub output: Option<PathBuf>,
    pub render: Option<RenderMode>,
    pub render_output: Option<PathBuf>,
    pub namespace: Option<String>,
    pub lenient: bool,
    pub max_paths: Option<usize>,
    pub max_depth: Option<usize>,
    pub allow_partial: bool,
}

impl TraceConfig {
    /// Load config from YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        match path.parent() {
            Some(base) if !base.as_os_str().is_empty() => Ok(config.relative_to(base)),
            _ => Ok(config),
        }
    }

    /// Anchor relative paths the file set at `base`. An unset input and the
    /// default output are left alone.
    fn relative_to(mut self, base: &Path) -> Self {
        let anchor = |p: &Path| {
            if p.is_relative() {
                base.join(p)
            } else {
                p.to_path_buf()
            }
        };
        if !self.input.as_os_str().is_empty() {
            self.input = anchor(&self.input);
        }
        if self.output != Path::new(DEFAULT_OUTPUT) {
            self.output = anchor(&self.output);
        }
        self.render_output = self.render_output.as_deref().map(anchor);
        self
    }

    /// Defaults, or the file layer when a path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Apply the command-line layer on top of this one
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(input) = overrides.input {
            self.input = input;
        }
        if overrides.input_format.is_some() {
            self.input_format = overrides.input_format;
        }
        if overrides.sheet.is_some() {
            self.sheet = overrides.sheet;
        }
        if let Some(target) = overrides.target {
            self.target = target;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(render) = overrides.render {
            self.render = render;
        }
        if overrides.render_output.is_some() {
            self.render_output = overrides.render_output;
        }
        if let Some(namespace) = overrides.namespace {
            self.namespace = namespace;
        }
        if overrides.max_paths.is_some() {
            self.max_paths = overrides.max_paths;
        }
        if overrides.max_depth.is_some() {
            self.max_depth = overrides.max_depth;
        }
        // flags can only switch these on
        self.lenient |= overrides.lenient;
        self.allow_partial |= overrides.allow_partial;
        self
    }

    /// Explicit format, or the one implied by the input extension
    pub fn resolved_format(&self) -> Result<InputFormat, ConfigError> {
        self.input_format
            .or_else(|| InputFormat::from_path(&self.input))
            .ok_or_else(|| ConfigError::UnknownFormat(self.input.clone()))
    }

    /// Check every setting and return a normalized copy: target
    /// lower-cased and trimmed, input format resolved.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::MissingInput);
        }
        if !self.input.is_file() {
            return Err(ConfigError::InputNotFound(self.input));
        }

        let format = self.resolved_format()?;
        if format == InputFormat::Excel
            && self.sheet.as_deref().map_or(true, |s| s.trim().is_empty())
        {
            return Err(ConfigError::MissingSheet);
        }
        self.input_format = Some(format);

        self.target = normalize_name(&self.target).ok_or(ConfigError::MissingTarget)?;

        check_parent_dir(&self.output)?;
        if let Some(render_output) = &self.render_output {
            check_parent_dir(render_output)?;
        }

        self.namespace = self.namespace.trim().to_string();
        if self.namespace.is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }

        if self.max_paths == Some(0) {
            return Err(ConfigError::ZeroLimit("max_paths"));
        }
        if self.max_depth == Some(0) {
            return Err(ConfigError::ZeroLimit("max_depth"));
        }

        Ok(self)
    }

    pub fn build_mode(&self) -> BuildMode {
        if self.lenient {
            BuildMode::Lenient
        } else {
            BuildMode::Strict
        }
    }

    pub fn path_limits(&self) -> PathLimits {
        let mut limits = PathLimits::unbounded();
        limits.max_paths = self.max_paths;
        limits.max_depth = self.max_depth;
        if self.allow_partial {
            limits = limits.allow_partial();
        }
        limits
    }
}

fn check_parent_dir(path: &Path) -> Result<(), ConfigError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(ConfigError::OutputDirMissing(parent.to_path_buf()))
        }
        _ => Ok(()),
    }
}
