//! Error types for pluginship

use std::path::PathBuf;
use thiserror::Error;

use crate::process::ExitCode;

/// Result type alias using PluginshipError
pub type Result<T> = std::result::Result<T, PluginshipError>;

/// Main error type for pluginship operations
#[derive(Debug, Error)]
pub enum PluginshipError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Project descriptor errors
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    /// Metadata document errors
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// External tool errors
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Output path exists but is not a directory
    #[error("\"{0}\" is not a directory")]
    NotADirectory(PathBuf),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginshipError {
    /// Whether the error was caused by user input or project files rather than a tool
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Descriptor(_) | Self::Metadata(_) | Self::NotADirectory(_)
        )
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Project descriptor (.csproj) errors
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// Descriptor file not found
    #[error("Project descriptor not found at {0}")]
    NotFound(PathBuf),

    /// More than one candidate descriptor and none configured
    #[error("Multiple project descriptors found: {0:?}. Set project.descriptor in the config")]
    Ambiguous(Vec<PathBuf>),

    /// No TargetFramework(s) element
    #[error("Failed to get .net framework version from {0}")]
    FrameworkMissing(PathBuf),

    /// No PackageReference for the ABI package
    #[error("Failed to get {package} package reference version in {path}")]
    AbiReferenceMissing { package: String, path: PathBuf },

    /// Failed to read the descriptor
    #[error("Failed to read project descriptor {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Plugin metadata document errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Document parsed to nothing
    #[error("Failed to load any metadata from \"{0}\"")]
    Empty(PathBuf),

    /// Document is not a key-value mapping
    #[error("Metadata in \"{0}\" is not a mapping")]
    NotAMapping(PathBuf),

    /// YAML (de)serialization error
    #[error("YAML error in \"{path}\": {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// IO error
    #[error("IO error on \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// `git describe` exited unsuccessfully
    #[error("Git describe returned error code: {code} {stderr}")]
    DescribeFailed { code: ExitCode, stderr: String },

    /// `git describe` succeeded but printed nothing
    #[error("No tags found matching pattern: {0}")]
    NoTags(String),

    /// Git could not be executed at all
    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// External tool errors
#[derive(Debug, Error)]
pub enum ToolError {
    /// Program not on PATH
    #[error("Required tool '{tool}' not found. {install_hint}")]
    NotFound { tool: String, install_hint: String },

    /// Program could not be spawned
    #[error("Failed to run {command}: {message}")]
    SpawnFailed { command: String, message: String },

    /// Program exited unsuccessfully
    #[error("{command} returned error code: {code}")]
    ExitStatus {
        command: String,
        code: ExitCode,
        stderr: String,
    },

    /// Program succeeded but its output was unusable
    #[error("{command} produced no output")]
    EmptyOutput { command: String },
}

impl ToolError {
    /// Exit code of the failed program, if it ran
    pub fn exit_code(&self) -> Option<ExitCode> {
        match self {
            Self::ExitStatus { code, .. } => Some(*code),
            _ => None,
        }
    }
}
