//! pluginship core - building blocks for packaging JPRM plugin releases
//!
//! This crate provides the error taxonomy, configuration, project descriptor
//! introspection, the metadata patch guard, release URL derivation and the
//! subprocess abstraction shared by the git and jprm integrations.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod metadata;
pub mod mock;
pub mod process;
pub mod release;

pub use config::Config;
pub use descriptor::{locate_descriptor, ProjectDescriptor};
pub use error::{
    ConfigError, DescriptorError, GitError, MetadataError, PluginshipError, Result, ToolError,
};
pub use metadata::{EphemeralFields, MetadataDocument, MetadataPatch};
pub use process::{Capture, ExitCode, Invocation, SystemRunner, ToolOutput, ToolRunner};
pub use release::{download_url, normalize_repository_url, ReleaseSummary, ReleaseTag};
