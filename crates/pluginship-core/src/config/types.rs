//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::{
    DEFAULT_MANIFEST, DEFAULT_OUTPUT_DIR, DEFAULT_TAG_MATCH, DEFAULT_VERBOSITY,
};
use crate::descriptor::DEFAULT_ABI_PACKAGE;
use crate::metadata::{DEFAULT_ABI_KEY, DEFAULT_CHANGELOG_KEY, DEFAULT_METADATA_FILE};
use crate::release::DEFAULT_HOST;

/// Main configuration for pluginship
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project descriptor settings
    pub project: ProjectConfig,

    /// Plugin metadata file settings
    pub metadata: MetadataConfig,

    /// Build settings
    pub build: BuildConfig,

    /// Plugin repository settings
    pub repository: RepositoryConfig,

    /// External programs
    pub tools: ToolsConfig,

    /// Git settings
    pub git: GitConfig,
}

/// Project descriptor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Path to the .csproj, relative to the working directory.
    /// Discovered when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<PathBuf>,

    /// Package whose reference version is the target ABI
    pub abi_package: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            descriptor: None,
            abi_package: DEFAULT_ABI_PACKAGE.to_string(),
        }
    }
}

/// Metadata file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Path to the JPRM metadata file
    pub file: PathBuf,

    /// Key receiving the target ABI during the build
    pub abi_key: String,

    /// Key receiving the release notes during the build
    pub changelog_key: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_METADATA_FILE),
            abi_key: DEFAULT_ABI_KEY.to_string(),
            changelog_key: DEFAULT_CHANGELOG_KEY.to_string(),
        }
    }
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory the zip archive is written to
    pub output_dir: PathBuf,

    /// Override for `--max-cpu-count`; defaults to available parallelism
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cpu_count: Option<usize>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_cpu_count: None,
        }
    }
}

/// Plugin repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Manifest JSON the artifact is registered in
    pub manifest: PathBuf,

    /// Host bare repository identifiers are resolved against
    pub host: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            host: DEFAULT_HOST.to_string(),
        }
    }
}

/// External program configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// git executable
    pub git: String,

    /// jprm executable
    pub jprm: String,

    /// Log level passed to jprm
    pub verbosity: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            jprm: "jprm".to_string(),
            verbosity: DEFAULT_VERBOSITY.to_string(),
        }
    }
}

/// Git configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Glob passed to `git describe --match`
    pub tag_match: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            tag_match: DEFAULT_TAG_MATCH.to_string(),
        }
    }
}

impl Config {
    /// Parallelism hint for the build: the configured value, else the number
    /// of available processing units, else 1
    pub fn max_cpu_count(&self) -> usize {
        self.build.max_cpu_count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.project.descriptor, None);
        assert_eq!(config.project.abi_package, "Jellyfin.Controller");
        assert_eq!(config.metadata.file, PathBuf::from("jprm.yaml"));
        assert_eq!(config.metadata.abi_key, "targetAbi");
        assert_eq!(config.metadata.changelog_key, "changelog");
        assert_eq!(config.build.output_dir, PathBuf::from("artifacts"));
        assert_eq!(
            config.repository.manifest,
            PathBuf::from("Repository/manifest.json")
        );
        assert_eq!(config.repository.host, "https://github.com");
        assert_eq!(config.tools.verbosity, "debug");
        assert_eq!(config.git.tag_match, "v[0-9]*.[0-9]*.[0-9]*");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[tools]\njprm = \"/opt/jprm/bin/jprm\"\n").unwrap();
        assert_eq!(config.tools.jprm, "/opt/jprm/bin/jprm");
        assert_eq!(config.tools.git, "git");
        assert_eq!(config.metadata.file, PathBuf::from("jprm.yaml"));
    }

    #[test]
    fn test_max_cpu_count() {
        let mut config = Config::default();
        assert!(config.max_cpu_count() >= 1);
        config.build.max_cpu_count = Some(3);
        assert_eq!(config.max_cpu_count(), 3);
    }
}
