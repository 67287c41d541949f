//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_metadata(config)?;
    validate_paths(config)?;
    validate_repository(config)?;
    validate_tools(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn validate_metadata(config: &Config) -> Result<()> {
    if config.metadata.abi_key.is_empty() {
        return Err(invalid("metadata.abi_key", "key cannot be empty").into());
    }

    if config.metadata.changelog_key.is_empty() {
        return Err(invalid("metadata.changelog_key", "key cannot be empty").into());
    }

    if config.metadata.abi_key == config.metadata.changelog_key {
        return Err(invalid(
            "metadata.changelog_key",
            "must differ from metadata.abi_key",
        )
        .into());
    }

    if config.project.abi_package.is_empty() {
        return Err(invalid("project.abi_package", "package cannot be empty").into());
    }

    Ok(())
}

fn validate_paths(config: &Config) -> Result<()> {
    let paths = [
        ("metadata.file", &config.metadata.file),
        ("build.output_dir", &config.build.output_dir),
        ("repository.manifest", &config.repository.manifest),
    ];

    for (field, path) in paths {
        if path.as_os_str().is_empty() {
            return Err(invalid(field, "path cannot be empty").into());
        }
    }

    if let Some(descriptor) = &config.project.descriptor {
        if descriptor.as_os_str().is_empty() {
            return Err(invalid("project.descriptor", "path cannot be empty").into());
        }
    }

    if config.build.max_cpu_count == Some(0) {
        return Err(invalid("build.max_cpu_count", "must be at least 1").into());
    }

    Ok(())
}

fn validate_repository(config: &Config) -> Result<()> {
    let host = &config.repository.host;
    if !host.starts_with("https://") && !host.starts_with("http://") {
        return Err(invalid("repository.host", "must start with http:// or https://").into());
    }

    Ok(())
}

fn validate_tools(config: &Config) -> Result<()> {
    if config.tools.git.is_empty() {
        return Err(invalid("tools.git", "program cannot be empty").into());
    }

    if config.tools.jprm.is_empty() {
        return Err(invalid("tools.jprm", "program cannot be empty").into());
    }

    if config.git.tag_match.is_empty() {
        return Err(invalid("git.tag_match", "pattern cannot be empty").into());
    }

    Ok(())
}
