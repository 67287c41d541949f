//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "pluginship.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "pluginship.yaml";

/// Output directory handed to `jprm plugin build`
pub const DEFAULT_OUTPUT_DIR: &str = "artifacts";

/// Repository manifest updated by `jprm repo add`
pub const DEFAULT_MANIFEST: &str = "Repository/manifest.json";

/// Tags considered by `git describe`
pub const DEFAULT_TAG_MATCH: &str = "v[0-9]*.[0-9]*.[0-9]*";

/// Verbosity passed to jprm via `-v`
pub const DEFAULT_VERBOSITY: &str = "debug";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".pluginship.toml",
        ".pluginship.yaml",
    ]
}
