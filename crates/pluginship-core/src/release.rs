//! Release identity: repository URL, tag, and download location

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Default forge host repository identifiers are resolved against
pub const DEFAULT_HOST: &str = "https://github.com";

/// Normalize a repository identifier into a full URL.
///
/// Checked in order:
///   1. `https://...` is used verbatim.
///   2. `<host>/...` (e.g. `github.com/owner/repo`) gets the host's scheme prefixed.
///   3. Any other absolute URL (e.g. `http://...`) is used verbatim.
///   4. Anything else is appended to `host` (`owner/repo` becomes
///      `https://github.com/owner/repo`).
///
/// Nothing is validated or escaped; a malformed identifier yields a malformed URL.
pub fn normalize_repository_url(identifier: &str, host: &str) -> String {
    if identifier.starts_with("https://") {
        return identifier.to_string();
    }

    let (scheme, host_name) = match host.split_once("://") {
        Some((scheme, rest)) => (scheme, rest.trim_end_matches('/')),
        None => ("https", host.trim_end_matches('/')),
    };
    if !host_name.is_empty() && identifier.starts_with(host_name) {
        return format!("{}://{}", scheme, identifier);
    }

    if Url::parse(identifier).is_ok() {
        debug!(identifier, "identifier is an absolute url");
        return identifier.to_string();
    }

    format!(
        "{}/{}",
        host.trim_end_matches('/'),
        identifier.trim_start_matches('/')
    )
}

/// A release tag and the version derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseTag {
    /// Tag name as found in git (e.g. `v1.2.3`)
    pub name: String,
    /// Tag name without its first character (e.g. `1.2.3`)
    pub version: String,
}

impl ReleaseTag {
    /// Derive the version by dropping the tag's first character.
    ///
    /// The dropped character is expected to be `v` but is not checked.
    pub fn from_tag(name: impl Into<String>) -> Self {
        let name = name.into();
        let version = name.chars().skip(1).collect();
        Self { name, version }
    }
}

/// Public download URL of a release asset:
/// `{repo_url}/releases/download/{tag}/{artifact file name}`
pub fn download_url(repo_url: &str, tag: &str, artifact: &Path) -> String {
    let file_name = artifact
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    format!(
        "{}/releases/download/{}/{}",
        repo_url.trim_end_matches('/'),
        tag,
        file_name
    )
}

/// Everything a finished (or packaged) release produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSummary {
    pub repository_url: String,
    pub tag: String,
    pub version: String,
    pub framework: String,
    pub target_abi: String,
    pub artifact: PathBuf,
    pub download_url: String,
    pub manifest: PathBuf,
    /// Whether the artifact was added to the manifest
    pub registered: bool,
}
