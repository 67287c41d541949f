//! JPRM plugin metadata (`jprm.yaml`)
//!
//! The metadata file is checked in without the fields that only make sense for
//! a specific build (the target ABI and the changelog). [`MetadataPatch`]
//! injects them for the duration of a build and takes them out again on every
//! exit path, so a failed build never leaves a modified file behind.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::{debug, info, instrument, warn};

use crate::error::MetadataError;

/// Default metadata file name
pub const DEFAULT_METADATA_FILE: &str = "jprm.yaml";

/// Default key holding the target ABI
pub const DEFAULT_ABI_KEY: &str = "targetAbi";

/// Default key holding the release notes
pub const DEFAULT_CHANGELOG_KEY: &str = "changelog";

type Result<T> = std::result::Result<T, MetadataError>;

/// An ordered YAML mapping bound to the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataDocument {
    path: PathBuf,
    mapping: Mapping,
}

impl MetadataDocument {
    /// Load and parse a metadata file
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse metadata text; the document must be a non-empty mapping
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content).map_err(|source| MetadataError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        let mapping = match value {
            Value::Null => return Err(MetadataError::Empty(path.to_path_buf())),
            Value::Mapping(mapping) if mapping.is_empty() => {
                return Err(MetadataError::Empty(path.to_path_buf()))
            }
            Value::Mapping(mapping) => mapping,
            _ => return Err(MetadataError::NotAMapping(path.to_path_buf())),
        };

        debug!(keys = mapping.len(), "parsed metadata");
        Ok(Self {
            path: path.to_path_buf(),
            mapping,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// Top-level string keys, in document order
    pub fn keys(&self) -> Vec<String> {
        self.mapping
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.mapping.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.mapping.contains_key(key)
    }

    /// Set a key, returning the previous value.
    ///
    /// An existing key keeps its position; a new key is appended.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.mapping.insert(Value::String(key.to_string()), value.into())
    }

    /// Remove a key without disturbing the order of the others
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.mapping.shift_remove(key)
    }

    /// Serialize the document
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(&self.mapping).map_err(|source| MetadataError::Yaml {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the document back to its file
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn save(&self) -> Result<()> {
        let content = self.to_yaml_string()?;
        std::fs::write(&self.path, content).map_err(|source| MetadataError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!("saved metadata");
        Ok(())
    }
}

/// Build-time fields added to the metadata document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EphemeralFields {
    pub abi_key: String,
    pub target_abi: String,
    pub changelog_key: String,
    /// Release notes, stored as-is
    pub changelog: String,
}

impl EphemeralFields {
    /// Fields under the default JPRM key names
    pub fn new(target_abi: impl Into<String>, changelog: impl Into<String>) -> Self {
        Self {
            abi_key: DEFAULT_ABI_KEY.to_string(),
            target_abi: target_abi.into(),
            changelog_key: DEFAULT_CHANGELOG_KEY.to_string(),
            changelog: changelog.into(),
        }
    }

    /// Use different key names
    pub fn with_keys(mut self, abi_key: impl Into<String>, changelog_key: impl Into<String>) -> Self {
        self.abi_key = abi_key.into();
        self.changelog_key = changelog_key.into();
        self
    }

    fn entries(&self) -> [(&str, &str); 2] {
        [
            (self.abi_key.as_str(), self.target_abi.as_str()),
            (self.changelog_key.as_str(), self.changelog.as_str()),
        ]
    }
}

/// Guard over a metadata file carrying ephemeral fields.
///
/// Created by [`MetadataPatch::apply`], which writes the fields to disk.
/// [`MetadataPatch::restore`] takes them out again and reports errors; if the
/// guard is dropped first (an early return or a panic during the build) the
/// same restoration runs from `Drop` and failures are only logged.
#[derive(Debug)]
pub struct MetadataPatch {
    document: MetadataDocument,
    /// Keys set by the patch and what they held before, in insertion order
    touched: Vec<(String, Option<Value>)>,
    restored: bool,
}

impl MetadataPatch {
    /// Load `path`, set the ephemeral fields and save
    #[instrument(skip(fields), fields(path = %path.display()))]
    pub fn apply(path: &Path, fields: &EphemeralFields) -> Result<Self> {
        let document = MetadataDocument::load(path)?;
        let mut patch = Self {
            document,
            touched: Vec::new(),
            restored: false,
        };

        for (key, value) in fields.entries() {
            let previous = patch.document.set(key, value);
            if previous.is_some() {
                warn!(key, "metadata already defines key, it will be restored after the build");
            }
            patch.touched.push((key.to_string(), previous));
        }

        patch.document.save()?;
        info!(keys = ?patch.touched.iter().map(|(k, _)| k).collect::<Vec<_>>(), "patched metadata");
        Ok(patch)
    }

    /// The patched document
    pub fn document(&self) -> &MetadataDocument {
        &self.document
    }

    /// Remove the ephemeral fields and rewrite the file
    pub fn restore(mut self) -> Result<()> {
        self.restore_in_place()
    }

    fn restore_in_place(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        for (key, previous) in self.touched.drain(..).rev() {
            match previous {
                Some(value) => {
                    self.document.set(&key, value);
                }
                None => {
                    self.document.remove(&key);
                }
            }
        }

        self.document.save()?;
        info!(path = %self.document.path.display(), "restored metadata");
        Ok(())
    }
}

impl Drop for MetadataPatch {
    fn drop(&mut self) {
        if let Err(e) = self.restore_in_place() {
            warn!(
                path = %self.document.path.display(),
                error = %e,
                "failed to restore metadata"
            );
        }
    }
}
