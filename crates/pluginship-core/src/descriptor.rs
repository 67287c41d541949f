//! .NET project descriptor (.csproj) introspection
//!
//! The descriptor is searched with regular expressions, not parsed as XML.
//! Like the rest of the tooling around JPRM this only understands the common
//! single-line layout: a `PackageReference` whose `Include` and `Version`
//! attributes sit on different lines is not recognised.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::{debug, info, instrument};

use crate::error::DescriptorError;

/// Default project descriptor file name
pub const DEFAULT_DESCRIPTOR: &str = "Shizou.JellyfinPlugin.csproj";

/// Default package whose version determines the target ABI
pub const DEFAULT_ABI_PACKAGE: &str = "Jellyfin.Controller";

type Result<T> = std::result::Result<T, DescriptorError>;

/// `<TargetFramework>` or `<TargetFrameworks>`, capturing the contents
static FRAMEWORK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    case_insensitive(r"<TargetFrameworks?>(.*?)</TargetFrameworks?>").expect("Invalid regex")
});

/// Last `Version="..."` of a self-closing package reference on one line
static PACKAGE_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    case_insensitive(r#"<PackageReference .*Version="(.*?)".*?/>"#).expect("Invalid regex")
});

/// Values pulled out of a project descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    /// File the values were read from
    pub path: PathBuf,
    /// First entry of `TargetFramework(s)`, e.g. `net8.0`
    pub framework: String,
    /// Version attribute of the ABI package reference, e.g. `10.8.0`
    pub abi_package_version: String,
    /// `abi_package_version` with `.0` appended, e.g. `10.8.0.0`
    pub target_abi: String,
}

impl ProjectDescriptor {
    /// Read and introspect a descriptor file
    #[instrument(fields(path = %path.display()))]
    pub fn load(path: &Path, abi_package: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                DescriptorError::NotFound(path.to_path_buf())
            } else {
                DescriptorError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::parse(&content, abi_package, path)
    }

    /// Introspect descriptor text; `path` is only used in errors
    pub fn parse(content: &str, abi_package: &str, path: &Path) -> Result<Self> {
        let framework = extract_framework(content)
            .ok_or_else(|| DescriptorError::FrameworkMissing(path.to_path_buf()))?;

        let abi_package_version = extract_package_version(content, abi_package).ok_or_else(|| {
            DescriptorError::AbiReferenceMissing {
                package: abi_package.to_string(),
                path: path.to_path_buf(),
            }
        })?;
        let target_abi = format!("{}.0", abi_package_version);

        info!(framework = %framework, target_abi = %target_abi, "read project descriptor");
        Ok(Self {
            path: path.to_path_buf(),
            framework,
            abi_package_version,
            target_abi,
        })
    }
}

/// First framework listed in `<TargetFramework>` or `<TargetFrameworks>`
pub fn extract_framework(content: &str) -> Option<String> {
    let captures = FRAMEWORK_REGEX.captures(content)?;
    let frameworks = captures.get(1)?.as_str();
    frameworks.split(';').next().map(str::to_string)
}

/// Version attribute of the first `PackageReference` including `package`.
///
/// Each line is matched on its own. The reference must carry both
/// `Include="<package>"` and `Version="..."` on that line and be self-closing.
pub fn extract_package_version(content: &str, package: &str) -> Option<String> {
    let include = case_insensitive(&format!(
        r#"<PackageReference .*Include="{}""#,
        regex::escape(package)
    ))
    .ok()?;

    content
        .lines()
        .filter(|line| include.is_match(line))
        .find_map(|line| {
            PACKAGE_VERSION_REGEX
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
        })
}

/// Pick the descriptor to read.
///
/// An explicitly configured path always wins. Otherwise the default name is
/// used when it exists, and failing that the only `*.csproj` in `root`.
pub fn locate_descriptor(root: &Path, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        return Ok(root.join(path));
    }

    let default = root.join(DEFAULT_DESCRIPTOR);
    if default.exists() {
        return Ok(default);
    }

    let pattern = root.join("*.csproj");
    let mut candidates: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .map(|paths| paths.filter_map(|p| p.ok()).collect())
        .unwrap_or_default();
    candidates.sort();
    debug!(count = candidates.len(), "found descriptor candidates");

    match candidates.len() {
        0 => Err(DescriptorError::NotFound(default)),
        1 => Ok(candidates.remove(0)),
        _ => Err(DescriptorError::Ambiguous(candidates)),
    }
}

fn case_insensitive(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CSPROJ: &str = r#"<Project Sdk="Microsoft.NET.Sdk">

  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <Nullable>enable</Nullable>
  </PropertyGroup>

  <ItemGroup>
    <PackageReference Include="Jellyfin.Controller" Version="10.9.11" />
    <PackageReference Include="Jellyfin.Model" Version="10.9.11" />
  </ItemGroup>

</Project>
"#;

    #[test]
    fn test_single_framework() {
        assert_eq!(extract_framework(CSPROJ).as_deref(), Some("net8.0"));
    }

    #[test]
    fn test_plural_framework_takes_first() {
        let content = "<TargetFrameworks>net6.0;net7.0</TargetFrameworks>";
        assert_eq!(extract_framework(content).as_deref(), Some("net6.0"));
    }

    #[test]
    fn test_framework_is_case_insensitive() {
        let content = "<targetframework>net7.0</TARGETFRAMEWORK>";
        assert_eq!(extract_framework(content).as_deref(), Some("net7.0"));
    }

    #[test]
    fn test_missing_framework() {
        assert_eq!(extract_framework("<Project></Project>"), None);
    }

    #[test]
    fn test_package_version() {
        let line = r#"    <PackageReference Include="Jellyfin.Controller" Version="10.8.0" />"#;
        assert_eq!(
            extract_package_version(line, DEFAULT_ABI_PACKAGE).as_deref(),
            Some("10.8.0")
        );
    }

    #[test]
    fn test_package_version_ignores_other_packages() {
        let content = r#"<PackageReference Include="Jellyfin.Model" Version="1.0.0" />
<PackageReference Include="Jellyfin.Controller" Version="10.8.13" />"#;
        assert_eq!(
            extract_package_version(content, DEFAULT_ABI_PACKAGE).as_deref(),
            Some("10.8.13")
        );
    }

    #[test]
    fn test_package_name_is_matched_literally() {
        let content = r#"<PackageReference Include="JellyfinXController" Version="1.0.0" />"#;
        assert_eq!(extract_package_version(content, DEFAULT_ABI_PACKAGE), None);
    }

    #[test]
    fn test_version_before_include_on_same_line() {
        let content = r#"<PackageReference Version="10.9.0" Include="Jellyfin.Controller" />"#;
        assert_eq!(
            extract_package_version(content, DEFAULT_ABI_PACKAGE).as_deref(),
            Some("10.9.0")
        );
    }

    #[test]
    fn test_split_attributes_do_not_match() {
        let content = r#"<PackageReference Include="Jellyfin.Controller"
                  Version="10.8.0" />"#;
        assert_eq!(extract_package_version(content, DEFAULT_ABI_PACKAGE), None);
    }

    #[test]
    fn test_parse_appends_zero_to_abi() {
        let descriptor =
            ProjectDescriptor::parse(CSPROJ, DEFAULT_ABI_PACKAGE, Path::new("x.csproj")).unwrap();
        assert_eq!(descriptor.framework, "net8.0");
        assert_eq!(descriptor.abi_package_version, "10.9.11");
        assert_eq!(descriptor.target_abi, "10.9.11.0");
    }

    #[test]
    fn test_parse_errors() {
        let err = ProjectDescriptor::parse("<Project/>", DEFAULT_ABI_PACKAGE, Path::new("a.csproj"))
            .unwrap_err();
        assert!(matches!(err, DescriptorError::FrameworkMissing(_)));

        let err = ProjectDescriptor::parse(
            "<TargetFramework>net8.0</TargetFramework>",
            DEFAULT_ABI_PACKAGE,
            Path::new("a.csproj"),
        )
        .unwrap_err();
        assert!(matches!(err, DescriptorError::AbiReferenceMissing { .. }));
        assert!(err.to_string().contains("Jellyfin.Controller"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = ProjectDescriptor::load(&temp.path().join("nope.csproj"), DEFAULT_ABI_PACKAGE)
            .unwrap_err();
        assert!(matches!(err, DescriptorError::NotFound(_)));
    }

    #[test]
    fn test_locate_prefers_default_name() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(DEFAULT_DESCRIPTOR), CSPROJ).unwrap();
        std::fs::write(temp.path().join("Other.csproj"), CSPROJ).unwrap();

        let found = locate_descriptor(temp.path(), None).unwrap();
        assert_eq!(found, temp.path().join(DEFAULT_DESCRIPTOR));
    }

    #[test]
    fn test_locate_single_csproj() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("My.Plugin.csproj"), CSPROJ).unwrap();

        let found = locate_descriptor(temp.path(), None).unwrap();
        assert_eq!(found, temp.path().join("My.Plugin.csproj"));
    }

    #[test]
    fn test_locate_ambiguous_and_missing() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            locate_descriptor(temp.path(), None),
            Err(DescriptorError::NotFound(_))
        ));

        std::fs::write(temp.path().join("A.csproj"), CSPROJ).unwrap();
        std::fs::write(temp.path().join("B.csproj"), CSPROJ).unwrap();
        assert!(matches!(
            locate_descriptor(temp.path(), None),
            Err(DescriptorError::Ambiguous(list)) if list.len() == 2
        ));
    }

    #[test]
    fn test_locate_configured_path_wins() {
        let temp = TempDir::new().unwrap();
        let found = locate_descriptor(temp.path(), Some(Path::new("src/P.csproj"))).unwrap();
        assert_eq!(found, temp.path().join("src/P.csproj"));
    }
}
