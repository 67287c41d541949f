//! End-to-end tests for the pluginship binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CSPROJ: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Jellyfin.Controller" Version="10.9.11" />
  </ItemGroup>
</Project>
"#;

const METADATA: &str = "name: Demo\nguid: 1234\nversion: 1.0.0.0\n";

fn pluginship(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pluginship").unwrap();
    cmd.env("HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_requires_repository_and_notes() {
    let home = TempDir::new().unwrap();
    pluginship(&home)
        .arg("owner/repo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("RELEASE_NOTES"));
}

#[test]
fn test_help_lists_arguments() {
    let home = TempDir::new().unwrap();
    pluginship(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<REPOSITORY>"))
        .stdout(predicate::str::contains("<RELEASE_NOTES>"))
        .stdout(predicate::str::contains("--skip-manifest"));
}

#[test]
fn test_invalid_config_exits_with_config_error() {
    let home = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    std::fs::write(
        project.path().join("pluginship.toml"),
        "[build]\nmax_cpu_count = 0\n",
    )
    .unwrap();

    pluginship(&home)
        .arg("-C")
        .arg(project.path())
        .args(["owner/repo", "notes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("max_cpu_count"));
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn project_with_tools(git: &str, jprm: &str) -> TempDir {
        let project = TempDir::new().unwrap();
        std::fs::write(project.path().join("Demo.csproj"), CSPROJ).unwrap();
        std::fs::write(project.path().join("jprm.yaml"), METADATA).unwrap();

        let bin = project.path().join("bin");
        std::fs::create_dir(&bin).unwrap();
        let git = write_script(&bin, "git", git);
        let jprm = write_script(&bin, "jprm", jprm);

        std::fs::write(
            project.path().join("pluginship.toml"),
            format!(
                "[tools]\ngit = \"{}\"\njprm = \"{}\"\n",
                git.display(),
                jprm.display()
            ),
        )
        .unwrap();
        project
    }

    #[test]
    fn test_git_failure_exits_with_git_error() {
        let home = TempDir::new().unwrap();
        let project = project_with_tools("echo 'fatal: no names found' >&2\nexit 128\n", "exit 0\n");

        pluginship(&home)
            .arg("-C")
            .arg(project.path())
            .args(["owner/repo", "notes"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Git describe returned error code: 128"))
            .stderr(predicate::str::contains("no names found"));
    }

    #[test]
    fn test_build_failure_restores_metadata() {
        let home = TempDir::new().unwrap();
        let project = project_with_tools("echo v1.2.3\n", "exit 5\n");

        pluginship(&home)
            .arg("-C")
            .arg(project.path())
            .args(["owner/repo", "notes"])
            .assert()
            .code(6)
            .stderr(predicate::str::contains("Jprm build returned error code: 5"));

        let metadata = std::fs::read_to_string(project.path().join("jprm.yaml")).unwrap();
        assert!(!metadata.contains("targetAbi"));
        assert!(!metadata.contains("changelog"));
    }

    #[test]
    fn test_full_release() {
        let home = TempDir::new().unwrap();
        let jprm = r#"case "$3" in
  plugin)
    grep -q '10.9.11.0' jprm.yaml || exit 9
    echo "$PWD/artifacts/demo_1.2.3.0.zip"
    ;;
  repo)
    echo "$@" > repo-add.log
    ;;
esac
"#;
        let project = project_with_tools("echo v1.2.3\n", jprm);

        pluginship(&home)
            .arg("-C")
            .arg(project.path())
            .args(["github.com/owner/repo", "- First release"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Package path: "))
            .stdout(predicate::str::contains(
                "Package url: https://github.com/owner/repo/releases/download/v1.2.3/demo_1.2.3.0.zip",
            ));

        let metadata = std::fs::read_to_string(project.path().join("jprm.yaml")).unwrap();
        assert!(metadata.starts_with("name: Demo\n"));
        assert!(!metadata.contains("targetAbi"));
        assert!(!metadata.contains("changelog"));

        let repo_add = std::fs::read_to_string(project.path().join("repo-add.log")).unwrap();
        assert!(repo_add.contains("repo add -U https://github.com/owner/repo/releases/download/v1.2.3/demo_1.2.3.0.zip Repository/manifest.json"));
    }

    #[test]
    fn test_json_output_without_manifest() {
        let home = TempDir::new().unwrap();
        let project = project_with_tools(
            "echo v2.0.0\n",
            "[ \"$3\" = plugin ] && echo \"$PWD/artifacts/demo.zip\"\n[ \"$3\" = repo ] && exit 1\nexit 0\n",
        );

        let output = pluginship(&home)
            .arg("-C")
            .arg(project.path())
            .args(["--format", "json", "--skip-manifest", "owner/repo", "notes"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(summary["tag"], "v2.0.0");
        assert_eq!(summary["version"], "2.0.0");
        assert_eq!(summary["target_abi"], "10.9.11.0");
        assert_eq!(summary["registered"], false);
        assert_eq!(
            summary["download_url"],
            "https://github.com/owner/repo/releases/download/v2.0.0/demo.zip"
        );
    }
}
