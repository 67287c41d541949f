//! CLI definition and command handling

pub mod output;

use std::path::PathBuf;

use clap::Parser;
use console::style;
use tracing::info;

use pluginship_core::config::{load_config, load_config_or_default};
use pluginship_core::SystemRunner;

use crate::workflow::{ReleaseOptions, ReleaseWorkflow};

/// pluginship - package a JPRM plugin release and register it in a repository manifest
#[derive(Debug, Parser)]
#[command(name = "pluginship")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository the release is hosted on (URL, github.com/owner/repo, or owner/repo)
    #[arg(value_name = "REPOSITORY", allow_hyphen_values = true)]
    pub repository: String,

    /// Release notes to include in the metadata changelog (may start with `-`)
    #[arg(value_name = "RELEASE_NOTES", allow_hyphen_values = true)]
    pub release_notes: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long)]
    pub directory: Option<PathBuf>,

    /// Configuration file (searched for when omitted)
    #[arg(long, env = "PLUGINSHIP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Build and print the download URL without adding it to the manifest
    #[arg(long)]
    pub skip_manifest: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

impl Cli {
    /// Execute the release
    pub fn execute(self) -> anyhow::Result<()> {
        info!(
            repository = %self.repository,
            format = ?self.format,
            skip_manifest = self.skip_manifest,
            "executing release"
        );

        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }
        let cwd = std::env::current_dir()?;

        let config = match &self.config {
            Some(path) => load_config(path)?,
            None => {
                let (config, path) = load_config_or_default(&cwd)?;
                if let Some(path) = path {
                    info!(path = %path.display(), "using config");
                }
                config
            }
        };

        let runner = SystemRunner::new().with_working_dir(&cwd);
        let workflow = ReleaseWorkflow::new(&config, &runner, &cwd);
        let options = ReleaseOptions {
            repository: self.repository.clone(),
            release_notes: self.release_notes.clone(),
        };

        let mut summary = workflow.package(&options)?;

        if self.format == OutputFormat::Text && !self.quiet {
            println!(
                "{}",
                output::key_value(
                    "Package path",
                    &output::path_style()
                        .apply_to(summary.artifact.display())
                        .to_string()
                )
            );
            println!("{}", output::key_value("Package url", &summary.download_url));
        }

        if self.skip_manifest {
            if self.format == OutputFormat::Text && !self.quiet {
                output::info("Skipping manifest registration");
            }
        } else {
            workflow.register(&mut summary)?;
        }

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            OutputFormat::Text => {
                if !self.quiet && summary.registered {
                    output::success(&format!(
                        "Released {} to {}",
                        output::tag_style().apply_to(&summary.tag),
                        style(summary.manifest.display()).cyan()
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from(["pluginship", "owner/repo", "Some notes"]).unwrap();
        assert_eq!(cli.repository, "owner/repo");
        assert_eq!(cli.release_notes, "Some notes");
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.skip_manifest);
    }

    #[test]
    fn test_release_notes_are_required() {
        assert!(Cli::try_parse_from(["pluginship", "owner/repo"]).is_err());
    }

    #[test]
    fn test_options() {
        let cli = Cli::try_parse_from([
            "pluginship",
            "-C",
            "plugin",
            "--format",
            "json",
            "--skip-manifest",
            "github.com/o/r",
            "- notes",
        ])
        .unwrap();
        assert_eq!(cli.directory, Some(PathBuf::from("plugin")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.skip_manifest);
        assert_eq!(cli.release_notes, "- notes");
    }

    #[test]
    fn test_bulleted_release_notes() {
        let cli = Cli::try_parse_from([
            "pluginship",
            "-v",
            "owner/repo",
            "- First release\n- Fix crash on startup",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.repository, "owner/repo");
        assert_eq!(cli.release_notes, "- First release\n- Fix crash on startup");
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["pluginship", "-v", "-q", "o/r", "n"]).is_err());
    }
}
