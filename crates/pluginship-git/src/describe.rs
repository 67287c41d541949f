//! Tag discovery via `git describe`

use tracing::{debug, info, instrument};

use pluginship_core::error::GitError;
use pluginship_core::{Capture, Invocation, ReleaseTag, ToolRunner};

/// Result type for git operations
pub type Result<T> = std::result::Result<T, GitError>;

const INSTALL_HINT: &str = "Install git from https://git-scm.com/downloads.";

/// Git command line driven through a [`ToolRunner`]
pub struct GitCli<'a> {
    runner: &'a dyn ToolRunner,
    program: String,
}

impl<'a> GitCli<'a> {
    pub fn new(runner: &'a dyn ToolRunner) -> Self {
        Self::with_program(runner, "git")
    }

    /// Use a specific git executable
    pub fn with_program(runner: &'a dyn ToolRunner, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    /// The invocation used to find the most recent matching tag
    pub fn describe_invocation(&self, pattern: &str) -> Invocation {
        Invocation::new(&self.program)
            .arg("describe")
            .arg(format!("--match={}", pattern))
            .args(["--tags", "--abbrev=0"])
            .capture(Capture::All)
            .with_install_hint(INSTALL_HINT)
    }

    /// Most recent tag reachable from HEAD that matches `pattern`.
    ///
    /// `--abbrev=0` makes git print the bare tag name without the
    /// `-<distance>-g<hash>` suffix.
    #[instrument(skip(self))]
    pub fn describe_tag(&self, pattern: &str) -> Result<String> {
        let output = self.runner.run(&self.describe_invocation(pattern))?;

        if !output.success() {
            return Err(GitError::DescribeFailed {
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let tag = output.stdout.trim();
        if tag.is_empty() {
            return Err(GitError::NoTags(pattern.to_string()));
        }

        debug!(tag, "described tag");
        Ok(tag.to_string())
    }

    /// Latest release tag and the version derived from it
    pub fn latest_release_tag(&self, pattern: &str) -> Result<ReleaseTag> {
        let tag = ReleaseTag::from_tag(self.describe_tag(pattern)?);
        info!(tag = %tag.name, version = %tag.version, "discovered release tag");
        Ok(tag)
    }
}
