//! `jprm plugin build` and `jprm repo add`

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use pluginship_core::error::ToolError;
use pluginship_core::{Capture, Invocation, ToolRunner};

const INSTALL_HINT: &str = "Install it with `pip install jprm`.";

/// Inputs to `jprm plugin build`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest<'r> {
    /// Value for `--dotnet-framework`
    pub framework: &'r str,
    /// Value for `--max-cpu-count`
    pub max_cpu_count: usize,
    /// Value for `--version`
    pub version: &'r str,
    /// Value for `--output`
    pub output_dir: &'r Path,
}

/// JPRM command line driven through a [`ToolRunner`]
pub struct Jprm<'a> {
    runner: &'a dyn ToolRunner,
    program: String,
    verbosity: String,
}

impl<'a> Jprm<'a> {
    pub fn new(runner: &'a dyn ToolRunner) -> Self {
        Self {
            runner,
            program: "jprm".to_string(),
            verbosity: "debug".to_string(),
        }
    }

    /// Use a specific jprm executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the value passed to `-v`
    pub fn with_verbosity(mut self, verbosity: impl Into<String>) -> Self {
        self.verbosity = verbosity.into();
        self
    }

    fn base(&self) -> Invocation {
        Invocation::new(&self.program)
            .args(["-v", self.verbosity.as_str()])
            .with_install_hint(INSTALL_HINT)
    }

    /// Invocation for `jprm plugin build`; only stdout is captured
    pub fn build_invocation(&self, request: &BuildRequest<'_>) -> Invocation {
        self.base()
            .args(["plugin", "build"])
            .args(["--dotnet-framework", request.framework])
            .arg("--max-cpu-count")
            .arg(request.max_cpu_count.to_string())
            .args(["--version", request.version])
            .arg("--output")
            .arg(request.output_dir.to_string_lossy())
            .capture(Capture::Stdout)
    }

    /// Build the plugin and return the path of the zip archive.
    ///
    /// jprm prints the archive path on stdout; the trimmed output is taken
    /// as-is.
    #[instrument(skip(self), fields(framework = request.framework, version = request.version))]
    pub fn plugin_build(&self, request: &BuildRequest<'_>) -> Result<PathBuf, ToolError> {
        let invocation = self.build_invocation(request);
        let output = self.runner.run(&invocation)?;

        if !output.success() {
            return Err(ToolError::ExitStatus {
                command: "Jprm build".to_string(),
                code: output.exit_code,
                stderr: output.stderr,
            });
        }

        let artifact = output.stdout.trim();
        if artifact.is_empty() {
            return Err(ToolError::EmptyOutput {
                command: "Jprm build".to_string(),
            });
        }

        info!(artifact, "built plugin archive");
        Ok(PathBuf::from(artifact))
    }

    /// Invocation for `jprm repo add`; output goes straight to the terminal
    pub fn repo_add_invocation(&self, url: &str, manifest: &Path, artifact: &Path) -> Invocation {
        self.base()
            .args(["repo", "add", "-U", url])
            .arg(manifest.to_string_lossy())
            .arg(artifact.to_string_lossy())
            .capture(Capture::Nothing)
    }

    /// Add the archive to the repository manifest under the given download URL
    #[instrument(skip(self), fields(manifest = %manifest.display(), artifact = %artifact.display()))]
    pub fn repo_add(&self, url: &str, manifest: &Path, artifact: &Path) -> Result<(), ToolError> {
        let output = self
            .runner
            .run(&self.repo_add_invocation(url, manifest, artifact))?;

        if !output.success() {
            return Err(ToolError::ExitStatus {
                command: "Jprm repo add".to_string(),
                code: output.exit_code,
                stderr: output.stderr,
            });
        }

        info!(url, "registered artifact in manifest");
        Ok(())
    }
}
