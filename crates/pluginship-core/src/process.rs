//! Subprocess execution
//!
//! Every external program pluginship drives (git, jprm) goes through the
//! [`ToolRunner`] trait. [`SystemRunner`] spawns real processes; tests swap in
//! a scripted runner so the release workflow can be exercised without any
//! tooling installed.

use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, info, instrument};

use crate::error::ToolError;

/// Exit status of a finished program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Regular exit with a status code
    Code(i32),
    /// Killed before it could report a code (e.g. by a signal)
    Terminated,
}

impl ExitCode {
    pub fn success(&self) -> bool {
        matches!(self, Self::Code(0))
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{}", code),
            Self::Terminated => write!(f, "terminated by signal"),
        }
    }
}

impl From<std::process::ExitStatus> for ExitCode {
    fn from(status: std::process::ExitStatus) -> Self {
        status.code().map(Self::Code).unwrap_or(Self::Terminated)
    }
}

/// Which output streams are captured instead of inherited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capture {
    /// Capture stdout and stderr
    #[default]
    All,
    /// Capture stdout, stderr goes to the terminal
    Stdout,
    /// Both streams go to the terminal
    Nothing,
}

/// A single program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name or path
    pub program: String,
    /// Arguments, in order
    pub args: Vec<String>,
    /// Stream capture mode
    pub capture: Capture,
    /// Shown when the program is missing
    pub install_hint: Option<String>,
}

impl Invocation {
    /// Create an invocation with no arguments that captures everything
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            capture: Capture::All,
            install_hint: None,
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the capture mode
    pub fn capture(mut self, capture: Capture) -> Self {
        self.capture = capture;
        self
    }

    /// Set the hint printed when the program cannot be found
    pub fn with_install_hint(mut self, hint: impl Into<String>) -> Self {
        self.install_hint = Some(hint.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of a finished program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: ExitCode,
    /// Captured stdout (empty when not captured)
    pub stdout: String,
    /// Captured stderr (empty when not captured)
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code.success()
    }
}

/// Runs external programs to completion
///
/// Implementations only fail when the program could not be run at all; a
/// non-zero exit is reported through [`ToolOutput::exit_code`] and left to the
/// caller to interpret.
pub trait ToolRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError>;
}

/// Runs programs as child processes of this one
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    working_dir: Option<PathBuf>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every program from the given directory
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

impl ToolRunner for SystemRunner {
    #[instrument(skip(self, invocation), fields(command = %invocation))]
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        let start = std::time::Instant::now();

        let program = which::which(&invocation.program).map_err(|_| ToolError::NotFound {
            tool: invocation.program.clone(),
            install_hint: invocation
                .install_hint
                .clone()
                .unwrap_or_else(|| "Make sure it is installed and on PATH.".to_string()),
        })?;
        debug!(program = %program.display(), "resolved program");

        let mut cmd = Command::new(&program);
        cmd.args(&invocation.args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let (stdout, stderr) = match invocation.capture {
            Capture::All => (Stdio::piped(), Stdio::piped()),
            Capture::Stdout => (Stdio::piped(), Stdio::inherit()),
            Capture::Nothing => (Stdio::inherit(), Stdio::inherit()),
        };
        cmd.stdout(stdout).stderr(stderr);

        let output = cmd.output().map_err(|e| ToolError::SpawnFailed {
            command: invocation.to_string(),
            message: e.to_string(),
        })?;

        let result = ToolOutput {
            exit_code: output.status.into(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        info!(
            exit_code = %result.exit_code,
            duration_ms = start.elapsed().as_millis(),
            "tool finished"
        );
        Ok(result)
    }
}
