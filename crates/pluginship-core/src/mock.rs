//! Scripted tool runner for deterministic testing
//!
//! [`ScriptedRunner`] implements [`ToolRunner`] without spawning anything.
//! Responses are matched against the rendered command line, and every
//! invocation is recorded so tests can assert on what would have run.
//!
//! ```
//! use pluginship_core::mock::ScriptedRunner;
//! use pluginship_core::{Invocation, ToolRunner};
//!
//! let runner = ScriptedRunner::new().respond("git describe", 0, "v1.2.3\n");
//! let out = runner.run(&Invocation::new("git").arg("describe")).unwrap();
//! assert_eq!(out.stdout, "v1.2.3\n");
//! assert_eq!(runner.invocations().len(), 1);
//! ```

use std::sync::Mutex;

use crate::error::ToolError;
use crate::process::{ExitCode, Invocation, ToolOutput, ToolRunner};

type Observer = Box<dyn Fn(&Invocation) + Send>;

/// A canned response for invocations containing `pattern`
#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    output: ToolOutput,
}

/// Tool runner that replays scripted outputs
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    observers: Vec<Observer>,
    invocations: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer invocations whose command line contains `pattern`
    pub fn respond(self, pattern: impl Into<String>, code: i32, stdout: impl Into<String>) -> Self {
        self.respond_with(
            pattern,
            ToolOutput {
                exit_code: ExitCode::Code(code),
                stdout: stdout.into(),
                stderr: String::new(),
            },
        )
    }

    /// Answer matching invocations with a complete output
    pub fn respond_with(mut self, pattern: impl Into<String>, output: ToolOutput) -> Self {
        self.rules.push(Rule {
            pattern: pattern.into(),
            output,
        });
        self
    }

    /// Call `observer` with every invocation before answering it
    pub fn observe(mut self, observer: impl Fn(&Invocation) + Send + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Every invocation so far, in order
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Whether any invocation's command line contains `pattern`
    pub fn ran(&self, pattern: &str) -> bool {
        self.invocations()
            .iter()
            .any(|inv| inv.to_string().contains(pattern))
    }
}

impl ToolRunner for ScriptedRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        if let Ok(mut log) = self.invocations.lock() {
            log.push(invocation.clone());
        }
        for observer in &self.observers {
            observer(invocation);
        }

        let command = invocation.to_string();
        self.rules
            .iter()
            .find(|rule| command.contains(&rule.pattern))
            .map(|rule| rule.output.clone())
            .ok_or_else(|| ToolError::NotFound {
                tool: invocation.program.clone(),
                install_hint: format!("No scripted response for `{}`", command),
            })
    }
}
