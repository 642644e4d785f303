//! External program execution
//!
//! Every cargo invocation made by the pipeline (quality gates, the bump tool,
//! registry publishing) goes through the [CommandRunner] trait so that it can
//! be replaced with [mock::MockRunner] in tests.

pub mod mock;
pub mod system;

pub use mock::MockRunner;
pub use system::SystemRunner;

use crate::error::Result;

/// Maximum number of trailing output lines kept in a diagnostic.
const DIAGNOSTIC_LINES: usize = 20;

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        CommandOutput {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        CommandOutput {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Text shown to the operator when the command failed.
    ///
    /// The tail of stderr, or of stdout when stderr is empty, or the exit
    /// status when both are empty.
    pub fn diagnostic(&self) -> String {
        let source = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };

        let lines: Vec<&str> = source.trim_end().lines().collect();
        if lines.is_empty() {
            return match self.code {
                Some(code) => format!("exited with status {}", code),
                None => "terminated by signal".to_string(),
            };
        }

        let start = lines.len().saturating_sub(DIAGNOSTIC_LINES);
        lines[start..].join("\n")
    }
}

/// Runs external programs and reports their outcome.
///
/// `run` returns `Err` only when the program could not be started at all;
/// a program that ran and failed is an `Ok` with `success == false`.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;

    /// Whether `program` can be found on PATH.
    fn is_available(&self, program: &str) -> bool;
}

/// Render a command line for logs and messages.
pub fn command_line(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
