use std::cell::RefCell;
use std::collections::HashSet;

use super::{command_line, CommandOutput, CommandRunner};
use crate::error::{ReleaseError, Result};

/// Mock runner for testing without spawning processes
///
/// Every command succeeds with empty output unless a failure rule matches
/// its command line. All invocations are recorded in order.
#[derive(Debug, Default)]
pub struct MockRunner {
    failures: Vec<(String, CommandOutput)>,
    unavailable: HashSet<String>,
    calls: RefCell<Vec<String>>,
}

impl MockRunner {
    /// Create a runner where every program exists and every command succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any command whose command line contains `pattern`
    pub fn fail_when(mut self, pattern: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.failures
            .push((pattern.into(), CommandOutput::failed(1, stderr)));
        self
    }

    /// Report `program` as missing from PATH; running it fails to start
    pub fn without_program(mut self, program: impl Into<String>) -> Self {
        self.unavailable.insert(program.into());
        self
    }

    /// Command lines run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Whether any recorded command line contains `pattern`
    pub fn ran(&self, pattern: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.contains(pattern))
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let line = command_line(program, args);
        self.calls.borrow_mut().push(line.clone());

        if self.unavailable.contains(program) {
            return Err(ReleaseError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("failed to start `{}`: not found", program),
            )));
        }

        let output = self
            .failures
            .iter()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput::ok(""));

        Ok(output)
    }

    fn is_available(&self, program: &str) -> bool {
        !self.unavailable.contains(program)
    }
}
