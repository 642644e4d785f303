use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use super::{command_line, CommandOutput, CommandRunner};
use crate::error::{ReleaseError, Result};

/// Runs programs as child processes in a fixed working directory.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    workdir: PathBuf,
}

impl SystemRunner {
    pub fn new<P: AsRef<Path>>(workdir: P) -> Self {
        SystemRunner {
            workdir: workdir.as_ref().to_path_buf(),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        debug!(
            "running `{}` in {}",
            command_line(program, args),
            self.workdir.display()
        );

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| {
                ReleaseError::Io(std::io::Error::new(
                    e.kind(),
                    format!("failed to start `{}`: {}", program, e),
                ))
            })?;

        debug!("`{}` exited with {}", program, output.status);

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_unavailable() {
        let runner = SystemRunner::new(".");
        assert!(!runner.is_available("definitely-not-a-real-program-4921"));
    }

    #[test]
    fn test_missing_program_fails_to_start() {
        let runner = SystemRunner::new(".");
        let err = runner
            .run("definitely-not-a-real-program-4921", &[])
            .unwrap_err();
        assert!(err.to_string().contains("failed to start"));
    }

    #[test]
    fn test_captures_exit_status() {
        let runner = SystemRunner::new(".");
        let output = runner
            .run(env!("CARGO"), &["--definitely-not-a-flag".to_string()])
            .unwrap();
        assert!(!output.success);
        assert!(!output.diagnostic().is_empty());
    }
}
