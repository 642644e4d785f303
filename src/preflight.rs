//! Checks that the repository is in a releasable state.

use log::debug;

use crate::config::Config;
use crate::domain::ReleaseContext;
use crate::error::{PreflightError, Result};
use crate::publisher::Registry;
use crate::toolchain::CommandRunner;

/// Validates branch, working tree and toolchain before anything else runs.
pub struct PreflightValidator<'a> {
    config: &'a Config,
    runner: &'a dyn CommandRunner,
    registry: &'a dyn Registry,
}

impl<'a> PreflightValidator<'a> {
    pub fn new(
        config: &'a Config,
        runner: &'a dyn CommandRunner,
        registry: &'a dyn Registry,
    ) -> Self {
        PreflightValidator {
            config,
            runner,
            registry,
        }
    }

    /// Run every check in order, stopping at the first failure.
    pub fn run(&self, ctx: &ReleaseContext) -> Result<()> {
        self.check_branch(ctx)?;
        self.check_clean_working_tree(ctx)?;
        self.check_tool_availability()?;
        Ok(())
    }

    pub fn check_branch(&self, ctx: &ReleaseContext) -> Result<()> {
        if ctx.branch != self.config.release_branch {
            return Err(PreflightError::WrongBranch {
                expected: self.config.release_branch.clone(),
                actual: ctx.branch.clone(),
            }
            .into());
        }
        debug!("on release branch {}", ctx.branch);
        Ok(())
    }

    /// Tracked and untracked changes both count; ignored files do not.
    pub fn check_clean_working_tree(&self, ctx: &ReleaseContext) -> Result<()> {
        if !ctx.is_clean() {
            return Err(PreflightError::DirtyTree {
                paths: ctx.dirty_paths.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Required programs are on PATH and the registry has credentials.
    pub fn check_tool_availability(&self) -> Result<()> {
        for tool in &self.config.tools.required {
            if !self.runner.is_available(tool) {
                return Err(PreflightError::ToolUnavailable {
                    tool: tool.clone(),
                    reason: "not found on PATH".to_string(),
                }
                .into());
            }
            debug!("found {}", tool);
        }

        self.registry.check_auth().map_err(|e| PreflightError::ToolUnavailable {
            tool: format!("registry '{}'", self.registry.name()),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}
