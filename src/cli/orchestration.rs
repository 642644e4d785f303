//! Release workflow wiring
//!
//! Builds the real collaborators (git repository, process runner, cargo
//! registry, terminal prompts) and hands them to the pipeline. Keeping this
//! out of main.rs lets the workflow be called without clap.

use anyhow::{Context, Result};
use log::debug;

use crate::bump::CargoSetVersion;
use crate::config::load_config;
use crate::git::Git2Repository;
use crate::lock::ReleaseLock;
use crate::pipeline::{Collaborators, Pipeline, PipelineOutcome};
use crate::publisher::CargoRegistry;
use crate::toolchain::SystemRunner;
use crate::ui::TerminalPrompter;

/// Arguments for the release workflow
///
/// Mirrors the CLI Args in a form that does not depend on clap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseWorkflowArgs {
    /// Path to custom config file
    pub config_path: Option<String>,

    /// Raw bump argument; `None` publishes the current version
    pub bump: Option<String>,
}

/// Run one release from the current directory.
///
/// Returns `Err` only for setup failures (configuration, repository
/// discovery, lock). Pipeline failures are reported through the outcome.
pub fn run_release_workflow(args: ReleaseWorkflowArgs) -> Result<PipelineOutcome> {
    let mut config =
        load_config(args.config_path.as_deref()).context("failed to load configuration")?;

    let repo = Git2Repository::open(".").context("not inside a git repository")?;
    let workdir = repo.workdir()?;
    config.resolve_manifest(&workdir);
    debug!("manifest: {}", config.manifest_path.display());

    let _lock = ReleaseLock::acquire(repo.git_dir())?;

    let runner = SystemRunner::new(&workdir);
    let bump_tool = CargoSetVersion::new(&runner, config.manifest_path.clone());
    let registry = CargoRegistry::new(
        &runner,
        config.manifest_path.clone(),
        config.publish.registry.clone(),
    );
    let prompter = TerminalPrompter;

    let pipeline = Pipeline::new(
        &config,
        Collaborators {
            repo: &repo,
            runner: &runner,
            bump_tool: &bump_tool,
            registry: &registry,
            prompter: &prompter,
        },
    );

    Ok(pipeline.run(args.bump.as_deref()))
}
