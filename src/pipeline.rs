//! Release state machine
//!
//! `Start -> Preflight -> QualityGates -> [VersionBump -> (DegradedBump) -> Tag]`
//! `-> Publish -> Done`
//!
//! Any state may move to `Aborted`. The bump and tag states are only visited
//! when a bump was requested. An existing release tag aborts in `VersionBump`
//! before the manifest is touched. Every failure is terminal.

use std::fmt;

use log::{debug, info};

use crate::bump::{read_manifest_version, BumpTool, VersionBumper};
use crate::config::Config;
use crate::domain::{
    tag_name, BumpType, GateResult, PublishAttempt, ReleaseContext, RequestedBump, TagStage,
    VersionBump,
};
use crate::error::{ReleaseError, Result};
use crate::gates::QualityGateRunner;
use crate::git::Repository;
use crate::preflight::PreflightValidator;
use crate::publisher::{Publisher, Registry};
use crate::tagger::ReleaseTagger;
use crate::toolchain::CommandRunner;
use crate::ui::{self, Prompter};
use crate::warning::ReleaseWarning;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Preflight,
    QualityGates,
    VersionBump,
    /// Waiting on the operator to edit the manifest by hand
    DegradedBump,
    Tag,
    Publish,
    Done,
    Aborted(String),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Aborted(_))
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Start => f.write_str("Start"),
            PipelineState::Preflight => f.write_str("Preflight"),
            PipelineState::QualityGates => f.write_str("QualityGates"),
            PipelineState::VersionBump => f.write_str("VersionBump"),
            PipelineState::DegradedBump => f.write_str("DegradedBump"),
            PipelineState::Tag => f.write_str("Tag"),
            PipelineState::Publish => f.write_str("Publish"),
            PipelineState::Done => f.write_str("Done"),
            PipelineState::Aborted(reason) => write!(f, "Aborted({})", reason),
        }
    }
}

/// External systems the pipeline drives
pub struct Collaborators<'a> {
    pub repo: &'a dyn Repository,
    pub runner: &'a dyn CommandRunner,
    pub bump_tool: &'a dyn BumpTool,
    pub registry: &'a dyn Registry,
    pub prompter: &'a dyn Prompter,
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct PipelineOutcome {
    pub state: PipelineState,
    /// Every state visited, terminal state included
    pub history: Vec<PipelineState>,
    pub context: Option<ReleaseContext>,
    pub warnings: Vec<ReleaseWarning>,
    pub gate_results: Vec<GateResult>,
    pub bump: Option<VersionBump>,
    pub publish_attempts: Vec<PublishAttempt>,
    pub error: Option<ReleaseError>,
}

impl PipelineOutcome {
    fn new() -> Self {
        PipelineOutcome {
            state: PipelineState::Start,
            history: Vec::new(),
            context: None,
            warnings: Vec::new(),
            gate_results: Vec::new(),
            bump: None,
            publish_attempts: Vec::new(),
            error: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.state == PipelineState::Done
    }

    /// Process exit code: 0 only when the run reached `Done`.
    pub fn exit_code(&self) -> u8 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }

    pub fn visited(&self, state: &PipelineState) -> bool {
        self.history.contains(state)
    }

    fn enter(&mut self, state: PipelineState) {
        debug!("{} -> {}", self.state, state);
        self.history.push(state.clone());
        self.state = state;
    }

    fn abort(&mut self, error: ReleaseError) {
        let reason = format!("{}: {}", error.category(), error);
        self.enter(PipelineState::Aborted(reason));
        self.error = Some(error);
    }
}

pub struct Pipeline<'a> {
    config: &'a Config,
    deps: Collaborators<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, deps: Collaborators<'a>) -> Self {
        Pipeline { config, deps }
    }

    /// Drive one release to a terminal state.
    ///
    /// `raw_bump` is the unparsed positional argument. Never panics on
    /// failure; the error is carried in the outcome and already reported to
    /// the operator.
    pub fn run(&self, raw_bump: Option<&str>) -> PipelineOutcome {
        let mut outcome = PipelineOutcome::new();
        outcome.history.push(PipelineState::Start);

        let requested = RequestedBump::parse(raw_bump);
        if let RequestedBump::Unrecognized(given) = &requested {
            self.warn(
                &mut outcome,
                ReleaseWarning::UnrecognizedBumpType {
                    given: given.clone(),
                    applied: BumpType::Patch,
                },
            );
        }

        let mut ctx = match self.gather_context(requested.effective()) {
            Ok(ctx) => ctx,
            Err(e) => {
                self.fail(&mut outcome, None, e);
                return outcome;
            }
        };

        let mut next = PipelineState::Preflight;
        while !next.is_terminal() {
            outcome.enter(next.clone());
            next = match self.step(&next, &mut ctx, &mut outcome) {
                Ok(state) => state,
                Err(e) => {
                    self.fail(&mut outcome, Some(&ctx), e);
                    break;
                }
            };
        }

        if next == PipelineState::Done {
            outcome.enter(PipelineState::Done);
            ui::display_success(&format!(
                "Released {} to {}",
                ctx.release_version(),
                self.deps.registry.name()
            ));
        }

        outcome.context = Some(ctx);
        outcome
    }

    fn gather_context(&self, requested: Option<BumpType>) -> Result<ReleaseContext> {
        let branch = self.deps.repo.current_branch()?;
        let dirty = self.deps.repo.dirty_paths()?;
        let version = read_manifest_version(&self.config.manifest_path)?;
        info!(
            "releasing {} from {} (bump: {})",
            version,
            branch,
            requested.map(|b| b.as_str()).unwrap_or("none")
        );
        Ok(ReleaseContext::new(branch, dirty, version, requested))
    }

    fn step(
        &self,
        state: &PipelineState,
        ctx: &mut ReleaseContext,
        outcome: &mut PipelineOutcome,
    ) -> Result<PipelineState> {
        match state {
            PipelineState::Preflight => {
                ui::display_stage("Preflight");
                PreflightValidator::new(self.config, self.deps.runner, self.deps.registry)
                    .run(ctx)?;
                ui::display_success(&format!(
                    "on {}, working tree clean, toolchain ready",
                    ctx.branch
                ));
                Ok(PipelineState::QualityGates)
            }
            PipelineState::QualityGates => {
                ui::display_stage("Quality gates");
                QualityGateRunner::new(&self.config.gates, self.deps.runner)
                    .run_all(&mut outcome.gate_results)?;

                if ctx.requested_bump.is_some() {
                    Ok(PipelineState::VersionBump)
                } else {
                    ui::display_status(&format!(
                        "No bump requested; publishing {} unchanged",
                        ctx.current_version
                    ));
                    Ok(PipelineState::Publish)
                }
            }
            PipelineState::VersionBump => {
                ui::display_stage("Version bump");
                self.ensure_tag_free(ctx)?;

                let bumper = self.bumper();
                if !bumper.tool_available() {
                    self.warn(
                        outcome,
                        ReleaseWarning::BumpToolUnavailable {
                            tool: bumper.tool_name().to_string(),
                        },
                    );
                    return Ok(PipelineState::DegradedBump);
                }

                let bump_type = self.requested_bump(ctx)?;
                let bump = bumper.bump_with_tool(ctx, bump_type)?;
                ui::display_success(&format!("Version {}", bump));
                outcome.bump = Some(bump);
                Ok(PipelineState::Tag)
            }
            PipelineState::DegradedBump => {
                let bump_type = self.requested_bump(ctx)?;
                let bump = self.bumper().bump_manually(ctx, bump_type)?;
                ui::display_success(&format!("Version {}", bump));
                outcome.bump = Some(bump);
                Ok(PipelineState::Tag)
            }
            PipelineState::Tag => {
                ui::display_stage("Tag");
                let tag = ReleaseTagger::new(self.deps.repo, self.config)
                    .tag_release(ctx.release_version(), &ctx.branch)?;
                ui::display_success(&format!(
                    "Tagged {} and pushed to {}",
                    tag, self.config.remote
                ));
                Ok(PipelineState::Publish)
            }
            PipelineState::Publish => {
                ui::display_stage("Publish");
                Publisher::new(self.deps.registry)
                    .publish(ctx.release_version(), &mut outcome.publish_attempts)?;
                Ok(PipelineState::Done)
            }
            PipelineState::Start | PipelineState::Done | PipelineState::Aborted(_) => {
                Err(ReleaseError::config(format!("no transition out of {}", state)))
            }
        }
    }

    fn bumper(&self) -> VersionBumper<'_> {
        VersionBumper::new(
            self.deps.bump_tool,
            self.deps.prompter,
            &self.config.manifest_path,
        )
    }

    /// Refuse to bump when the release tag for the computed version exists.
    fn ensure_tag_free(&self, ctx: &ReleaseContext) -> Result<()> {
        let expected = VersionBump::compute(&ctx.current_version, self.requested_bump(ctx)?)?;
        let tag = tag_name(&expected.new);
        if self.deps.repo.tag_exists(&tag)? {
            return Err(ReleaseError::Tag {
                stage: TagStage::Tag,
                detail: format!("tag {} already exists", tag),
                completed: Vec::new(),
            });
        }
        Ok(())
    }

    fn requested_bump(&self, ctx: &ReleaseContext) -> Result<BumpType> {
        ctx.requested_bump
            .ok_or_else(|| ReleaseError::bump("no bump type was requested"))
    }

    fn warn(&self, outcome: &mut PipelineOutcome, warning: ReleaseWarning) {
        ui::display_warning(&warning);
        outcome.warnings.push(warning);
    }

    fn fail(
        &self,
        outcome: &mut PipelineOutcome,
        ctx: Option<&ReleaseContext>,
        error: ReleaseError,
    ) {
        if let (ReleaseError::Tag { completed, .. }, Some(ctx)) = (&error, ctx) {
            let recovery = ReleaseTagger::new(self.deps.repo, self.config).recovery(
                ctx.release_version(),
                &ctx.branch,
                completed,
                outcome.bump.is_some(),
            );
            ui::display_tag_recovery(&recovery);
        }
        ui::display_failure(&error);
        outcome.abort(error);
    }
}
