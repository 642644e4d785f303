use crate::domain::{PublishPhase, TagStage};
use thiserror::Error;

/// Reasons the repository is not in a releasable state
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreflightError {
    #[error("on branch '{actual}', releases must be cut from '{expected}'")]
    WrongBranch { expected: String, actual: String },

    #[error("working tree has uncommitted changes: {}", .paths.join(", "))]
    DirtyTree { paths: Vec<String> },

    #[error("{tool} is unavailable: {reason}")]
    ToolUnavailable { tool: String, reason: String },
}

/// Unified error type for release pipeline operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Preflight check failed: {0}")]
    Preflight(#[from] PreflightError),

    #[error("Quality gate '{gate}' failed: {diagnostic}")]
    GateFailure { gate: String, diagnostic: String },

    #[error("Version bump failed: {0}")]
    Bump(String),

    #[error("Tagging failed at {stage}: {detail}")]
    Tag {
        stage: TagStage,
        detail: String,
        completed: Vec<TagStage>,
    },

    #[error("Publish failed during {phase}: {detail}")]
    Publish { phase: PublishPhase, detail: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Release lock error: {0}")]
    Lock(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in the release pipeline
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        ReleaseError::Manifest(msg.into())
    }

    /// Create a version bump error with context
    pub fn bump(msg: impl Into<String>) -> Self {
        ReleaseError::Bump(msg.into())
    }

    /// Create a lock error with context
    pub fn lock(msg: impl Into<String>) -> Self {
        ReleaseError::Lock(msg.into())
    }

    pub fn gate(gate: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        ReleaseError::GateFailure {
            gate: gate.into(),
            diagnostic: diagnostic.into(),
        }
    }

    pub fn publish(phase: PublishPhase, detail: impl Into<String>) -> Self {
        ReleaseError::Publish {
            phase,
            detail: detail.into(),
        }
    }

    /// Label shown to the operator in front of the diagnostic.
    pub fn category(&self) -> &'static str {
        match self {
            ReleaseError::Preflight(_) => "PreflightError",
            ReleaseError::GateFailure { .. } => "GateFailure",
            ReleaseError::Bump(_) => "BumpError",
            ReleaseError::Tag { .. } => "TagError",
            ReleaseError::Publish { .. } => "PublishError",
            ReleaseError::Config(_) => "ConfigError",
            ReleaseError::Manifest(_) => "ManifestError",
            ReleaseError::Lock(_) => "LockError",
            ReleaseError::Git(_) => "GitError",
            ReleaseError::Io(_) => "IoError",
        }
    }
}
