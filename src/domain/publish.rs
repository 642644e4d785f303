use semver::Version;
use std::fmt;

/// Which half of the two-phase publish an attempt belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishPhase {
    DryRun,
    Publish,
}

impl fmt::Display for PublishPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishPhase::DryRun => f.write_str("dry-run"),
            PublishPhase::Publish => f.write_str("publish"),
        }
    }
}

/// Record of one call made to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishAttempt {
    pub dry_run: bool,
    pub success: bool,
    pub error: Option<String>,
    pub version: Version,
}

impl PublishAttempt {
    pub fn phase(&self) -> PublishPhase {
        if self.dry_run {
            PublishPhase::DryRun
        } else {
            PublishPhase::Publish
        }
    }
}
