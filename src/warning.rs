use crate::domain::BumpType;
use std::fmt;

/// Non-fatal conditions reported to the operator while the release continues.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseWarning {
    /// The bump argument was not one of major/minor/patch
    UnrecognizedBumpType { given: String, applied: BumpType },
    /// The automated bump tool is missing; the version must be edited by hand
    BumpToolUnavailable { tool: String },
}

impl fmt::Display for ReleaseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseWarning::UnrecognizedBumpType { given, applied } => write!(
                f,
                "Unrecognized bump type '{}', expected major, minor or patch; using '{}'",
                given, applied
            ),
            ReleaseWarning::BumpToolUnavailable { tool } => write!(
                f,
                "Version bump tool '{}' is not available; falling back to a manual edit",
                tool
            ),
        }
    }
}
