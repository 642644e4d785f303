use semver::Version;
use std::fmt;

use crate::error::{ReleaseError, Result};

/// Semantic-version increment requested for a release.
///
/// "No bump" is expressed as `Option::<BumpType>::None` throughout the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpType {
    Major,
    Minor,
    Patch,
}

impl BumpType {
    /// The lowercase name used on the command line and by `cargo set-version`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpType::Major => "major",
            BumpType::Minor => "minor",
            BumpType::Patch => "patch",
        }
    }

    /// Apply this increment to `version`.
    ///
    /// Lower components are reset to zero and any pre-release or build
    /// metadata is dropped. Fails if the incremented component would overflow.
    pub fn apply(&self, version: &Version) -> Result<Version> {
        let overflow = || {
            ReleaseError::bump(format!(
                "{} bump of {} overflows the version component",
                self, version
            ))
        };

        Ok(match self {
            BumpType::Major => {
                Version::new(version.major.checked_add(1).ok_or_else(overflow)?, 0, 0)
            }
            BumpType::Minor => Version::new(
                version.major,
                version.minor.checked_add(1).ok_or_else(overflow)?,
                0,
            ),
            BumpType::Patch => Version::new(
                version.major,
                version.minor,
                version.patch.checked_add(1).ok_or_else(overflow)?,
            ),
        })
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of interpreting the raw bump argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedBump {
    /// No argument, an empty one, or an explicit `none`.
    Skip,
    /// A recognized bump type.
    Bump(BumpType),
    /// Anything else. Treated as a patch release.
    Unrecognized(String),
}

impl RequestedBump {
    /// Interpret the optional positional argument.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return RequestedBump::Skip;
        };

        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" => RequestedBump::Skip,
            "major" => RequestedBump::Bump(BumpType::Major),
            "minor" => RequestedBump::Bump(BumpType::Minor),
            "patch" => RequestedBump::Bump(BumpType::Patch),
            _ => RequestedBump::Unrecognized(raw.to_string()),
        }
    }

    /// The bump that will actually be applied.
    pub fn effective(&self) -> Option<BumpType> {
        match self {
            RequestedBump::Skip => None,
            RequestedBump::Bump(bump) => Some(*bump),
            RequestedBump::Unrecognized(_) => Some(BumpType::Patch),
        }
    }
}

/// A version change applied during a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionBump {
    pub old: Version,
    pub new: Version,
    pub bump_type: BumpType,
}

impl VersionBump {
    /// Compute the bump from `old` without touching the manifest.
    pub fn compute(old: &Version, bump_type: BumpType) -> Result<Self> {
        Ok(VersionBump {
            old: old.clone(),
            new: bump_type.apply(old)?,
            bump_type,
        })
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.old, self.new, self.bump_type)
    }
}
