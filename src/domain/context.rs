use super::tag::tag_name;
use super::version::{BumpType, VersionBump};
use semver::Version;

/// Everything the pipeline knows about the release in progress.
///
/// Gathered once before preflight and passed explicitly to each stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseContext {
    pub branch: String,
    pub dirty_paths: Vec<String>,
    pub current_version: Version,
    pub requested_bump: Option<BumpType>,
    pub new_version: Option<Version>,
    pub tag_name: Option<String>,
}

impl ReleaseContext {
    pub fn new(
        branch: impl Into<String>,
        dirty_paths: Vec<String>,
        current_version: Version,
        requested_bump: Option<BumpType>,
    ) -> Self {
        ReleaseContext {
            branch: branch.into(),
            dirty_paths,
            current_version,
            requested_bump,
            new_version: None,
            tag_name: None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.dirty_paths.is_empty()
    }

    /// Record the version now in the manifest and derive the tag from it.
    pub fn record_bump(&mut self, bump: &VersionBump) {
        self.tag_name = Some(tag_name(&bump.new));
        self.new_version = Some(bump.new.clone());
    }

    /// The version that will be published: the bumped one if a bump happened.
    pub fn release_version(&self) -> &Version {
        self.new_version.as_ref().unwrap_or(&self.current_version)
    }
}
