//! Commit, tag and push the version change.
//!
//! Completed sub-steps are never undone. A failure reports the stage that
//! failed and every stage that had already succeeded so the operator can
//! finish by hand.

use std::path::{Path, PathBuf};

use log::{debug, info};
use semver::Version;

use crate::config::Config;
use crate::domain::tag::render_template;
use crate::domain::{tag_name, TagRecovery, TagStage};
use crate::error::{ReleaseError, Result};
use crate::git::Repository;

pub struct ReleaseTagger<'a> {
    repo: &'a dyn Repository,
    config: &'a Config,
}

impl<'a> ReleaseTagger<'a> {
    pub fn new(repo: &'a dyn Repository, config: &'a Config) -> Self {
        ReleaseTagger { repo, config }
    }

    /// Files committed with the release: the manifest and, if present, the
    /// lock file next to it.
    pub fn release_paths(manifest: &Path) -> Vec<PathBuf> {
        let mut paths = vec![manifest.to_path_buf()];
        let lock = manifest.with_file_name("Cargo.lock");
        if lock.exists() {
            paths.push(lock);
        }
        paths
    }

    /// Release `version` on `branch`. Returns the tag name.
    pub fn tag_release(&self, version: &Version, branch: &str) -> Result<String> {
        let tag = tag_name(version);
        let remote = self.config.remote.as_str();

        // Refuse before touching anything if the release already exists.
        if self.repo.tag_exists(&tag)? {
            return Err(ReleaseError::Tag {
                stage: TagStage::Tag,
                detail: format!("tag {} already exists", tag),
                completed: Vec::new(),
            });
        }

        let commit_message = render_template(&self.config.messages.commit, version);
        let tag_message = render_template(&self.config.messages.tag, version);
        let paths = Self::release_paths(&self.config.manifest_path);

        let mut completed = Vec::new();
        for stage in TagStage::ALL {
            let result = match stage {
                TagStage::Stage => self.repo.stage_paths(&paths),
                TagStage::Commit => self.repo.commit(&commit_message).map(|id| {
                    debug!("release commit {}", id);
                }),
                TagStage::Tag => self.repo.create_annotated_tag(&tag, &tag_message),
                TagStage::PushBranch => self.repo.push_branch(remote, branch),
                TagStage::PushTag => self.repo.push_tag(remote, &tag),
            };

            if let Err(e) = result {
                return Err(ReleaseError::Tag {
                    stage,
                    detail: e.to_string(),
                    completed,
                });
            }

            debug!("tag stage {} done", stage);
            completed.push(stage);
        }

        info!("tagged and pushed {} to {}", tag, remote);
        Ok(tag)
    }

    /// What the operator still has to run after `tag_release` stopped with
    /// `completed` stages done.
    pub fn recovery(
        &self,
        version: &Version,
        branch: &str,
        completed: &[TagStage],
        manifest_edited: bool,
    ) -> TagRecovery {
        TagRecovery {
            completed: completed.to_vec(),
            manifest_edited,
            paths: Self::release_paths(&self.config.manifest_path),
            remote: self.config.remote.clone(),
            branch: branch.to_string(),
            tag: tag_name(version),
            commit_message: render_template(&self.config.messages.commit, version),
            tag_message: render_template(&self.config.messages.tag, version),
        }
    }
}
