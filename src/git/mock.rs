use crate::domain::TagStage;
use crate::error::Result;
use crate::git::Repository;
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::PathBuf;

/// A mutating call made against a [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOperation {
    Stage(Vec<PathBuf>),
    Commit(String),
    Tag { name: String, message: String },
    PushBranch { remote: String, branch: String },
    PushTag { remote: String, tag: String },
}

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    branch: String,
    dirty: Vec<String>,
    tags: RefCell<HashSet<String>>,
    fail_at: Option<TagStage>,
    operations: RefCell<Vec<GitOperation>>,
}

impl MockRepository {
    /// Create a clean mock repository on `main`
    pub fn new() -> Self {
        MockRepository {
            branch: "main".to_string(),
            dirty: Vec::new(),
            tags: RefCell::new(HashSet::new()),
            fail_at: None,
            operations: RefCell::new(Vec::new()),
        }
    }

    /// Set the checked-out branch
    pub fn on_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Report these paths as having pending changes
    pub fn with_dirty_paths(mut self, paths: &[&str]) -> Self {
        self.dirty = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Add an existing tag
    pub fn with_tag(self, name: impl Into<String>) -> Self {
        self.tags.borrow_mut().insert(name.into());
        self
    }

    /// Make the operation for `stage` fail
    pub fn failing_at(mut self, stage: TagStage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    /// Mutating operations performed so far, in order
    pub fn operations(&self) -> Vec<GitOperation> {
        self.operations.borrow().clone()
    }

    fn check(&self, stage: TagStage) -> Result<()> {
        if self.fail_at == Some(stage) {
            return Err(git2::Error::from_str(&format!("simulated {} failure", stage)).into());
        }
        Ok(())
    }

    fn record(&self, operation: GitOperation) {
        self.operations.borrow_mut().push(operation);
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn dirty_paths(&self) -> Result<Vec<String>> {
        Ok(self.dirty.clone())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self.tags.borrow().contains(name))
    }

    fn stage_paths(&self, paths: &[PathBuf]) -> Result<()> {
        self.check(TagStage::Stage)?;
        self.record(GitOperation::Stage(paths.to_vec()));
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.check(TagStage::Commit)?;
        self.record(GitOperation::Commit(message.to_string()));
        Ok(format!("{:040x}", self.operations.borrow().len()))
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        self.check(TagStage::Tag)?;
        self.tags.borrow_mut().insert(name.to_string());
        self.record(GitOperation::Tag {
            name: name.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.check(TagStage::PushBranch)?;
        self.record(GitOperation::PushBranch {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        Ok(())
    }

    fn push_tag(&self, remote: &str, tag: &str) -> Result<()> {
        self.check(TagStage::PushTag)?;
        self.record(GitOperation::PushTag {
            remote: remote.to_string(),
            tag: tag.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_defaults() {
        let repo = MockRepository::default();
        assert_eq!(repo.current_branch().unwrap(), "main");
        assert!(repo.dirty_paths().unwrap().is_empty());
        assert!(repo.operations().is_empty());
    }

    #[test]
    fn test_mock_repository_records_operations() {
        let repo = MockRepository::new();
        repo.commit("chore: release v1.0.0").unwrap();
        repo.create_annotated_tag("v1.0.0", "Release v1.0.0").unwrap();

        assert!(repo.tag_exists("v1.0.0").unwrap());
        assert_eq!(
            repo.operations(),
            vec![
                GitOperation::Commit("chore: release v1.0.0".to_string()),
                GitOperation::Tag {
                    name: "v1.0.0".to_string(),
                    message: "Release v1.0.0".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_mock_repository_failure_is_not_recorded() {
        let repo = MockRepository::new().failing_at(TagStage::PushTag);
        repo.push_branch("origin", "main").unwrap();
        assert!(repo.push_tag("origin", "v1.0.0").is_err());
        assert_eq!(repo.operations().len(), 1);
    }

    #[test]
    fn test_mock_repository_branch_and_dirty_state() {
        let repo = MockRepository::new()
            .on_branch("feature/x")
            .with_dirty_paths(&["src/lib.rs"])
            .with_tag("v0.1.0");
        assert_eq!(repo.current_branch().unwrap(), "feature/x");
        assert_eq!(repo.dirty_paths().unwrap(), vec!["src/lib.rs"]);
        assert!(repo.tag_exists("v0.1.0").unwrap());
    }
}
