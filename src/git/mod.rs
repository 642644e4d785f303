//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the version-control
//! primitives a release needs, allowing for multiple implementations
//! including real Git repositories and mock implementations for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation for testing
//!
//! # Usage
//!
//! Pipeline stages depend on the [Repository] trait rather than concrete
//! implementations.
//!
//! ```rust
//! # use release_pipeline::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> release_pipeline::Result<()> {
//! if repo.current_branch()? == "main" && repo.dirty_paths()?.is_empty() {
//!     println!("ready to release");
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{GitOperation, MockRepository};
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::PathBuf;

/// Version-control operations used by the release pipeline
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to [crate::error::ReleaseError].
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real Git implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): Test implementation recording every mutation
pub trait Repository {
    /// Name of the checked-out branch
    ///
    /// Returns `"HEAD"` when HEAD is detached.
    fn current_branch(&self) -> Result<String>;

    /// Paths with staged, unstaged or untracked changes
    ///
    /// Ignored files are not reported. An empty list means the working tree is clean.
    fn dirty_paths(&self) -> Result<Vec<String>>;

    /// Whether a tag with this name already exists locally
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Add files to the index
    ///
    /// Paths may be absolute (inside the working directory) or relative to it.
    /// Ignored paths are skipped.
    fn stage_paths(&self, paths: &[PathBuf]) -> Result<()>;

    /// Commit the index on top of HEAD
    ///
    /// # Returns
    /// * `Ok(String)` - The new commit id
    fn commit(&self, message: &str) -> Result<String>;

    /// Create an annotated tag pointing at HEAD
    ///
    /// Fails if the tag already exists.
    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push a local branch to the same name on `remote`
    fn push_branch(&self, remote: &str, branch: &str) -> Result<()>;

    /// Push a tag to `remote`
    fn push_tag(&self, remote: &str, tag: &str) -> Result<()>;
}
