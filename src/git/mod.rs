//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the handful of Git
//! operations a changelog update needs, allowing for a real repository
//! implementation and a recording mock for testing.
//!
//! # Overview
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation that records every call
//!
//! Workflow code depends on the [Repository] trait rather than on a concrete
//! implementation.
//!
//! ```rust
//! # use update_changelog::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> update_changelog::Result<()> {
//! let tags = repo.list_tags()?;
//! let paths = repo.changed_paths("7.1.0", "remotes/origin/7.1.x")?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{GitCall, MockRepository};
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Common git operation trait for abstraction
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to
/// [crate::error::UpdateChangelogError] variants.
pub trait Repository {
    /// Root of the working tree; relative paths below are resolved against it
    fn workdir(&self) -> Result<PathBuf>;

    /// Get all tag names in the repository
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Fetch all branches into `refs/remotes/<remote>/*` and all tags
    ///
    /// # Arguments
    /// * `remote` - Name of the remote (e.g., "origin")
    fn fetch(&self, remote: &str) -> Result<()>;

    /// Paths touched by the commits of the symmetric range `from...to`
    ///
    /// Mirrors `git log from...to --name-only`: merge commits contribute no
    /// paths, and each path is reported once in first-seen order.
    ///
    /// # Arguments
    /// * `from` - Any revision, typically a release tag (e.g., "7.1.0")
    /// * `to` - Any revision, typically a remote branch (e.g., "remotes/origin/7.1.x")
    fn changed_paths(&self, from: &str, to: &str) -> Result<Vec<String>>;

    /// Delete files from the working tree and the index (`git rm`)
    ///
    /// Fails without touching anything if one of the paths is not tracked.
    fn remove_paths(&self, paths: &[String]) -> Result<()>;

    /// Reset index and working tree to `HEAD` (`git reset --hard HEAD`)
    fn reset_hard(&self) -> Result<()>;

    /// Stage a work-tree file (`git add`)
    fn stage_path(&self, path: &Path) -> Result<()>;

    /// Commit the index on top of `HEAD`, returning the new commit id
    fn commit(&self, message: &str) -> Result<String>;
}
