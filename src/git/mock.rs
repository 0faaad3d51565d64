use crate::error::{Result, UpdateChangelogError};
use crate::git::Repository;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One call made against a [MockRepository]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    ListTags,
    Fetch(String),
    ChangedPaths { from: String, to: String },
    RemovePaths(Vec<String>),
    ResetHard,
    StagePath(PathBuf),
    Commit(String),
}

impl GitCall {
    /// Whether the call changes repository state
    pub fn is_mutation(&self) -> bool {
        !matches!(self, GitCall::ListTags | GitCall::ChangedPaths { .. })
    }
}

/// Mock repository for testing without actual git operations
///
/// Every trait call is recorded in order so tests can assert on the sequence
/// of operations a workflow performed.
pub struct MockRepository {
    workdir: PathBuf,
    tags: Vec<String>,
    changed_paths: HashMap<(String, String), Vec<String>>,
    fail_fetch: bool,
    calls: Mutex<Vec<GitCall>>,
}

impl MockRepository {
    /// Create a new empty mock repository rooted at `workdir`
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        MockRepository {
            workdir: workdir.into(),
            tags: Vec::new(),
            changed_paths: HashMap::new(),
            fail_fetch: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add a tag name
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.push(name.into());
    }

    /// Set the paths reported for the range `from...to`
    pub fn set_changed_paths(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        paths: Vec<String>,
    ) {
        self.changed_paths.insert((from.into(), to.into()), paths);
    }

    /// Make every fetch fail
    pub fn fail_fetch(&mut self) {
        self.fail_fetch = true;
    }

    /// Calls recorded so far, oldest first
    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: GitCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Repository for MockRepository {
    fn workdir(&self) -> Result<PathBuf> {
        Ok(self.workdir.clone())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        self.record(GitCall::ListTags);
        Ok(self.tags.clone())
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        self.record(GitCall::Fetch(remote.to_string()));
        if self.fail_fetch {
            return Err(UpdateChangelogError::Git(git2::Error::from_str(&format!(
                "fetch from '{}' failed",
                remote
            ))));
        }
        Ok(())
    }

    fn changed_paths(&self, from: &str, to: &str) -> Result<Vec<String>> {
        self.record(GitCall::ChangedPaths {
            from: from.to_string(),
            to: to.to_string(),
        });
        Ok(self
            .changed_paths
            .get(&(from.to_string(), to.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn remove_paths(&self, paths: &[String]) -> Result<()> {
        self.record(GitCall::RemovePaths(paths.to_vec()));
        Ok(())
    }

    fn reset_hard(&self) -> Result<()> {
        self.record(GitCall::ResetHard);
        Ok(())
    }

    fn stage_path(&self, path: &Path) -> Result<()> {
        self.record(GitCall::StagePath(path.to_path_buf()));
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.record(GitCall::Commit(message.to_string()));
        Ok("0000000000000000000000000000000000000000".to_string())
    }
}
