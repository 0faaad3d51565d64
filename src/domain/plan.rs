use crate::config::Config;
use crate::domain::version::{MinorLine, ReleaseVersion};
use crate::error::{Result, UpdateChangelogError};
use regex::Regex;
use std::path::PathBuf;

/// Symmetric revision range (`from...to`) whose changed paths are inspected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRange {
    pub from: String,
    pub to: String,
}

impl std::fmt::Display for RevisionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}...{}", self.from, self.to)
    }
}

/// Every name, range and argument of a changelog update, derived up front.
///
/// Building the plan touches nothing outside the process, so a bad version or
/// configuration is rejected before any repository state changes.
#[derive(Debug, Clone)]
pub struct ReleasePlan {
    pub version: ReleaseVersion,
    pub previous_line: MinorLine,
    pub earliest_version: ReleaseVersion,
    pub remote: String,
    pub fragment_range: RevisionRange,
    pub fragment_pattern: Regex,
    pub changelog_path: PathBuf,
    pub header_lines: usize,
    pub commit_message: String,
}

impl ReleasePlan {
    pub fn new(version: ReleaseVersion, config: &Config) -> Result<Self> {
        let previous_line = version.previous_minor_line()?;
        let earliest_version = previous_line.first_release();

        let branch = config
            .git
            .release_branch
            .replace("{minor_line}", &previous_line.to_string());

        let fragment_pattern = Regex::new(&config.git.fragment_pattern).map_err(|e| {
            UpdateChangelogError::config(format!(
                "invalid fragment_pattern '{}': {}",
                config.git.fragment_pattern, e
            ))
        })?;

        Ok(ReleasePlan {
            version,
            previous_line,
            earliest_version,
            remote: config.git.remote.clone(),
            fragment_range: RevisionRange {
                from: earliest_version.to_string(),
                to: format!("remotes/{}/{}", config.git.remote, branch),
            },
            fragment_pattern,
            changelog_path: config.changelog.path.clone(),
            header_lines: config.changelog.header_lines,
            commit_message: config
                .commit
                .message
                .replace("{version}", &version.to_string()),
        })
    }

    /// Version string the tag check looks for
    pub fn tag_needle(&self) -> String {
        self.version.to_string()
    }

    /// Keeps only the paths that are release-note fragments
    pub fn select_fragments(&self, paths: &[String]) -> Vec<String> {
        paths
            .iter()
            .filter(|path| self.fragment_pattern.is_match(path))
            .cloned()
            .collect()
    }
}
