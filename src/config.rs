use crate::error::{Result, UpdateChangelogError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the current directory
pub const LOCAL_CONFIG_FILE: &str = "update-changelog.toml";

/// File name looked up in the user config directory
pub const USER_CONFIG_FILE: &str = ".update-changelog.toml";

/// Represents the complete configuration for update-changelog.
///
/// Contains the changelog location, git naming conventions, the report
/// generator, the commit message template and behavior options.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub commit: CommitConfig,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

fn default_changelog_path() -> PathBuf {
    PathBuf::from("CHANGELOG.rst")
}

fn default_header_lines() -> usize {
    4
}

/// Where the changelog lives and how large its fixed header is.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChangelogConfig {
    /// Path relative to the repository work tree
    #[serde(default = "default_changelog_path")]
    pub path: PathBuf,

    /// Lines dropped from the top of the existing changelog before splicing
    #[serde(default = "default_header_lines")]
    pub header_lines: usize,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            path: default_changelog_path(),
            header_lines: default_header_lines(),
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_release_branch() -> String {
    "{minor_line}.x".to_string()
}

fn default_fragment_pattern() -> String {
    "releasenotes/notes/".to_string()
}

/// Git naming conventions used to locate stale release-note fragments.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Maintenance branch of a minor line; `{minor_line}` becomes e.g. `7.1`
    #[serde(default = "default_release_branch")]
    pub release_branch: String,

    /// Regex matched against changed paths to pick fragment files
    #[serde(default = "default_fragment_pattern")]
    pub fragment_pattern: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
            release_branch: default_release_branch(),
            fragment_pattern: default_fragment_pattern(),
        }
    }
}

fn default_report_program() -> String {
    "reno".to_string()
}

/// External release-notes report generator.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReportConfig {
    #[serde(default = "default_report_program")]
    pub program: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            program: default_report_program(),
        }
    }
}

fn default_commit_message() -> String {
    "Update CHANGELOG for {version}".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitConfig {
    #[serde(default = "default_commit_message")]
    pub message: String,
}

impl Default for CommitConfig {
    fn default() -> Self {
        CommitConfig {
            message: default_commit_message(),
        }
    }
}

/// Configuration for behavior customization.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct BehaviorConfig {
    /// Skip the hard reset so fragment removals land in the changelog commit
    #[serde(default)]
    pub keep_fragment_removal: bool,

    /// Warn and continue when no release-note fragments are found
    #[serde(default)]
    pub allow_missing_fragments: bool,
}

impl Config {
    /// Rejects templates and patterns the workflow cannot use.
    pub fn validate(&self) -> Result<()> {
        regex::Regex::new(&self.git.fragment_pattern).map_err(|e| {
            UpdateChangelogError::config(format!(
                "invalid fragment_pattern '{}': {}",
                self.git.fragment_pattern, e
            ))
        })?;

        if !self.git.release_branch.contains("{minor_line}") {
            return Err(UpdateChangelogError::config(format!(
                "release_branch '{}' must contain the {{minor_line}} placeholder",
                self.git.release_branch
            )));
        }

        if !self.commit.message.contains("{version}") {
            return Err(UpdateChangelogError::config(format!(
                "commit message '{}' must contain the {{version}} placeholder",
                self.commit.message
            )));
        }

        if self.report.program.trim().is_empty() {
            return Err(UpdateChangelogError::config(
                "report program must not be empty",
            ));
        }

        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `update-changelog.toml` in current directory
/// 3. `.update-changelog.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded and validated configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let source = if let Some(path) = config_path {
        Some(PathBuf::from(path))
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        Some(PathBuf::from(LOCAL_CONFIG_FILE))
    } else {
        dirs::config_dir()
            .map(|dir| dir.join(USER_CONFIG_FILE))
            .filter(|path| path.exists())
    };

    let config = match source {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            let content = fs::read_to_string(&path).map_err(|e| {
                UpdateChangelogError::config(format!("cannot read {}: {}", path.display(), e))
            })?;
            toml::from_str::<Config>(&content).map_err(|e| {
                UpdateChangelogError::config(format!("cannot parse {}: {}", path.display(), e))
            })?
        }
        None => Config::default(),
    };

    config.validate()?;
    Ok(config)
}
