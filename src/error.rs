use thiserror::Error;

/// Unified error type for update-changelog operations
#[derive(Error, Debug)]
pub enum UpdateChangelogError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Missing '{version}' git tag: mandatory to generate the release notes report")]
    MissingTag { version: String },

    #[error("No release-note fragments changed in '{range}' (set behavior.allow_missing_fragments to continue)")]
    NoFragments { range: String },

    #[error("Command `{command}` failed with exit code {}: {stderr}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    Command {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Changelog error: {0}")]
    Changelog(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in update-changelog
pub type Result<T> = std::result::Result<T, UpdateChangelogError>;

impl UpdateChangelogError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        UpdateChangelogError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        UpdateChangelogError::Version(msg.into())
    }

    /// Create a changelog error with context
    pub fn changelog(msg: impl Into<String>) -> Self {
        UpdateChangelogError::Changelog(msg.into())
    }

    /// Process exit status for this error.
    ///
    /// A failing report generator hands its own status back to the caller;
    /// everything else, malformed versions included, exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            UpdateChangelogError::Command {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}
