//! External release-notes report generator.

use crate::domain::ReleaseVersion;
use crate::error::{Result, UpdateChangelogError};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Produces the changelog text for a version range
pub trait ReportGenerator {
    /// Render the report covering `earliest..=version`
    fn generate(&self, earliest: &ReleaseVersion, version: &ReleaseVersion) -> Result<String>;

    /// Human readable command line, shown before the report runs
    fn describe(&self, earliest: &ReleaseVersion, version: &ReleaseVersion) -> String;
}

/// Arguments passed to the report program for a version range
pub fn report_args(earliest: &ReleaseVersion, version: &ReleaseVersion) -> Vec<String> {
    vec![
        "report".to_string(),
        "--ignore-cache".to_string(),
        "--earliest-version".to_string(),
        earliest.to_string(),
        "--version".to_string(),
        version.to_string(),
        "--no-show-source".to_string(),
    ]
}

/// Runs the report program (`reno` by default) as a child process
///
/// The process runs in the repository work tree; its stdout is the report.
pub struct ReportCommand {
    program: String,
    workdir: PathBuf,
}

impl ReportCommand {
    pub fn new(program: impl Into<String>, workdir: impl AsRef<Path>) -> Self {
        ReportCommand {
            program: program.into(),
            workdir: workdir.as_ref().to_path_buf(),
        }
    }
}

impl ReportGenerator for ReportCommand {
    fn generate(&self, earliest: &ReleaseVersion, version: &ReleaseVersion) -> Result<String> {
        let command_line = self.describe(earliest, version);
        tracing::debug!(command = %command_line, workdir = %self.workdir.display(), "running report generator");

        let output = Command::new(&self.program)
            .args(report_args(earliest, version))
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| UpdateChangelogError::Command {
                command: command_line.clone(),
                code: None,
                stderr: format!("failed to start {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            return Err(UpdateChangelogError::Command {
                command: command_line,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| UpdateChangelogError::Command {
            command: command_line,
            code: None,
            stderr: format!("report is not valid UTF-8: {}", e),
        })
    }

    fn describe(&self, earliest: &ReleaseVersion, version: &ReleaseVersion) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(report_args(earliest, version));
        parts.join(" ")
    }
}
