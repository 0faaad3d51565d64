//! Changelog splicing: the fresh report goes on top, the old header goes away.

use crate::error::{Result, UpdateChangelogError};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Drops the first `header_lines` lines of `content`.
///
/// Line endings are kept on the remaining lines. A changelog with fewer lines
/// than the header comes back empty.
pub fn strip_header(content: &str, header_lines: usize) -> &str {
    let offset: usize = content
        .split_inclusive('\n')
        .take(header_lines)
        .map(str::len)
        .sum();

    &content[offset..]
}

/// The new changelog text: `report` immediately followed by the old content
/// minus its header.
pub fn splice(report: &str, existing: &str, header_lines: usize) -> String {
    let body = strip_header(existing, header_lines);

    let mut spliced = String::with_capacity(report.len() + body.len());
    spliced.push_str(report);
    spliced.push_str(body);
    spliced
}

/// Rewrites the changelog at `path` with `report` on top.
///
/// The new content is written to a temporary file next to the changelog and
/// renamed over it, so a failure leaves the original file untouched.
pub fn rewrite(path: &Path, report: &str, header_lines: usize) -> Result<()> {
    let existing = fs::read_to_string(path).map_err(|e| {
        UpdateChangelogError::changelog(format!("cannot read {}: {}", path.display(), e))
    })?;

    let spliced = splice(report, &existing, header_lines);

    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(spliced.as_bytes())?;
    staged.flush()?;
    staged.persist(path).map_err(|e| {
        UpdateChangelogError::changelog(format!("cannot replace {}: {}", path.display(), e.error))
    })?;

    tracing::debug!(path = %path.display(), bytes = spliced.len(), "changelog rewritten");
    Ok(())
}
