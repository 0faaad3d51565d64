//! Main workflow orchestration logic
//!
//! The changelog update is a fixed, linear pipeline. It lives here rather
//! than in main.rs so it can run against any [Repository] and
//! [ReportGenerator], which is how the tests drive it.

use crate::boundary::BoundaryWarning;
use crate::changelog;
use crate::config::Config;
use crate::domain::{ReleasePlan, ReleaseVersion};
use crate::error::{Result, UpdateChangelogError};
use crate::git::Repository;
use crate::report::ReportGenerator;
use crate::ui;

/// Arguments for the update workflow
///
/// Mirrors the CLI Args in a form that does not depend on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateWorkflowArgs {
    /// Version being released, `MAJOR.MINOR.PATCH`
    pub new_version: String,

    /// Preview mode - check the tag, print the plan, change nothing
    pub dry_run: bool,

    /// Commit the fragment removals instead of resetting them away
    pub keep_fragment_removal: bool,
}

/// Result of a successful update workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// The version the changelog was updated for
    pub version: ReleaseVersion,

    /// Fragment files removed by the log query step
    pub removed_fragments: Vec<String>,

    /// Whether the reset reverted the removals
    pub removals_reset: bool,

    /// Id of the changelog commit, `None` on a dry run
    pub commit: Option<String>,
}

/// Main changelog update workflow
///
/// Steps, in order:
/// 1. Parse the version and derive the plan
/// 2. Check that a tag for the version exists
/// 3. Fetch from the remote
/// 4. Remove fragments of the previous minor line (none found halts the run
///    unless `behavior.allow_missing_fragments` is set)
/// 5. Generate the report
/// 6. Reset the work tree to HEAD
/// 7. Splice the report above the old changelog body
/// 8. Stage and commit the changelog
///
/// Nothing in the repository changes before step 3, so a bad version or a
/// missing tag leaves everything as it was.
pub fn run_update_workflow<R, G>(
    args: &UpdateWorkflowArgs,
    config: &Config,
    repo: &R,
    generator: &G,
) -> Result<WorkflowResult>
where
    R: Repository + ?Sized,
    G: ReportGenerator + ?Sized,
{
    let version = ReleaseVersion::parse(&args.new_version)?;
    let plan = ReleasePlan::new(version, config)?;
    let report_command = generator.describe(&plan.earliest_version, &plan.version);

    // Tag check
    let needle = plan.tag_needle();
    let tags = repo.list_tags()?;
    if !tags.iter().any(|tag| tag.contains(&needle)) {
        return Err(UpdateChangelogError::MissingTag { version: needle });
    }
    tracing::debug!(version = %plan.version, "release tag present");

    if args.dry_run {
        ui::display_plan(&plan, &report_command);
        return Ok(WorkflowResult {
            version,
            removed_fragments: Vec::new(),
            removals_reset: false,
            commit: None,
        });
    }

    ui::display_status(&format!("Fetching from remote '{}'...", plan.remote));
    repo.fetch(&plan.remote)?;

    // Fragments of the previous minor line
    let changed = repo.changed_paths(&plan.fragment_range.from, &plan.fragment_range.to)?;
    let fragments = plan.select_fragments(&changed);
    if fragments.is_empty() {
        if !config.behavior.allow_missing_fragments {
            return Err(UpdateChangelogError::NoFragments {
                range: plan.fragment_range.to_string(),
            });
        }
        ui::display_boundary_warning(&BoundaryWarning::NoStaleFragments {
            range: plan.fragment_range.to_string(),
        });
    } else {
        ui::display_status(&format!(
            "Removing {} release-note fragment(s) from {}",
            fragments.len(),
            plan.previous_line
        ));
        repo.remove_paths(&fragments)?;
    }

    ui::display_status(&format!("Running: {}", report_command));
    let report = generator.generate(&plan.earliest_version, &plan.version)?;

    let removals_reset = !(args.keep_fragment_removal || config.behavior.keep_fragment_removal);
    if removals_reset {
        if !fragments.is_empty() {
            ui::display_boundary_warning(&BoundaryWarning::FragmentRemovalDiscarded {
                count: fragments.len(),
            });
        }
        repo.reset_hard()?;
    }

    let changelog_path = repo.workdir()?.join(&plan.changelog_path);
    changelog::rewrite(&changelog_path, &report, plan.header_lines)?;
    ui::display_success(&format!("Updated {}", plan.changelog_path.display()));

    repo.stage_path(&plan.changelog_path)?;
    let commit = repo.commit(&plan.commit_message)?;
    ui::display_success(&format!(
        "Committed '{}' ({})",
        plan.commit_message,
        &commit[..commit.len().min(7)]
    ));

    Ok(WorkflowResult {
        version,
        removed_fragments: fragments,
        removals_reset,
        commit: Some(commit),
    })
}
