//! Terminal output for the changelog update.

use crate::boundary::BoundaryWarning;
use crate::domain::ReleasePlan;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("\x1b[31mERROR:\x1b[0m {}", message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("\x1b[32m✓\x1b[0m {}", message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("\x1b[33m→\x1b[0m {}", message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("\x1b[33m⚠ WARNING:\x1b[0m {}", warning);
}

/// Lines describing what a run would do, shared by the dry run and the log.
pub fn format_plan(plan: &ReleasePlan, report_command: &str) -> Vec<String> {
    vec![
        format!("Release version:   {}", plan.version),
        format!("Previous minor:    {}", plan.previous_line),
        format!("Fetch remote:      {}", plan.remote),
        format!("Fragment range:    {}", plan.fragment_range),
        format!("Fragment pattern:  {}", plan.fragment_pattern.as_str()),
        format!("Report command:    {}", report_command),
        format!(
            "Changelog:         {} (drop first {} line(s))",
            plan.changelog_path.display(),
            plan.header_lines
        ),
        format!("Commit message:    {}", plan.commit_message),
    ]
}

/// Display the full plan of a run.
pub fn display_plan(plan: &ReleasePlan, report_command: &str) {
    println!("\n\x1b[1mChangelog update plan:\x1b[0m");
    for line in format_plan(plan, report_command) {
        println!("  {}", line);
    }
}
