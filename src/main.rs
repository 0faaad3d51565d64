use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use update_changelog::cli::{run_update_workflow, UpdateWorkflowArgs};
use update_changelog::config;
use update_changelog::domain::ReleaseVersion;
use update_changelog::git::{Git2Repository, Repository};
use update_changelog::report::ReportCommand;
use update_changelog::ui;
use update_changelog::UpdateChangelogError;

#[derive(clap::Parser)]
#[command(
    name = "update-changelog",
    version,
    about = "Regenerate the changelog from release notes and commit it for a new minor release"
)]
struct Args {
    #[arg(help = "Version being released, e.g. 7.2.0")]
    new_version: String,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Check the tag and print the plan without changing anything")]
    dry_run: bool,

    #[arg(
        long,
        help = "Commit the removed release-note fragments instead of resetting them away"
    )]
    keep_fragment_removal: bool,

    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        ui::display_error(&format!("{:#}", e));
        let code = e
            .downcast_ref::<UpdateChangelogError>()
            .map_or(1, UpdateChangelogError::exit_code);
        std::process::exit(code);
    }
}

fn run(args: &Args) -> Result<()> {
    // Malformed versions stop before any config or repository access
    ReleaseVersion::parse(&args.new_version)?;

    let config = config::load_config(args.config.as_deref())?;

    let repo = Git2Repository::open(".").context("Not in a git repository")?;
    let generator = ReportCommand::new(&config.report.program, repo.workdir()?);

    let workflow_args = UpdateWorkflowArgs {
        new_version: args.new_version.clone(),
        dry_run: args.dry_run,
        keep_fragment_removal: args.keep_fragment_removal,
    };

    let result = run_update_workflow(&workflow_args, &config, &repo, &generator)?;

    if result.commit.is_some() {
        println!(
            "\n\x1b[32m✓\x1b[0m CHANGELOG updated for {}\n",
            result.version
        );
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
