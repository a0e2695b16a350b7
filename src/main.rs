use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use release_bump::boundary::BoundaryWarning;
use release_bump::cli::{self, ReleaseContext, WorkflowArgs};
use release_bump::config::{self, Config};
use release_bump::exec::SystemRunner;
use release_bump::git::Git2Repository;
use release_bump::ui;

#[derive(clap::Parser)]
#[command(
    name = "release-bump",
    version,
    about = "Decide the next semantic version from conventional commits and migrate the module path across major versions"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Repository URL the module identity is derived from"
    )]
    repository_url: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Version of the last release, instead of the latest tag"
    )]
    last_version: Option<String>,

    #[arg(short, long, global = true, help = "Print debug diagnostics")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the release impact (none, patch, minor, major) of the commits since the last release
    Analyze,

    /// Migrate the module path if needed and write the version file
    Prepare {
        #[arg(long, help = "Version being released")]
        next_version: String,

        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,
    },

    /// Run the whole release pipeline
    Run {
        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "release_bump=debug" } else { "warn" };
    let filter = if verbose {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_level))
            .unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;

    let repo = Git2Repository::open(".")?;
    let mut workflow = WorkflowArgs {
        repository_url: args.repository_url,
        last_version: args.last_version,
        dry_run: false,
    };

    match args.command {
        Command::Analyze => {
            let result = cli::run_analyze(&repo, &config, &workflow)?;
            report_warnings(&result.context);
            if args.verbose {
                ui::display_commit_analysis(&result.context.commits, &result.context.branch.name);
            }
            println!("{}", result.decision);
        }
        Command::Prepare {
            next_version,
            dry_run,
        } => {
            workflow.dry_run = dry_run;
            let preparation =
                cli::run_prepare(&repo, &config, SystemRunner, &workflow, &next_version)?;
            ui::display_preparation(&preparation, dry_run);
        }
        Command::Run { dry_run } => {
            workflow.dry_run = dry_run;
            run_pipeline(&repo, &config, &workflow)?;
        }
    }

    Ok(())
}

fn run_pipeline(repo: &Git2Repository, config: &Config, workflow: &WorkflowArgs) -> Result<()> {
    if workflow.dry_run {
        ui::display_status("Dry run: computing the release without changing files");
    }

    let result = cli::run_release(repo, config, SystemRunner, workflow)?;
    report_warnings(&result.context);

    let Some(report) = result.report else {
        ui::display_status("Not on a release branch, nothing to do");
        return Ok(());
    };

    ui::display_commit_analysis(&result.context.commits, &result.context.branch.name);
    println!();
    ui::display_report(&report);
    if let Some(tag) = &result.next_tag {
        ui::display_status(&format!("Release tag: {}", tag));
    }
    Ok(())
}

fn report_warnings(context: &ReleaseContext) {
    for warning in &context.warnings {
        // a missing URL only matters when a migration needs it
        if matches!(warning, BoundaryWarning::MissingRepositoryUrl { .. }) {
            tracing::debug!(%warning, "boundary warning");
            continue;
        }
        ui::display_boundary_warning(warning);
    }
}
