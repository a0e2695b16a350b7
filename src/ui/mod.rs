//! Terminal output.
//!
//! - `formatter` - Pure formatting functions
//! - This module - Styling (via `console`) and printing
//!
//! Status lines go to stdout, errors and warnings to stderr. Diagnostics are not printed here;
//! they go through `tracing`.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::git::CommitInfo;
use crate::release::{Preparation, ReleaseReport};

pub mod formatter;

pub use formatter::{format_assets, format_commit_line, format_decision, format_migration_plan};

const LISTED_COMMITS: usize = 10;

/// Print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Print a success message with a green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print a status message with a yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a boundary warning.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow().bold(), warning);
}

/// Show the commits being analyzed on `branch_name`.
///
/// At most ten commits are listed; the rest are counted.
pub fn display_commit_analysis(commits: &[CommitInfo], branch_name: &str) {
    println!(
        "\n{}",
        style(format!("Analyzing commits on branch '{}'", branch_name)).bold()
    );
    println!(
        "{}",
        style(format!("{} commits since last release:", commits.len())).underlined()
    );

    for (i, commit) in commits.iter().take(LISTED_COMMITS).enumerate() {
        println!("{}", format_commit_line(i, commit));
    }

    if commits.len() > LISTED_COMMITS {
        println!("  ... and {} more commits", commits.len() - LISTED_COMMITS);
    }
}

/// Show what the prepare step did (or would do).
pub fn display_preparation(preparation: &Preparation, dry_run: bool) {
    match &preparation.migration {
        Some(plan) => {
            let mut lines = format_migration_plan(plan).into_iter();
            if let Some(title) = lines.next() {
                println!("\n{}", style(title).bold());
            }
            for line in lines {
                println!("{}", line);
            }
        }
        None => display_status("No module path migration needed"),
    }

    if let Some(path) = &preparation.version_file {
        let verb = if dry_run { "Would write" } else { "Wrote" };
        display_success(&format!("{} version file {}", verb, path.display()));
    }
}

/// Show the report of a whole release run.
pub fn display_report(report: &ReleaseReport) {
    let summary = format_decision(
        report.decision,
        &report.last_version,
        report.next_version.as_ref(),
    );
    if report.next_version.is_some() {
        display_success(&summary);
    } else {
        display_status(&summary);
    }

    if let Some(preparation) = &report.preparation {
        display_preparation(preparation, report.dry_run);
    }

    if !report.assets.is_empty() {
        println!("\n{}", style("Release assets:").bold());
        for line in format_assets(&report.assets) {
            println!("{}", line);
        }
    }

    if report.dry_run {
        println!("\n{}", style("Dry run: no files were changed").cyan());
    }
}
