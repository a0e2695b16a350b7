//! Pure formatting functions for UI output.
//!
//! Everything here returns plain strings so it can be tested; styling and printing happen in
//! the parent module.

use crate::domain::{ReleaseImpact, Version};
use crate::git::CommitInfo;
use crate::migration::MigrationPlan;
use std::path::PathBuf;

const SUBJECT_WIDTH: usize = 60;

/// First line of a commit message, cut to a fixed width
pub fn commit_subject(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("").trim();
    if first_line.chars().count() > SUBJECT_WIDTH {
        let cut: String = first_line.chars().take(SUBJECT_WIDTH - 3).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}

/// Numbered line for the commit listing
pub fn format_commit_line(index: usize, commit: &CommitInfo) -> String {
    format!(
        "  {}. {} {}",
        index + 1,
        commit.short_hash(),
        commit_subject(&commit.message)
    )
}

/// One-line summary of a release decision
pub fn format_decision(
    decision: ReleaseImpact,
    last_version: &Version,
    next_version: Option<&Version>,
) -> String {
    match next_version {
        Some(next) => format!("{} release: {} -> {}", decision, last_version, next),
        None => format!("no release after {}", last_version),
    }
}

/// Lines describing a migration plan
pub fn format_migration_plan(plan: &MigrationPlan) -> Vec<String> {
    let mut lines = vec![format!(
        "Module path migration v{} -> v{}",
        plan.from_major, plan.to_major
    )];

    if let Some(previous) = &plan.previous_identity {
        lines.push(format!("  From: {}", previous));
    }
    lines.push(format!("  To:   {}", plan.module_identity));

    for path in &plan.affected_paths {
        lines.push(format!("  - {}", path.display()));
    }
    lines
}

/// Lines listing release assets
pub fn format_assets(assets: &[PathBuf]) -> Vec<String> {
    assets
        .iter()
        .map(|path| format!("  - {}", path.display()))
        .collect()
}
