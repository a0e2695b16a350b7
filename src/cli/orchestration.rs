//! Workflow orchestration behind the `release-bump` subcommands
//!
//! Gathers the inputs of a release run from the repository and configuration, then hands
//! them to [`ReleaseRun`]. Kept apart from `main.rs` so the workflows can be driven with a
//! [`MockRepository`](crate::git::MockRepository) and a
//! [`RecordingRunner`](crate::exec::RecordingRunner) in tests.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::boundary::BoundaryWarning;
use crate::config::Config;
use crate::conventional::parse_commit;
use crate::domain::version::{parse_version, resolve_last_version, LastRelease};
use crate::domain::{BranchContext, CommitRecord, ReleaseImpact, ReleaseTag, TagPattern, Version};
use crate::error::ReleaseBumpError;
use crate::exec::{CommandRunner, Invocation};
use crate::git::{CommitInfo, Repository};
use crate::release::{Preparation, ReleaseInputs, ReleaseReport, ReleaseRun};

/// Options shared by the workflows
///
/// Mirrors the CLI flags without depending on clap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowArgs {
    /// Overrides the repository URL from configuration and remote
    pub repository_url: Option<String>,

    /// Overrides the version of the latest release tag
    pub last_version: Option<String>,

    /// Report planned changes without making them
    pub dry_run: bool,
}

/// Inputs of a release run as read from the repository
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    pub branch: BranchContext,
    pub latest_tag: Option<ReleaseTag>,
    pub last_release: Option<LastRelease>,
    pub commits: Vec<CommitInfo>,
    pub repository_locator: Option<String>,
    pub work_dir: PathBuf,
    pub warnings: Vec<BoundaryWarning>,
}

impl ReleaseContext {
    /// Parse the gathered commit messages into records
    pub fn commit_records(&self, config: &Config) -> Vec<CommitRecord> {
        self.commits
            .iter()
            .map(|info| parse_commit(&info.message, &config.commits).with_hash(&info.hash))
            .collect()
    }
}

/// Result of `analyze`
#[derive(Debug, Clone)]
pub struct AnalyzeResult {
    pub context: ReleaseContext,
    pub last_version: Version,
    pub decision: ReleaseImpact,
}

/// Result of `run`
#[derive(Debug, Clone)]
pub struct WorkflowResult {
    pub context: ReleaseContext,
    /// `None` when the branch is not a release branch
    pub report: Option<ReleaseReport>,
    /// Tag name the next version gets under the configured pattern
    pub next_tag: Option<String>,
}

/// Read branch, tags, commits and repository location.
///
/// Problems that do not stop a run are collected as warnings.
pub fn gather_context<R: Repository>(
    repo: &R,
    config: &Config,
    args: &WorkflowArgs,
) -> Result<ReleaseContext> {
    let mut warnings = Vec::new();

    let branch = BranchContext::new(repo.current_branch()?, &config.branches);
    if !branch.is_release_branch() {
        warnings.push(BoundaryWarning::NotReleaseBranch {
            branch: branch.name.clone(),
            release_branches: config.branches.clone(),
        });
    }

    let pattern = TagPattern::new(config.tag_pattern.as_str())?;
    let scan = pattern.scan(&repo.list_tags()?);
    warnings.extend(
        scan.unparsable
            .iter()
            .map(|tag| BoundaryWarning::UnparsableTag {
                tag: tag.clone(),
                reason: "version part is not a semantic version".to_string(),
            }),
    );

    let last_release = match &args.last_version {
        Some(version) => Some(LastRelease::new(version.as_str())),
        None => scan
            .latest
            .as_ref()
            .map(|tag| LastRelease::new(tag.version.to_string())),
    };

    let latest_name = scan.latest.as_ref().map(|tag| tag.name.as_str());
    let commits = repo
        .commits_since(latest_name)
        .context("Failed to read commits since the latest release")?;

    if commits.is_empty() {
        if let Some(head) = repo.head_hash()? {
            warnings.push(BoundaryWarning::NoNewCommits {
                latest_tag: latest_name.unwrap_or("(none)").to_string(),
                current_commit_hash: head,
            });
        }
    }

    let repository_locator = match args
        .repository_url
        .clone()
        .or_else(|| config.repository_url.clone())
    {
        Some(url) => Some(url),
        None => repo.remote_url(&config.remote)?,
    };
    if repository_locator.is_none() {
        warnings.push(BoundaryWarning::MissingRepositoryUrl {
            remote: config.remote.clone(),
        });
    }

    let work_dir = match repo.work_dir() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine working directory")?,
    };

    Ok(ReleaseContext {
        branch,
        latest_tag: scan.latest,
        last_release,
        commits,
        repository_locator,
        work_dir,
        warnings,
    })
}

/// Decide the release impact of the commits since the latest release
pub fn run_analyze<R: Repository>(
    repo: &R,
    config: &Config,
    args: &WorkflowArgs,
) -> Result<AnalyzeResult> {
    let context = gather_context(repo, config, args)?;
    let last_version = resolve_last_version(context.last_release.as_ref())?;

    let records = context.commit_records(config);
    // analysis never runs commands
    let run = ReleaseRun::new(config, NoCommands, context.work_dir.clone());
    let decision = run.analyze(records, &last_version);

    Ok(AnalyzeResult {
        context,
        last_version,
        decision,
    })
}

/// Run the migration check and the version artifact step for a known next version
pub fn run_prepare<R: Repository, C: CommandRunner>(
    repo: &R,
    config: &Config,
    runner: C,
    args: &WorkflowArgs,
    next_version: &str,
) -> Result<Preparation> {
    let context = gather_context(repo, config, args)?;
    let last = resolve_last_version(context.last_release.as_ref())?;
    let next = parse_version(next_version)?;

    let run = ReleaseRun::new(config, runner, context.work_dir.clone()).dry_run(args.dry_run);
    let preparation = run
        .prepare(&last, &next, context.repository_locator.as_deref())
        .with_context(|| format!("Failed to prepare release {}", next))?;
    Ok(preparation)
}

/// Run the whole release pipeline on the current branch
pub fn run_release<R: Repository, C: CommandRunner>(
    repo: &R,
    config: &Config,
    runner: C,
    args: &WorkflowArgs,
) -> Result<WorkflowResult> {
    let context = gather_context(repo, config, args)?;
    if !context.branch.is_release_branch() {
        return Ok(WorkflowResult {
            context,
            report: None,
            next_tag: None,
        });
    }

    let inputs = ReleaseInputs {
        commits: context.commit_records(config),
        last_release: context.last_release.clone(),
        repository_locator: context.repository_locator.clone(),
    };

    let run = ReleaseRun::new(config, runner, context.work_dir.clone()).dry_run(args.dry_run);
    let report = run.execute(inputs).context("Release run failed")?;

    let pattern = TagPattern::new(config.tag_pattern.as_str())?;
    let next_tag = report.next_version.as_ref().map(|v| pattern.format(v));

    Ok(WorkflowResult {
        context,
        report: Some(report),
        next_tag,
    })
}

/// Runner for workflows that must not run anything
struct NoCommands;

impl CommandRunner for NoCommands {
    fn run(&self, invocation: &Invocation, _work_dir: &Path) -> crate::error::Result<()> {
        Err(ReleaseBumpError::command(format!(
            "unexpected command during analysis: {}",
            invocation
        )))
    }
}
