//! Major-version module path migration
//!
//! When a release crosses a major version boundary at or above 1.0.0, the module identity
//! gains (or updates) its `/vN` suffix. The migrator walks a fixed sequence of states:
//!
//! ```text
//! Idle -> Triggered -> IdentityRewritten -> ReferencesRepaired -> LockRegenerated -> Staged -> Done
//! Idle -> Skipped
//! ```
//!
//! Any failing step aborts the run. Files already rewritten are left as they are; recovery is
//! a matter of discarding the working tree changes.

pub mod identity;
pub mod references;

pub use identity::{module_identity, normalize_locator, with_major_suffix};
pub use references::ReferenceRewriter;

use crate::config::MigrationConfig;
use crate::domain::version::requires_migration;
use crate::domain::Version;
use crate::error::{ReleaseBumpError, Result};
use crate::exec::{CommandRunner, Invocation};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::PathBuf;

const STEP_TRIGGER: &str = "trigger";
const STEP_IDENTITY: &str = "identity rewrite";
const STEP_REFERENCES: &str = "reference repair";
const STEP_LOCK: &str = "lock regeneration";
const STEP_STAGE: &str = "staging";

/// What a triggered migration does and which files it touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    pub from_major: u64,
    pub to_major: u64,
    /// New module identity, including the `/vN` suffix
    pub module_identity: String,
    /// Identity declared by the manifest before the rewrite
    pub previous_identity: Option<String>,
    /// Paths relative to the working directory
    pub affected_paths: BTreeSet<PathBuf>,
}

impl MigrationPlan {
    /// Plan for releasing `next` after `last`, or `None` when no migration is needed.
    pub fn for_release(
        last: &Version,
        next: &Version,
        repository_locator: &str,
        default_host: &str,
    ) -> Option<Self> {
        if !requires_migration(last, next) {
            return None;
        }

        Some(MigrationPlan {
            from_major: last.major,
            to_major: next.major,
            module_identity: module_identity(repository_locator, default_host, next.major),
            previous_identity: None,
            affected_paths: BTreeSet::new(),
        })
    }
}

/// Migrator states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    Idle,
    Triggered,
    IdentityRewritten,
    ReferencesRepaired,
    LockRegenerated,
    Staged,
    Done,
    Skipped,
}

impl MigrationState {
    pub fn name(&self) -> &'static str {
        match self {
            MigrationState::Idle => "idle",
            MigrationState::Triggered => "triggered",
            MigrationState::IdentityRewritten => "identity-rewritten",
            MigrationState::ReferencesRepaired => "references-repaired",
            MigrationState::LockRegenerated => "lock-regenerated",
            MigrationState::Staged => "staged",
            MigrationState::Done => "done",
            MigrationState::Skipped => "skipped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MigrationState::Done | MigrationState::Skipped)
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a migrator run that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No major boundary was crossed; nothing was touched
    Skipped,
    /// The module identity was migrated and the listed paths staged
    Migrated(MigrationPlan),
}

impl MigrationOutcome {
    pub fn plan(&self) -> Option<&MigrationPlan> {
        match self {
            MigrationOutcome::Skipped => None,
            MigrationOutcome::Migrated(plan) => Some(plan),
        }
    }

    pub fn affected_paths(&self) -> Vec<PathBuf> {
        self.plan()
            .map(|plan| plan.affected_paths.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Wraps non-migration errors with the name of the failing step
fn in_step(step: &'static str) -> impl Fn(ReleaseBumpError) -> ReleaseBumpError {
    move |err| {
        if err.is_migration() {
            err
        } else {
            ReleaseBumpError::migration(step, err.to_string())
        }
    }
}

/// Drives one module path migration in a working tree
pub struct ModulePathMigrator<R: CommandRunner> {
    runner: R,
    config: MigrationConfig,
    work_dir: PathBuf,
    state: MigrationState,
    history: Vec<MigrationState>,
}

impl<R: CommandRunner> ModulePathMigrator<R> {
    pub fn new(runner: R, config: MigrationConfig, work_dir: impl Into<PathBuf>) -> Self {
        ModulePathMigrator {
            runner,
            config,
            work_dir: work_dir.into(),
            state: MigrationState::Idle,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> MigrationState {
        self.state
    }

    /// States entered so far, in order
    pub fn history(&self) -> &[MigrationState] {
        &self.history
    }

    /// Run the migration for releasing `next` after `last`.
    ///
    /// A migrator runs once; a second call fails without doing anything.
    ///
    /// # Returns
    /// * `Ok(MigrationOutcome::Skipped)` - No major boundary crossed
    /// * `Ok(MigrationOutcome::Migrated(plan))` - Migration done, `plan.affected_paths` staged
    /// * `Err(ReleaseBumpError::Migration)` - A step failed; the state stays at the last
    ///   completed step
    pub fn run(
        &mut self,
        last: &Version,
        next: &Version,
        repository_locator: &str,
    ) -> Result<MigrationOutcome> {
        if self.state != MigrationState::Idle {
            return Err(ReleaseBumpError::migration(
                STEP_TRIGGER,
                format!("migrator already ran (state: {})", self.state),
            ));
        }

        let Some(mut plan) =
            MigrationPlan::for_release(last, next, repository_locator, &self.config.default_host)
        else {
            tracing::debug!(%last, %next, "no major boundary crossed, skipping migration");
            self.transition(MigrationState::Skipped);
            return Ok(MigrationOutcome::Skipped);
        };

        tracing::info!(
            from = plan.from_major,
            to = plan.to_major,
            module = %plan.module_identity,
            "major version boundary crossed, migrating module path"
        );
        self.transition(MigrationState::Triggered);

        self.rewrite_identity(&mut plan)
            .map_err(in_step(STEP_IDENTITY))?;
        self.transition(MigrationState::IdentityRewritten);

        self.repair_references(&mut plan)
            .map_err(in_step(STEP_REFERENCES))?;
        self.transition(MigrationState::ReferencesRepaired);

        self.regenerate_lock(&mut plan).map_err(in_step(STEP_LOCK))?;
        self.transition(MigrationState::LockRegenerated);

        self.stage(&plan).map_err(in_step(STEP_STAGE))?;
        self.transition(MigrationState::Staged);

        self.transition(MigrationState::Done);
        Ok(MigrationOutcome::Migrated(plan))
    }

    fn transition(&mut self, next: MigrationState) {
        tracing::debug!(from = %self.state, to = %next, "migration state change");
        self.state = next;
        self.history.push(next);
    }

    fn rewrite_identity(&self, plan: &mut MigrationPlan) -> Result<()> {
        let manifest = PathBuf::from(&self.config.manifest);
        let manifest_path = self.work_dir.join(&manifest);
        let content = fs::read_to_string(&manifest_path).map_err(|e| {
            ReleaseBumpError::migration(
                STEP_IDENTITY,
                format!("cannot read manifest {}: {}", manifest_path.display(), e),
            )
        })?;

        let previous = identity::declared_identity(&content).ok_or_else(|| {
            ReleaseBumpError::migration(
                STEP_IDENTITY,
                format!("{} declares no module identity", manifest.display()),
            )
        })?;

        if identity::strip_major_suffix(&previous)
            != identity::strip_major_suffix(&plan.module_identity)
        {
            tracing::warn!(
                declared = %previous,
                derived = %plan.module_identity,
                "declared module identity differs from the repository location"
            );
        }

        let invocation = Invocation::from_template(
            &self.config.rewrite_command,
            &[("module", plan.module_identity.as_str())],
        )?;
        self.runner.run(&invocation, &self.work_dir)?;

        plan.previous_identity = Some(previous);
        plan.affected_paths.insert(manifest);
        Ok(())
    }

    fn repair_references(&self, plan: &mut MigrationPlan) -> Result<()> {
        let Some(previous) = plan.previous_identity.as_deref() else {
            return Err(ReleaseBumpError::migration(
                STEP_REFERENCES,
                "previous module identity unknown",
            ));
        };

        let rewriter = ReferenceRewriter::new(previous, plan.module_identity.as_str())?;
        let touched = rewriter.repair_tree(&self.work_dir, &self.config.source_extensions)?;
        tracing::info!(files = touched.len(), "repaired module references");
        plan.affected_paths.extend(touched);

        if !self.config.repair_command.is_empty() {
            let invocation = Invocation::from_template(
                &self.config.repair_command,
                &[("module", plan.module_identity.as_str())],
            )?;
            let extensions = &self.config.source_extensions;
            let before = references::snapshot_sources(&self.work_dir, extensions)?;
            self.runner.run(&invocation, &self.work_dir)?;
            let after = references::snapshot_sources(&self.work_dir, extensions)?;

            let reformatted = references::changed_files(&before, &after);
            tracing::debug!(files = reformatted.len(), "files changed by the repair command");
            plan.affected_paths.extend(reformatted);
        }
        Ok(())
    }

    fn regenerate_lock(&self, plan: &mut MigrationPlan) -> Result<()> {
        let invocation = Invocation::from_template(
            &self.config.lock_command,
            &[("module", plan.module_identity.as_str())],
        )?;
        self.runner.run(&invocation, &self.work_dir)?;

        for lock_file in &self.config.lock_files {
            if self.work_dir.join(lock_file).exists() {
                plan.affected_paths.insert(PathBuf::from(lock_file));
            }
        }
        Ok(())
    }

    fn stage(&self, plan: &MigrationPlan) -> Result<()> {
        let invocation = Invocation::from_template(&self.config.stage_command, &[])?.args(
            plan.affected_paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned()),
        );
        self.runner.run(&invocation, &self.work_dir)
    }
}
