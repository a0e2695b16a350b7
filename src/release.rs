//! Release pipeline
//!
//! Drives one release run over already gathered inputs:
//!
//! 1. Classify each commit and fold the batch into a [`ReleaseImpact`]
//! 2. Compute the next version with `semver`
//! 3. Run the module path migration when a major boundary is crossed
//! 4. Write the version artifact when one is configured
//! 5. Assemble the release asset list for the downstream release commit
//!
//! In dry-run mode steps 3 and 4 only report what they would do.

use crate::analyzer::{BumpAggregator, CommitClassifier};
use crate::artifact::write_version_artifact;
use crate::config::Config;
use crate::domain::version::{requires_migration, resolve_last_version, LastRelease};
use crate::domain::{CommitRecord, ReleaseImpact, Version};
use crate::error::{ReleaseBumpError, Result};
use crate::exec::CommandRunner;
use crate::migration::{MigrationOutcome, MigrationPlan, ModulePathMigrator};
use std::path::{Path, PathBuf};

/// Everything a release run needs from the repository
#[derive(Debug, Clone, Default)]
pub struct ReleaseInputs {
    pub commits: Vec<CommitRecord>,
    pub last_release: Option<LastRelease>,
    /// Repository locator the module identity is derived from
    pub repository_locator: Option<String>,
}

/// Result of the prepare step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preparation {
    /// Migration performed, or planned in dry-run mode
    pub migration: Option<MigrationPlan>,
    /// Version artifact written, or to be written in dry-run mode
    pub version_file: Option<PathBuf>,
}

impl Preparation {
    /// Paths the prepare step changed (or would change)
    pub fn touched_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .migration
            .iter()
            .flat_map(|plan| plan.affected_paths.iter().cloned())
            .collect();
        paths.extend(self.version_file.iter().cloned());
        paths
    }
}

/// Outcome of a whole release run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseReport {
    pub decision: ReleaseImpact,
    pub last_version: Version,
    /// `None` when the decision is `none`
    pub next_version: Option<Version>,
    pub preparation: Option<Preparation>,
    /// Paths the release commit includes, changelog first
    pub assets: Vec<PathBuf>,
    pub dry_run: bool,
}

impl ReleaseReport {
    pub fn migration(&self) -> Option<&MigrationPlan> {
        self.preparation.as_ref().and_then(|p| p.migration.as_ref())
    }
}

/// One release run against a working tree
pub struct ReleaseRun<'a, R: CommandRunner> {
    config: &'a Config,
    runner: R,
    work_dir: PathBuf,
    dry_run: bool,
}

impl<'a, R: CommandRunner> ReleaseRun<'a, R> {
    pub fn new(config: &'a Config, runner: R, work_dir: impl Into<PathBuf>) -> Self {
        ReleaseRun {
            config,
            runner,
            work_dir: work_dir.into(),
            dry_run: false,
        }
    }

    /// Report planned changes instead of making them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Release impact of `commits` after `last_version`
    pub fn analyze(&self, commits: Vec<CommitRecord>, last_version: &Version) -> ReleaseImpact {
        let classifier = CommitClassifier::from_config(&self.config.commits);
        let classified = classifier.classify_all(commits);

        let breaking = classified.iter().filter(|c| c.breaking).count();
        let decision = BumpAggregator::new(last_version.clone()).decide(&classified);
        tracing::info!(
            commits = classified.len(),
            breaking,
            %last_version,
            %decision,
            "analyzed commits"
        );
        decision
    }

    /// Migration check and version artifact for releasing `next` after `last`.
    ///
    /// # Returns
    /// * `Ok(Preparation)` - What was done (or would be done in dry-run mode)
    /// * `Err(ReleaseBumpError::Config)` - A migration is needed but no repository locator
    ///   is known
    /// * `Err(ReleaseBumpError::Migration)` - A migration step failed; no artifact is written
    pub fn prepare(
        &self,
        last: &Version,
        next: &Version,
        repository_locator: Option<&str>,
    ) -> Result<Preparation> {
        let migrating = requires_migration(last, next);
        let locator = match repository_locator {
            Some(locator) => locator,
            None if migrating => {
                return Err(ReleaseBumpError::config(format!(
                    "a repository URL is required to migrate the module path to v{}",
                    next.major
                )))
            }
            None => "",
        };

        let version_file = self.config.version_file_path();

        if self.dry_run {
            let migration = MigrationPlan::for_release(
                last,
                next,
                locator,
                &self.config.migration.default_host,
            );
            return Ok(Preparation {
                migration,
                version_file: version_file.map(Path::to_path_buf),
            });
        }

        let mut migrator = ModulePathMigrator::new(
            &self.runner,
            self.config.migration.clone(),
            self.work_dir.clone(),
        );
        let migration = match migrator.run(last, next, locator)? {
            MigrationOutcome::Skipped => None,
            MigrationOutcome::Migrated(plan) => Some(plan),
        };

        let version_file = write_version_artifact(
            version_file,
            next,
            &self.config.migration.stage_command,
            &self.runner,
            &self.work_dir,
        )?;

        Ok(Preparation {
            migration,
            version_file,
        })
    }

    /// Run the whole pipeline.
    pub fn execute(&self, inputs: ReleaseInputs) -> Result<ReleaseReport> {
        let last_version = resolve_last_version(inputs.last_release.as_ref())?;
        let decision = self.analyze(inputs.commits, &last_version);

        let Some(next_version) = decision.apply(&last_version)? else {
            tracing::info!("no release-worthy commits");
            return Ok(ReleaseReport {
                decision,
                last_version,
                next_version: None,
                preparation: None,
                assets: Vec::new(),
                dry_run: self.dry_run,
            });
        };

        let preparation = self.prepare(
            &last_version,
            &next_version,
            inputs.repository_locator.as_deref(),
        )?;
        let assets = self.release_assets(&preparation);

        Ok(ReleaseReport {
            decision,
            last_version,
            next_version: Some(next_version),
            preparation: Some(preparation),
            assets,
            dry_run: self.dry_run,
        })
    }

    fn release_assets(&self, preparation: &Preparation) -> Vec<PathBuf> {
        let mut assets = vec![PathBuf::from(&self.config.changelog_file)];
        for path in preparation.touched_paths() {
            if !assets.contains(&path) {
                assets.push(path);
            }
        }
        assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::RecordingRunner;
    use std::fs;
    use tempfile::TempDir;

    const LOCATOR: &str = "https://github.com/acme/widget";

    fn go_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("go.mod"), "module github.com/acme/widget\n").unwrap();
        fs::write(dir.path().join("go.sum"), "").unwrap();
        dir
    }

    fn inputs(commits: Vec<CommitRecord>, last: Option<&str>) -> ReleaseInputs {
        ReleaseInputs {
            commits,
            last_release: last.map(LastRelease::new),
            repository_locator: Some(LOCATOR.to_string()),
        }
    }

    #[test]
    fn test_empty_window_produces_nothing() {
        let dir = go_tree();
        let config = Config {
            version_file: Some("VERSION".to_string()),
            ..Config::default()
        };
        let runner = RecordingRunner::new();
        let run = ReleaseRun::new(&config, &runner, dir.path());

        let report = run.execute(inputs(Vec::new(), Some("1.2.0"))).unwrap();

        assert_eq!(report.decision, ReleaseImpact::None);
        assert_eq!(report.next_version, None);
        assert!(report.assets.is_empty());
        assert!(runner.calls().is_empty());
        assert!(!dir.path().join("VERSION").exists());
    }

    #[test]
    fn test_minor_release_without_migration() {
        let dir = go_tree();
        let config = Config {
            version_file: Some("VERSION".to_string()),
            ..Config::default()
        };
        let runner = RecordingRunner::new();
        let run = ReleaseRun::new(&config, &runner, dir.path());

        let report = run
            .execute(inputs(
                vec![CommitRecord::new("fix"), CommitRecord::new("feat")],
                Some("1.2.0"),
            ))
            .unwrap();

        assert_eq!(report.decision, ReleaseImpact::Minor);
        assert_eq!(report.next_version, Some(Version::new(1, 3, 0)));
        assert_eq!(report.migration(), None);
        assert_eq!(
            report.assets,
            vec![PathBuf::from("CHANGELOG.md"), PathBuf::from("VERSION")]
        );
        assert_eq!(runner.command_lines(), vec!["git add -- VERSION"]);
        assert_eq!(
            fs::read_to_string(dir.path().join("VERSION")).unwrap(),
            "1.3.0\n"
        );
    }

    #[test]
    fn test_breaking_change_before_one_is_minor() {
        let dir = go_tree();
        let config = Config::default();
        let runner = RecordingRunner::new();
        let run = ReleaseRun::new(&config, &runner, dir.path());

        let report = run
            .execute(inputs(vec![CommitRecord::new("feat").breaking()], Some("0.9.0")))
            .unwrap();

        assert_eq!(report.decision, ReleaseImpact::Minor);
        assert_eq!(report.next_version, Some(Version::new(0, 10, 0)));
        assert_eq!(report.migration(), None);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_first_release_defaults_to_zero() {
        let dir = go_tree();
        let config = Config::default();
        let runner = RecordingRunner::new();
        let run = ReleaseRun::new(&config, &runner, dir.path());

        let report = run.execute(inputs(vec![CommitRecord::new("fix")], None)).unwrap();

        assert_eq!(report.last_version, Version::new(0, 0, 0));
        assert_eq!(report.next_version, Some(Version::new(0, 0, 1)));
        assert_eq!(report.assets, vec![PathBuf::from("CHANGELOG.md")]);
    }

    #[test]
    fn test_major_release_migrates() {
        let dir = go_tree();
        let config = Config {
            version_file: Some("VERSION".to_string()),
            ..Config::default()
        };
        let runner = RecordingRunner::new();
        let run = ReleaseRun::new(&config, &runner, dir.path());

        let report = run
            .execute(inputs(
                vec![CommitRecord::new("refactor").with_note("BREAKING CHANGE: new api")],
                Some("2.3.1"),
            ))
            .unwrap();

        assert_eq!(report.decision, ReleaseImpact::Major);
        assert_eq!(report.next_version, Some(Version::new(3, 0, 0)));
        assert_eq!(
            report.migration().unwrap().module_identity,
            "github.com/acme/widget/v3"
        );
        assert_eq!(
            report.assets,
            vec![
                PathBuf::from("CHANGELOG.md"),
                PathBuf::from("go.mod"),
                PathBuf::from("go.sum"),
                PathBuf::from("VERSION"),
            ]
        );
        assert_eq!(
            runner.command_lines().first().map(String::as_str),
            Some("go mod edit -module github.com/acme/widget/v3")
        );
    }

    #[test]
    fn test_migration_failure_writes_no_artifact() {
        let dir = go_tree();
        let config = Config {
            version_file: Some("VERSION".to_string()),
            ..Config::default()
        };
        let runner = RecordingRunner::failing_on("tidy");
        let run = ReleaseRun::new(&config, &runner, dir.path());

        let err = run
            .execute(inputs(vec![CommitRecord::new("feat").breaking()], Some("1.0.0")))
            .unwrap_err();

        assert!(err.is_migration());
        assert!(!dir.path().join("VERSION").exists());
    }

    #[test]
    fn test_dry_run_has_no_side_effects() {
        let dir = go_tree();
        let config = Config {
            version_file: Some("VERSION".to_string()),
            ..Config::default()
        };
        let runner = RecordingRunner::new();
        let run = ReleaseRun::new(&config, &runner, dir.path()).dry_run(true);

        let report = run
            .execute(inputs(vec![CommitRecord::new("feat").breaking()], Some("1.4.0")))
            .unwrap();

        assert!(report.dry_run);
        let plan = report.migration().unwrap();
        assert_eq!(plan.from_major, 1);
        assert_eq!(plan.to_major, 2);
        assert_eq!(plan.module_identity, "github.com/acme/widget/v2");
        assert!(runner.calls().is_empty());
        assert!(!dir.path().join("VERSION").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("go.mod")).unwrap(),
            "module github.com/acme/widget\n"
        );
    }

    #[test]
    fn test_migration_needs_locator() {
        let dir = go_tree();
        let config = Config::default();
        let runner = RecordingRunner::new();
        let run = ReleaseRun::new(&config, &runner, dir.path());

        let err = run
            .prepare(&Version::new(1, 0, 0), &Version::new(2, 0, 0), None)
            .unwrap_err();

        assert!(matches!(err, ReleaseBumpError::Config(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_prepare_without_locator_when_not_migrating() {
        let dir = go_tree();
        let config = Config::default();
        let runner = RecordingRunner::new();
        let run = ReleaseRun::new(&config, &runner, dir.path());

        let preparation = run
            .prepare(&Version::new(1, 0, 0), &Version::new(1, 1, 0), None)
            .unwrap();

        assert_eq!(preparation.migration, None);
        assert_eq!(preparation.version_file, None);
        assert!(preparation.touched_paths().is_empty());
    }

    #[test]
    fn test_malformed_last_version_is_fatal() {
        let dir = go_tree();
        let config = Config::default();
        let runner = RecordingRunner::new();
        let run = ReleaseRun::new(&config, &runner, dir.path());

        let err = run
            .execute(inputs(vec![CommitRecord::new("feat")], Some("one.two")))
            .unwrap_err();

        assert!(matches!(err, ReleaseBumpError::Version(_)));
    }
}
