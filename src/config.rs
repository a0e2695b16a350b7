use crate::error::{ReleaseBumpError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Name of the per-repository configuration file.
pub const CONFIG_FILE_NAME: &str = "releasebump.toml";

/// Represents the complete configuration for release-bump.
///
/// Contains release branches, tag naming, release assets, commit classification settings
/// and the commands used by the module path migration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_branches")]
    pub branches: Vec<String>,

    #[serde(default = "default_tag_pattern")]
    pub tag_pattern: String,

    #[serde(default = "default_changelog_file")]
    pub changelog_file: String,

    /// Plain-text file receiving the next version. Absent means no artifact is written.
    #[serde(default)]
    pub version_file: Option<String>,

    /// Canonical repository location. Falls back to the URL of `remote` when absent.
    #[serde(default)]
    pub repository_url: Option<String>,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub commits: CommitsConfig,

    #[serde(default)]
    pub migration: MigrationConfig,
}

fn default_branches() -> Vec<String> {
    vec!["main".to_string()]
}

fn default_tag_pattern() -> String {
    "v{version}".to_string()
}

fn default_changelog_file() -> String {
    "CHANGELOG.md".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Returns the default breaking change marker phrases.
fn default_breaking_markers() -> Vec<String> {
    vec!["BREAKING CHANGE".to_string(), "BREAKING CHANGES".to_string()]
}

/// Returns the commit types that always count as breaking.
fn default_breaking_types() -> Vec<String> {
    vec!["break".to_string()]
}

/// Configuration for commit classification.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitsConfig {
    /// Phrases that mark a note as a breaking change (matched case-insensitively)
    #[serde(default = "default_breaking_markers")]
    pub breaking_markers: Vec<String>,

    /// Commit types the parser flags as explicitly breaking
    #[serde(default = "default_breaking_types")]
    pub breaking_types: Vec<String>,
}

impl Default for CommitsConfig {
    fn default() -> Self {
        CommitsConfig {
            breaking_markers: default_breaking_markers(),
            breaking_types: default_breaking_types(),
        }
    }
}

fn default_manifest() -> String {
    "go.mod".to_string()
}

fn default_lock_files() -> Vec<String> {
    vec!["go.sum".to_string()]
}

fn default_source_extensions() -> Vec<String> {
    vec!["go".to_string()]
}

fn default_host() -> String {
    "github.com".to_string()
}

fn default_rewrite_command() -> Vec<String> {
    ["go", "mod", "edit", "-module", "{module}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_repair_command() -> Vec<String> {
    ["goimports", "-w", "."].iter().map(|s| s.to_string()).collect()
}

fn default_lock_command() -> Vec<String> {
    ["go", "mod", "tidy"].iter().map(|s| s.to_string()).collect()
}

fn default_stage_command() -> Vec<String> {
    ["git", "add", "--"].iter().map(|s| s.to_string()).collect()
}

/// Configuration for the major-version module path migration.
///
/// Commands are given as argument vectors. `{module}` in the rewrite command is replaced by
/// the new module identity; the stage command receives the affected paths as trailing arguments.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MigrationConfig {
    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default = "default_lock_files")]
    pub lock_files: Vec<String>,

    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,

    /// Host prefixed to repository locators that do not name one (e.g. `owner/repo`)
    #[serde(default = "default_host")]
    pub default_host: String,

    #[serde(default = "default_rewrite_command")]
    pub rewrite_command: Vec<String>,

    /// Optional post-repair tool; an empty list disables it
    #[serde(default = "default_repair_command")]
    pub repair_command: Vec<String>,

    #[serde(default = "default_lock_command")]
    pub lock_command: Vec<String>,

    #[serde(default = "default_stage_command")]
    pub stage_command: Vec<String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        MigrationConfig {
            manifest: default_manifest(),
            lock_files: default_lock_files(),
            source_extensions: default_source_extensions(),
            default_host: default_host(),
            rewrite_command: default_rewrite_command(),
            repair_command: default_repair_command(),
            lock_command: default_lock_command(),
            stage_command: default_stage_command(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            branches: default_branches(),
            tag_pattern: default_tag_pattern(),
            changelog_file: default_changelog_file(),
            version_file: None,
            repository_url: None,
            remote: default_remote(),
            commits: CommitsConfig::default(),
            migration: MigrationConfig::default(),
        }
    }
}

impl Config {
    /// Checks the shape of every recognized option.
    ///
    /// Runs before any commit is classified so that a bad option aborts the run early.
    pub fn validate(&self) -> Result<()> {
        if self.branches.is_empty() {
            return Err(ReleaseBumpError::config(
                "at least one release branch must be configured",
            ));
        }

        if self.tag_pattern.matches("{version}").count() != 1 {
            return Err(ReleaseBumpError::config(format!(
                "tag_pattern '{}' must contain exactly one {{version}} placeholder",
                self.tag_pattern
            )));
        }

        validate_file_path("changelog_file", &self.changelog_file)?;
        if let Some(version_file) = &self.version_file {
            validate_file_path("version_file", version_file)?;
        }

        if self.commits.breaking_markers.is_empty()
            || self
                .commits
                .breaking_markers
                .iter()
                .any(|m| m.trim().is_empty())
        {
            return Err(ReleaseBumpError::config(
                "commits.breaking_markers must contain at least one non-empty phrase",
            ));
        }

        let migration = &self.migration;
        validate_file_path("migration.manifest", &migration.manifest)?;
        for lock_file in &migration.lock_files {
            validate_file_path("migration.lock_files", lock_file)?;
        }
        if migration.default_host.trim().is_empty() {
            return Err(ReleaseBumpError::config(
                "migration.default_host must not be empty",
            ));
        }

        validate_command("migration.rewrite_command", &migration.rewrite_command)?;
        validate_command("migration.lock_command", &migration.lock_command)?;
        validate_command("migration.stage_command", &migration.stage_command)?;
        if !migration.repair_command.is_empty() {
            validate_command("migration.repair_command", &migration.repair_command)?;
        }

        if !migration
            .rewrite_command
            .iter()
            .any(|arg| arg.contains("{module}"))
        {
            return Err(ReleaseBumpError::config(
                "migration.rewrite_command must reference the {module} placeholder",
            ));
        }

        Ok(())
    }

    /// Path of the version artifact, if one is configured.
    pub fn version_file_path(&self) -> Option<&Path> {
        self.version_file.as_deref().map(Path::new)
    }
}

fn validate_file_path(option: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ReleaseBumpError::config(format!(
            "{} must not be empty",
            option
        )));
    }
    if value.contains('\0') {
        return Err(ReleaseBumpError::config(format!(
            "{} contains a NUL byte",
            option
        )));
    }
    if value.ends_with('/') || value.ends_with('\\') {
        return Err(ReleaseBumpError::config(format!(
            "{} '{}' must name a file, not a directory",
            option, value
        )));
    }
    Ok(())
}

fn validate_command(option: &str, command: &[String]) -> Result<()> {
    match command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(ReleaseBumpError::config(format!(
            "{} must name a program to run",
            option
        ))),
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `releasebump.toml` in current directory
/// 3. `.releasebump.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// The loaded configuration is validated before it is returned.
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);

    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path).map_err(|e| {
            ReleaseBumpError::config(format!("cannot read config file '{}': {}", path, e))
        })?
    } else if local.exists() {
        fs::read_to_string(&local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if user_config.exists() {
            fs::read_to_string(user_config)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config = parse_config(&config_str)?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

/// Parses and validates configuration text.
pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str)
        .map_err(|e| ReleaseBumpError::config(format!("invalid configuration: {}", e)))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_default_markers() {
        let config = Config::default();
        assert_eq!(
            config.commits.breaking_markers,
            vec!["BREAKING CHANGE".to_string(), "BREAKING CHANGES".to_string()]
        );
        assert!(config.version_file.is_none());
        assert_eq!(config.changelog_file, "CHANGELOG.md");
    }

    #[test]
    fn test_empty_version_file_rejected() {
        let config = Config {
            version_file: Some("  ".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ReleaseBumpError::Config(_))
        ));
    }

    #[test]
    fn test_directory_like_version_file_rejected() {
        let config = Config {
            version_file: Some("dist/".to_string()),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must name a file"));
    }

    #[test]
    fn test_tag_pattern_needs_single_placeholder() {
        let config = Config {
            tag_pattern: "release".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            tag_pattern: "{version}-{version}".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rewrite_command_requires_module_placeholder() {
        let mut config = Config::default();
        config.migration.rewrite_command = vec!["go".to_string(), "mod".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("{module}"));
    }

    #[test]
    fn test_empty_repair_command_allowed() {
        let mut config = Config::default();
        config.migration.repair_command.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_lock_command_rejected() {
        let mut config = Config::default();
        config.migration.lock_command.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_marker_rejected() {
        let mut config = Config::default();
        config.commits.breaking_markers = vec!["".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = parse_config(
            r#"
version_file = "VERSION"

[commits]
breaking_markers = ["BREAKING"]
"#,
        )
        .unwrap();
        assert_eq!(config.version_file_path(), Some(Path::new("VERSION")));
        assert_eq!(config.commits.breaking_markers, vec!["BREAKING".to_string()]);
        assert_eq!(config.commits.breaking_types, vec!["break".to_string()]);
        assert_eq!(config.migration, MigrationConfig::default());
    }

    #[test]
    fn test_parse_invalid_toml() {
        let err = parse_config("branches = [").unwrap_err();
        assert!(matches!(err, ReleaseBumpError::Config(_)));
    }
}
