use crate::error::{ReleaseBumpError, Result};

pub use semver::Version;

/// First version to which breaking changes bump the major component.
pub const FIRST_STABLE: Version = Version::new(1, 0, 0);

/// The previous release as reported by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastRelease {
    pub version: String,
}

impl LastRelease {
    pub fn new(version: impl Into<String>) -> Self {
        LastRelease {
            version: version.into(),
        }
    }
}

/// Parse version text (e.g., "1.2.3" or "v1.2.3")
///
/// A leading `v`/`V` is accepted; anything else must be a well-formed semantic version.
pub fn parse_version(text: &str) -> Result<Version> {
    let trimmed = text.trim();
    let clean = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);

    Version::parse(clean).map_err(|e| {
        ReleaseBumpError::version(format!("'{}' is not a semantic version: {}", text, e))
    })
}

/// Resolve the last released version, defaulting to `0.0.0` when there is none.
///
/// A missing release is not an error; a present but malformed one is.
pub fn resolve_last_version(last_release: Option<&LastRelease>) -> Result<Version> {
    match last_release {
        Some(release) => parse_version(&release.version),
        None => Ok(Version::new(0, 0, 0)),
    }
}

/// Whether `version` is past initial development (`>= 1.0.0`)
pub fn is_stable(version: &Version) -> bool {
    *version >= FIRST_STABLE
}

/// Whether releasing `next` after `last` crosses a major boundary that needs a module path
/// migration.
pub fn requires_migration(last: &Version, next: &Version) -> bool {
    is_stable(last) && next.major > last.major
}
