use crate::error::{ReleaseBumpError, Result};
use semver::Version;
use std::fmt;

/// Release impact of a commit or of a whole release window.
///
/// Variants are declared in severity order so the derived `Ord` gives
/// `None < Patch < Minor < Major`; combining impacts is a `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ReleaseImpact {
    /// No release
    #[default]
    None,
    /// Bug fixes and performance work
    Patch,
    /// New features, or breaking changes before 1.0.0
    Minor,
    /// Breaking changes from 1.0.0 on
    Major,
}

impl ReleaseImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseImpact::None => "none",
            ReleaseImpact::Patch => "patch",
            ReleaseImpact::Minor => "minor",
            ReleaseImpact::Major => "major",
        }
    }

    /// Apply the impact to a version.
    ///
    /// Returns `None` when there is nothing to release. Pre-release and build metadata of
    /// `version` are dropped. Fails when the bumped component would overflow.
    pub fn apply(&self, version: &Version) -> Result<Option<Version>> {
        let bump = |component: u64, name: &str| {
            component.checked_add(1).ok_or_else(|| {
                ReleaseBumpError::version(format!(
                    "cannot bump {} component of {}: out of range",
                    name, version
                ))
            })
        };

        let next = match self {
            ReleaseImpact::None => return Ok(None),
            ReleaseImpact::Patch => Version::new(
                version.major,
                version.minor,
                bump(version.patch, "patch")?,
            ),
            ReleaseImpact::Minor => Version::new(version.major, bump(version.minor, "minor")?, 0),
            ReleaseImpact::Major => Version::new(bump(version.major, "major")?, 0, 0),
        };
        Ok(Some(next))
    }
}

impl fmt::Display for ReleaseImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order() {
        assert!(ReleaseImpact::None < ReleaseImpact::Patch);
        assert!(ReleaseImpact::Patch < ReleaseImpact::Minor);
        assert!(ReleaseImpact::Minor < ReleaseImpact::Major);
        assert_eq!(
            ReleaseImpact::Patch.max(ReleaseImpact::Minor),
            ReleaseImpact::Minor
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ReleaseImpact::None.to_string(), "none");
        assert_eq!(ReleaseImpact::Major.to_string(), "major");
    }

    #[test]
    fn test_apply() {
        let v = Version::new(1, 2, 3);
        assert_eq!(ReleaseImpact::None.apply(&v).unwrap(), None);
        assert_eq!(
            ReleaseImpact::Patch.apply(&v).unwrap(),
            Some(Version::new(1, 2, 4))
        );
        assert_eq!(
            ReleaseImpact::Minor.apply(&v).unwrap(),
            Some(Version::new(1, 3, 0))
        );
        assert_eq!(
            ReleaseImpact::Major.apply(&v).unwrap(),
            Some(Version::new(2, 0, 0))
        );
    }

    #[test]
    fn test_apply_drops_prerelease() {
        let v = Version::parse("2.0.0-rc.1").unwrap();
        assert_eq!(
            ReleaseImpact::Patch.apply(&v).unwrap(),
            Some(Version::new(2, 0, 1))
        );
    }

    #[test]
    fn test_apply_overflow_is_an_error() {
        let v = Version::new(u64::MAX, u64::MAX, u64::MAX);
        for impact in [ReleaseImpact::Patch, ReleaseImpact::Minor, ReleaseImpact::Major] {
            let err = impact.apply(&v).unwrap_err();
            assert!(matches!(err, ReleaseBumpError::Version(_)), "{}", impact);
        }
        assert_eq!(ReleaseImpact::None.apply(&v).unwrap(), None);
    }
}
