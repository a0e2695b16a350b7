use crate::domain::version::is_stable;
use crate::domain::{ClassifiedCommit, ReleaseImpact, Version};

/// Release impact of a single classified commit.
///
/// Breaking changes are capped at `Minor` during initial development (`< 1.0.0`).
pub fn severity(commit: &ClassifiedCommit, last_version: &Version) -> ReleaseImpact {
    if commit.breaking {
        return if is_stable(last_version) {
            ReleaseImpact::Major
        } else {
            ReleaseImpact::Minor
        };
    }

    match commit.commit_type() {
        "fix" | "perf" => ReleaseImpact::Patch,
        "feat" => ReleaseImpact::Minor,
        _ => ReleaseImpact::None,
    }
}

/// Folds the commits of a release window into one release decision
#[derive(Debug, Clone)]
pub struct BumpAggregator {
    last_version: Version,
}

impl BumpAggregator {
    pub fn new(last_version: Version) -> Self {
        BumpAggregator { last_version }
    }

    /// Maximum severity over `commits`, `None` for an empty window.
    ///
    /// The result does not depend on commit order.
    pub fn decide<'a>(
        &self,
        commits: impl IntoIterator<Item = &'a ClassifiedCommit>,
    ) -> ReleaseImpact {
        commits
            .into_iter()
            .map(|commit| severity(commit, &self.last_version))
            .max()
            .unwrap_or(ReleaseImpact::None)
    }
}
