use std::fmt;

/// Non-fatal conditions met while gathering the inputs of a release run.
/// These are reported to the user; the run carries on where it can.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No new commits since the latest release tag
    NoNewCommits {
        latest_tag: String,
        current_commit_hash: String,
    },
    /// Tag matches the release pattern but its version part is not a semantic version
    UnparsableTag { tag: String, reason: String },
    /// The checked out branch is not configured for releases
    NotReleaseBranch {
        branch: String,
        release_branches: Vec<String>,
    },
    /// No repository URL configured and the remote has none
    MissingRepositoryUrl { remote: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoNewCommits {
                latest_tag,
                current_commit_hash,
            } => {
                let short_hash = current_commit_hash
                    .get(..7)
                    .unwrap_or(current_commit_hash.as_str());
                write!(
                    f,
                    "No new commits since tag '{}' (current: {})",
                    latest_tag, short_hash
                )
            }
            BoundaryWarning::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            BoundaryWarning::NotReleaseBranch {
                branch,
                release_branches,
            } => {
                write!(
                    f,
                    "Branch '{}' is not a release branch (configured: {})",
                    branch,
                    release_branches.join(", ")
                )
            }
            BoundaryWarning::MissingRepositoryUrl { remote } => {
                write!(
                    f,
                    "No repository URL configured and remote '{}' has none",
                    remote
                )
            }
        }
    }
}
