//! Repository access
//!
//! The release pipeline only reads from git: the current branch, the tags, the commit messages
//! since the latest release tag and the remote URL used to derive the module identity.
//!
//! - [repository::Git2Repository]: real implementation using the `git2` crate
//! - [mock::MockRepository]: in-memory implementation for tests
//!
//! ```rust
//! # use release_bump::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> release_bump::Result<()> {
//! let tags = repo.list_tags()?;
//! let commits = repo.commits_since(tags.first().map(String::as_str))?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::PathBuf;

/// Commit information for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// Full commit hash
    pub hash: String,
    /// Raw commit message
    pub message: String,
    /// Commit author name
    pub author: String,
}

impl CommitInfo {
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }
}

/// Read-only repository operations needed by a release run
pub trait Repository {
    /// Name of the checked out branch, or `HEAD` when detached
    fn current_branch(&self) -> Result<String>;

    /// Hash of the commit HEAD points to, `None` in a repository without commits
    fn head_hash(&self) -> Result<Option<String>>;

    /// All tag names in the repository
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Commits reachable from HEAD but not from `tag`, oldest first.
    ///
    /// With `tag` set to `None` the whole history of HEAD is returned.
    ///
    /// # Returns
    /// * `Ok(Vec<CommitInfo>)` - Commits in chronological order
    /// * `Err` - If the tag does not exist or a git error occurs
    fn commits_since(&self, tag: Option<&str>) -> Result<Vec<CommitInfo>>;

    /// URL configured for `remote`, `None` when the remote does not exist
    fn remote_url(&self, remote: &str) -> Result<Option<String>>;

    /// Root of the working tree, `None` for bare repositories
    fn work_dir(&self) -> Option<PathBuf>;
}
