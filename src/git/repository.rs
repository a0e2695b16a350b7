use crate::error::{ReleaseBumpError, Result};
use crate::git::CommitInfo;
use git2::{ErrorCode, Oid, Repository as Git2Repo};
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn head_oid(&self) -> Result<Option<Oid>> {
        match self.repo.head() {
            Ok(head) => Ok(head.target()),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn tag_commit_oid(&self, tag_name: &str) -> Result<Oid> {
        let reference_name = format!("refs/tags/{}", tag_name);

        let reference = self.repo.find_reference(&reference_name).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                ReleaseBumpError::repository(format!("Tag '{}' does not exist", tag_name))
            } else {
                e.into()
            }
        })?;

        let commit = reference.peel_to_commit().map_err(|e| {
            ReleaseBumpError::repository(format!(
                "Tag '{}' does not point to a commit: {}",
                tag_name, e
            ))
        })?;

        Ok(commit.id())
    }
}

impl super::Repository for Git2Repository {
    fn current_branch(&self) -> Result<String> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().unwrap_or("HEAD").to_string()),
            Ok(_) => Ok("HEAD".to_string()),
            // a fresh repository: HEAD names a branch without commits
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                Ok(head
                    .symbolic_target()
                    .and_then(|target| target.strip_prefix("refs/heads/"))
                    .unwrap_or("HEAD")
                    .to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn head_hash(&self) -> Result<Option<String>> {
        Ok(self.head_oid()?.map(|oid| oid.to_string()))
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn commits_since(&self, tag: Option<&str>) -> Result<Vec<CommitInfo>> {
        let Some(head) = self.head_oid()? else {
            return Ok(Vec::new());
        };

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL)?;
        revwalk.push(head)?;

        if let Some(tag) = tag {
            revwalk.hide(self.tag_commit_oid(tag)?)?;
        }

        let mut commits = Vec::new();

        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;

            commits.push(CommitInfo {
                hash: oid.to_string(),
                message: commit.message().unwrap_or("").to_string(),
                author: commit.author().name().unwrap_or("unknown").to_string(),
            });
        }

        commits.reverse();
        tracing::debug!(count = commits.len(), since = ?tag, "collected commits");
        Ok(commits)
    }

    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        match self.repo.find_remote(remote) {
            Ok(found) => Ok(found.url().map(str::to_string)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn work_dir(&self) -> Option<PathBuf> {
        self.repo.workdir().map(Path::to_path_buf)
    }
}
