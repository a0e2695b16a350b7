use crate::error::{ReleaseBumpError, Result};
use crate::git::{CommitInfo, Repository};
use std::collections::HashMap;
use std::path::PathBuf;

/// Mock repository for testing without actual git operations
///
/// History is linear: commits are appended in order and a tag marks the commit that was the
/// newest when it was added.
#[derive(Debug, Clone)]
pub struct MockRepository {
    branch: String,
    commits: Vec<CommitInfo>,
    tags: HashMap<String, usize>,
    remotes: HashMap<String, String>,
    work_dir: Option<PathBuf>,
}

impl MockRepository {
    /// Create an empty repository on `main`
    pub fn new() -> Self {
        MockRepository {
            branch: "main".to_string(),
            commits: Vec::new(),
            tags: HashMap::new(),
            remotes: HashMap::new(),
            work_dir: None,
        }
    }

    pub fn set_branch(&mut self, branch: impl Into<String>) {
        self.branch = branch.into();
    }

    /// Append a commit with the given message
    pub fn add_commit(&mut self, message: impl Into<String>) {
        let index = self.commits.len();
        self.commits.push(CommitInfo {
            hash: format!("{:040x}", index + 1),
            message: message.into(),
            author: "Mock Author".to_string(),
        });
    }

    /// Tag the newest commit
    pub fn add_tag(&mut self, name: impl Into<String>) {
        let position = self.commits.len().saturating_sub(1);
        self.tags.insert(name.into(), position);
    }

    pub fn set_remote(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.remotes.insert(name.into(), url.into());
    }

    pub fn set_work_dir(&mut self, path: impl Into<PathBuf>) {
        self.work_dir = Some(path.into());
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn head_hash(&self) -> Result<Option<String>> {
        Ok(self.commits.last().map(|c| c.hash.clone()))
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let mut tags: Vec<String> = self.tags.keys().cloned().collect();
        tags.sort();
        Ok(tags)
    }

    fn commits_since(&self, tag: Option<&str>) -> Result<Vec<CommitInfo>> {
        let start = match tag {
            Some(name) => {
                let position = self.tags.get(name).ok_or_else(|| {
                    ReleaseBumpError::repository(format!("Tag '{}' does not exist", name))
                })?;
                position + 1
            }
            None => 0,
        };

        Ok(self.commits.get(start..).unwrap_or_default().to_vec())
    }

    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        Ok(self.remotes.get(remote).cloned())
    }

    fn work_dir(&self) -> Option<PathBuf> {
        self.work_dir.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_commits_since_tag() {
        let mut repo = MockRepository::new();
        repo.add_commit("feat: first");
        repo.add_tag("v1.0.0");
        repo.add_commit("fix: second");
        repo.add_commit("feat: third");

        let commits = repo.commits_since(Some("v1.0.0")).unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].message, "fix: second");
        assert_eq!(repo.commits_since(None).unwrap().len(), 3);
    }

    #[test]
    fn test_mock_repository_tag_at_head() {
        let mut repo = MockRepository::new();
        repo.add_commit("feat: first");
        repo.add_tag("v0.1.0");

        assert!(repo.commits_since(Some("v0.1.0")).unwrap().is_empty());
        assert!(repo.commits_since(Some("v0.2.0")).is_err());
    }

    #[test]
    fn test_mock_repository_list_tags() {
        let mut repo = MockRepository::new();
        repo.add_commit("a");
        repo.add_tag("v2.0.0");
        repo.add_tag("v1.0.0");

        assert_eq!(repo.list_tags().unwrap(), vec!["v1.0.0", "v2.0.0"]);
    }

    #[test]
    fn test_mock_repository_default() {
        let repo = MockRepository::default();
        assert!(repo.list_tags().unwrap().is_empty());
        assert_eq!(repo.current_branch().unwrap(), "main");
        assert_eq!(repo.head_hash().unwrap(), None);
        assert_eq!(repo.remote_url("origin").unwrap(), None);
    }
}
