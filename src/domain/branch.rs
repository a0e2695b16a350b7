/// Represents a git branch with its release eligibility
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchContext {
    pub name: String,
    pub is_release: bool,
}

impl BranchContext {
    /// Create a branch context against the configured release branches
    pub fn new<S: AsRef<str>>(name: impl Into<String>, release_branches: &[S]) -> Self {
        let name = name.into();
        let is_release = release_branches.iter().any(|b| b.as_ref() == name);

        BranchContext { name, is_release }
    }

    /// Check if releases may be cut from this branch
    pub fn is_release_branch(&self) -> bool {
        self.is_release
    }
}
