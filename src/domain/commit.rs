/// A commit as handed over by the upstream parser.
///
/// Only the fields that drive the release decision are required; `hash` and `subject`
/// are carried for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitRecord {
    pub commit_type: String,
    pub explicit_breaking: bool,
    pub notes: Vec<String>,
    pub hash: Option<String>,
    pub subject: Option<String>,
}

impl CommitRecord {
    /// Create a record of the given conventional type
    pub fn new(commit_type: impl Into<String>) -> Self {
        CommitRecord {
            commit_type: commit_type.into(),
            ..CommitRecord::default()
        }
    }

    /// Mark the record as explicitly breaking (e.g. `feat!:`)
    pub fn breaking(mut self) -> Self {
        self.explicit_breaking = true;
        self
    }

    /// Attach a free-text note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// A commit record with its breaking status resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedCommit {
    pub record: CommitRecord,
    pub breaking: bool,
}

impl ClassifiedCommit {
    pub fn new(record: CommitRecord, breaking: bool) -> Self {
        ClassifiedCommit { record, breaking }
    }

    pub fn commit_type(&self) -> &str {
        &self.record.commit_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let record = CommitRecord::new("feat")
            .breaking()
            .with_note("BREAKING CHANGE: removed v1 endpoints")
            .with_hash("abc1234");

        assert_eq!(record.commit_type, "feat");
        assert!(record.explicit_breaking);
        assert_eq!(record.notes.len(), 1);
        assert_eq!(record.hash.as_deref(), Some("abc1234"));
        assert!(record.subject.is_none());
    }

    #[test]
    fn test_classified_type() {
        let classified = ClassifiedCommit::new(CommitRecord::new("perf"), false);
        assert_eq!(classified.commit_type(), "perf");
    }
}
