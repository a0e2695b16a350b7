use crate::config::CommitsConfig;
use crate::domain::{ClassifiedCommit, CommitRecord};

/// Resolves whether commits are breaking.
///
/// A commit is breaking when it carries the explicit flag or when any of its notes contains
/// one of the marker phrases, compared case-insensitively.
#[derive(Debug, Clone)]
pub struct CommitClassifier {
    // stored uppercased
    markers: Vec<String>,
}

impl CommitClassifier {
    pub fn new<S: AsRef<str>>(markers: &[S]) -> Self {
        CommitClassifier {
            markers: markers
                .iter()
                .map(|m| m.as_ref().to_uppercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &CommitsConfig) -> Self {
        Self::new(&config.breaking_markers)
    }

    pub fn classify(&self, record: CommitRecord) -> ClassifiedCommit {
        let breaking = record.explicit_breaking || self.has_marker_note(&record.notes);
        ClassifiedCommit::new(record, breaking)
    }

    pub fn classify_all(
        &self,
        records: impl IntoIterator<Item = CommitRecord>,
    ) -> Vec<ClassifiedCommit> {
        records.into_iter().map(|r| self.classify(r)).collect()
    }

    fn has_marker_note(&self, notes: &[String]) -> bool {
        notes.iter().any(|note| {
            let upper = note.to_uppercase();
            self.markers.iter().any(|marker| upper.contains(marker.as_str()))
        })
    }
}

impl Default for CommitClassifier {
    fn default() -> Self {
        Self::from_config(&CommitsConfig::default())
    }
}
