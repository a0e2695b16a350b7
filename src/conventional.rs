//! Conventional commit parsing.
//!
//! Turns raw commit messages into [`CommitRecord`]s for the classifier. Supports headers of the
//! form `type(scope)!: description`, with scope and `!` optional, and collects breaking change
//! footers as notes.

use crate::config::CommitsConfig;
use crate::domain::CommitRecord;
use regex::Regex;
use std::sync::OnceLock;

fn header_regex() -> Option<&'static Regex> {
    static HEADER: OnceLock<Option<Regex>> = OnceLock::new();
    HEADER
        .get_or_init(|| {
            Regex::new(
                r"^(?P<type>[A-Za-z]+)(?:\((?P<scope>[^)]*)\))?(?P<bang>!)?:\s*(?P<description>.*)$",
            )
            .ok()
        })
        .as_ref()
}

/// Parse a commit message according to the conventional commits format.
///
/// Non-conventional messages become `chore` records. The explicit breaking flag is set by a
/// `!` after the type/scope, or when the type is one of `config.breaking_types`.
pub fn parse_commit(message: &str, config: &CommitsConfig) -> CommitRecord {
    let mut lines = message.lines();
    let header = lines.next().unwrap_or("").trim();

    let mut record = match header_regex().and_then(|re| re.captures(header)) {
        Some(caps) => {
            let commit_type = caps
                .name("type")
                .map(|m| m.as_str().to_lowercase())
                .unwrap_or_default();
            let has_bang = caps.name("bang").is_some();
            let description = caps
                .name("description")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();

            let typed_breaking = config
                .breaking_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&commit_type));

            let mut record = CommitRecord::new(commit_type).with_subject(description);
            record.explicit_breaking = has_bang || typed_breaking;
            record
        }
        None => CommitRecord::new("chore").with_subject(header),
    };

    record.notes = collect_notes(lines, &config.breaking_markers);
    record
}

/// Footer paragraphs that open with a marker phrase (or its hyphenated form) followed by `:`.
///
/// A hyphenated opener is stored under the marker phrase itself, so `BREAKING-CHANGE: x`
/// becomes `BREAKING CHANGE: x`.
fn collect_notes<'a>(lines: impl Iterator<Item = &'a str>, markers: &[String]) -> Vec<String> {
    let openers: Vec<(String, String)> = markers
        .iter()
        .flat_map(|m| {
            let upper = m.to_uppercase();
            [(upper.clone(), upper.clone()), (upper.replace(' ', "-"), upper)]
        })
        .collect();

    let mut notes = Vec::new();
    let mut current: Option<String> = None;

    for line in lines {
        let trimmed = line.trim();
        let upper = trimmed.to_uppercase();
        let opener = openers.iter().find(|(opener, _)| {
            upper
                .strip_prefix(opener.as_str())
                .is_some_and(|rest| rest.trim_start().starts_with(':'))
        });

        if let Some((opener, marker)) = opener {
            if let Some(note) = current.take() {
                notes.push(note);
            }
            let note = match trimmed.get(opener.len()..) {
                Some(rest) if opener != marker => format!("{}{}", marker, rest),
                _ => trimmed.to_string(),
            };
            current = Some(note);
        } else if trimmed.is_empty() {
            if let Some(note) = current.take() {
                notes.push(note);
            }
        } else if let Some(note) = current.as_mut() {
            note.push('\n');
            note.push_str(trimmed);
        }
    }

    if let Some(note) = current {
        notes.push(note);
    }
    notes
}
