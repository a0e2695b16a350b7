//! Textual reference repair.
//!
//! Every occurrence of the previous module identity in source files is replaced by the new
//! one. The substitution is blanket: it does not distinguish import paths from comments or
//! string literals that happen to contain the identity. References carrying a major suffix
//! above the target major name another module and are left alone.

use super::identity::major_suffix;
use crate::error::{ReleaseBumpError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Characters that continue a path element; an identity followed by one of these is a
/// different identity (`widget` vs `widgets`).
fn continues_identity(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Rewrites references to one identity into another
#[derive(Debug, Clone)]
pub struct ReferenceRewriter {
    old: String,
    new: String,
    target_major: u64,
    matcher: Regex,
}

impl ReferenceRewriter {
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Result<Self> {
        let old = old.into();
        let new = new.into();
        // An existing major suffix is swallowed so that already-migrated text is not
        // suffixed twice.
        let matcher = Regex::new(&format!(r"{}(?:/v(?P<major>[0-9]+))?", regex::escape(&old)))
            .map_err(|e| {
                ReleaseBumpError::migration("reference repair", e.to_string())
            })?;
        let target_major = major_suffix(&new).unwrap_or(1);

        Ok(ReferenceRewriter {
            old,
            new,
            target_major,
            matcher,
        })
    }

    /// Rewrite `text`, returning `None` when nothing changed.
    pub fn rewrite(&self, text: &str) -> Option<String> {
        if self.old == self.new || self.old.is_empty() {
            return None;
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;

        for caps in self.matcher.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let start = whole.start();

            let preceded_by_identity = text[..start]
                .chars()
                .next_back()
                .is_some_and(continues_identity);
            if preceded_by_identity {
                continue;
            }

            let bounded_at = |end: usize| {
                !text[end..]
                    .chars()
                    .next()
                    .is_some_and(continues_identity)
            };

            // Prefer consuming the suffix, fall back to the bare identity (`/v2x` is not a
            // suffix).
            let end = match caps.name("major") {
                Some(major) if bounded_at(whole.end()) => {
                    let within_target = major
                        .as_str()
                        .parse::<u64>()
                        .is_ok_and(|m| m <= self.target_major);
                    if !within_target {
                        continue;
                    }
                    whole.end()
                }
                _ if bounded_at(start + self.old.len()) => start + self.old.len(),
                _ => continue,
            };

            out.push_str(&text[last..start]);
            out.push_str(&self.new);
            last = end;
        }

        if last == 0 {
            return None;
        }
        out.push_str(&text[last..]);

        (out != text).then_some(out)
    }

    /// Rewrite every matching source file under `root`.
    ///
    /// Returns the rewritten files relative to `root`, in walk order.
    pub fn repair_tree<S: AsRef<str>>(
        &self,
        root: &Path,
        extensions: &[S],
    ) -> Result<Vec<PathBuf>> {
        let mut touched = Vec::new();

        for relative in source_files(root, extensions)? {
            let path = root.join(&relative);
            let bytes = fs::read(&path)?;
            let Ok(content) = String::from_utf8(bytes) else {
                tracing::warn!(path = %path.display(), "skipping non UTF-8 source file");
                continue;
            };

            if let Some(rewritten) = self.rewrite(&content) {
                fs::write(&path, rewritten)?;
                tracing::debug!(path = %relative.display(), "rewrote module references");
                touched.push(relative);
            }
        }

        Ok(touched)
    }
}

/// Source files under `root` whose extension is in `extensions`, relative to `root`.
///
/// Hidden directories are skipped and symlinks are not followed.
pub fn source_files<S: AsRef<str>>(root: &Path, extensions: &[S]) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // the root itself may be a dot-directory (temp dirs are)
            e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.')
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry =
            entry.map_err(|e| ReleaseBumpError::migration("reference repair", e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if extensions.iter().any(|wanted| wanted.as_ref() == ext) {
            files.push(path.strip_prefix(root).unwrap_or(path).to_path_buf());
        }
    }
    Ok(files)
}

/// Contents of every source file under `root`, keyed by relative path.
pub fn snapshot_sources<S: AsRef<str>>(
    root: &Path,
    extensions: &[S],
) -> Result<BTreeMap<PathBuf, Vec<u8>>> {
    source_files(root, extensions)?
        .into_iter()
        .map(|relative| -> Result<(PathBuf, Vec<u8>)> {
            let content = fs::read(root.join(&relative))?;
            Ok((relative, content))
        })
        .collect()
}

/// Files that are new in `after` or whose contents differ from `before`.
pub fn changed_files(
    before: &BTreeMap<PathBuf, Vec<u8>>,
    after: &BTreeMap<PathBuf, Vec<u8>>,
) -> Vec<PathBuf> {
    after
        .iter()
        .filter(|(path, content)| before.get(*path) != Some(*content))
        .map(|(path, _)| path.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const OLD: &str = "github.com/acme/widget";
    const NEW: &str = "github.com/acme/widget/v2";

    fn rewriter() -> ReferenceRewriter {
        ReferenceRewriter::new(OLD, NEW).unwrap()
    }

    #[test]
    fn test_rewrites_imports() {
        let source = "import (\n\t\"github.com/acme/widget/internal/db\"\n\t\"github.com/acme/widget\"\n)\n";
        let rewritten = rewriter().rewrite(source).unwrap();
        assert_eq!(
            rewritten,
            "import (\n\t\"github.com/acme/widget/v2/internal/db\"\n\t\"github.com/acme/widget/v2\"\n)\n"
        );
    }

    #[test]
    fn test_already_migrated_text_is_unchanged() {
        let source = "import \"github.com/acme/widget/v2/pkg\"\n";
        assert_eq!(rewriter().rewrite(source), None);
    }

    #[test]
    fn test_rewriting_twice_matches_once() {
        let source = "module github.com/acme/widget\n// see github.com/acme/widget/pkg\n";
        let once = rewriter().rewrite(source).unwrap();
        assert_eq!(rewriter().rewrite(&once), None);
    }

    #[test]
    fn test_older_suffix_is_replaced() {
        let rewriter = ReferenceRewriter::new(NEW, "github.com/acme/widget/v3").unwrap();
        let rewritten = rewriter
            .rewrite("import \"github.com/acme/widget/v2/api\"")
            .unwrap();
        assert_eq!(rewritten, "import \"github.com/acme/widget/v3/api\"");
    }

    #[test]
    fn test_newer_major_reference_untouched() {
        let source = "x github.com/acme/widget/v3/api\n";
        assert_eq!(rewriter().rewrite(source), None);

        let mixed = "\"github.com/acme/widget/v3/api\" \"github.com/acme/widget/api\"";
        assert_eq!(
            rewriter().rewrite(mixed).unwrap(),
            "\"github.com/acme/widget/v3/api\" \"github.com/acme/widget/v2/api\""
        );
    }

    #[test]
    fn test_longer_identities_untouched() {
        let source = "\"github.com/acme/widgets\" \"github.com/acme/widget-extra\" \"xgithub.com/acme/widget\"";
        assert_eq!(rewriter().rewrite(source), None);
    }

    #[test]
    fn test_vendor_like_segment_is_not_a_suffix() {
        let rewritten = rewriter()
            .rewrite("\"github.com/acme/widget/v2x\"")
            .unwrap();
        assert_eq!(rewritten, "\"github.com/acme/widget/v2/v2x\"");
    }

    #[test]
    fn test_comments_are_rewritten_too() {
        let rewritten = rewriter()
            .rewrite("// Forked from github.com/acme/widget in 2019\n")
            .unwrap();
        assert!(rewritten.contains("github.com/acme/widget/v2 in 2019"));
    }

    #[test]
    fn test_repair_tree() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("cmd/widget")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(
            root.join("cmd/widget/main.go"),
            "package main\n\nimport \"github.com/acme/widget/api\"\n",
        )
        .unwrap();
        fs::write(root.join("api.go"), "package widget\n").unwrap();
        fs::write(root.join("README.md"), "go get github.com/acme/widget\n").unwrap();
        fs::write(root.join(".git/config.go"), "github.com/acme/widget\n").unwrap();

        let touched = rewriter().repair_tree(root, &["go"]).unwrap();

        assert_eq!(touched, vec![PathBuf::from("cmd/widget/main.go")]);
        assert!(fs::read_to_string(root.join("cmd/widget/main.go"))
            .unwrap()
            .contains("github.com/acme/widget/v2/api"));
        assert_eq!(
            fs::read_to_string(root.join("README.md")).unwrap(),
            "go get github.com/acme/widget\n"
        );
        assert_eq!(
            fs::read_to_string(root.join(".git/config.go")).unwrap(),
            "github.com/acme/widget\n"
        );
    }

    #[test]
    fn test_changed_files_between_snapshots() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("a.go"), "package a\n").unwrap();
        fs::write(root.join("b.go"), "package b\n").unwrap();
        fs::write(root.join("notes.txt"), "one\n").unwrap();

        let before = snapshot_sources(root, &["go"]).unwrap();
        fs::write(root.join("b.go"), "package b\n\nimport \"fmt\"\n").unwrap();
        fs::write(root.join("c.go"), "package c\n").unwrap();
        fs::write(root.join("notes.txt"), "two\n").unwrap();
        let after = snapshot_sources(root, &["go"]).unwrap();

        assert_eq!(
            changed_files(&before, &after),
            vec![PathBuf::from("b.go"), PathBuf::from("c.go")]
        );
    }
}
