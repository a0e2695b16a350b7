use crate::domain::version::{parse_version, Version};
use crate::error::{ReleaseBumpError, Result};
use regex::Regex;

/// Tag naming pattern (e.g., "v{version}", "release-{version}")
#[derive(Debug, Clone)]
pub struct TagPattern {
    pub pattern: String,
    matcher: Regex,
}

/// A release tag together with the version it names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
    pub name: String,
    pub version: Version,
}

/// Result of scanning repository tags for releases
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagScan {
    /// Highest version among tags matching the pattern
    pub latest: Option<ReleaseTag>,
    /// Tags that match the pattern but whose version part does not parse
    pub unparsable: Vec<String>,
}

impl TagPattern {
    /// Create a new tag pattern
    pub fn new(pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if !pattern.contains("{version}") {
            return Err(ReleaseBumpError::config(
                "Pattern must contain {version} placeholder",
            ));
        }

        // Escape everything, then open a capture where {version} was
        let escaped = regex::escape(&pattern);
        let regex_pattern = escaped.replace(r"\{version\}", r"(?P<version>.+)");
        let matcher = Regex::new(&format!("^{}$", regex_pattern))
            .map_err(|e| ReleaseBumpError::config(format!("Invalid tag pattern: {}", e)))?;

        Ok(TagPattern { pattern, matcher })
    }

    /// Format a version according to pattern
    /// Example: pattern="v{version}", version="1.2.3" -> "v1.2.3"
    pub fn format(&self, version: &Version) -> String {
        self.pattern.replace("{version}", &version.to_string())
    }

    /// Version text of a tag, if the tag follows this pattern
    pub fn version_part<'a>(&self, tag: &'a str) -> Option<&'a str> {
        self.matcher
            .captures(tag)
            .and_then(|caps| caps.name("version"))
            .map(|m| m.as_str())
    }

    /// Find the latest release among `tags` by semantic version order
    pub fn scan<S: AsRef<str>>(&self, tags: &[S]) -> TagScan {
        let mut scan = TagScan::default();

        for tag in tags {
            let tag = tag.as_ref();
            let Some(version_text) = self.version_part(tag) else {
                continue;
            };

            match parse_version(version_text) {
                Ok(version) => {
                    let is_newer = scan
                        .latest
                        .as_ref()
                        .map_or(true, |current| version > current.version);
                    if is_newer {
                        scan.latest = Some(ReleaseTag {
                            name: tag.to_string(),
                            version,
                        });
                    }
                }
                Err(_) => scan.unparsable.push(tag.to_string()),
            }
        }

        scan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_requires_placeholder() {
        assert!(TagPattern::new("release").is_err());
    }

    #[test]
    fn test_pattern_format() {
        let pattern = TagPattern::new("v{version}").unwrap();
        assert_eq!(pattern.format(&Version::new(1, 2, 3)), "v1.2.3");
    }

    #[test]
    fn test_pattern_format_with_prefix() {
        let pattern = TagPattern::new("release-{version}").unwrap();
        assert_eq!(pattern.format(&Version::new(1, 2, 3)), "release-1.2.3");
    }

    #[test]
    fn test_version_part() {
        let pattern = TagPattern::new("v{version}").unwrap();
        assert_eq!(pattern.version_part("v1.2.3"), Some("1.2.3"));
        assert_eq!(pattern.version_part("release-1.2.3"), None);
    }

    #[test]
    fn test_scan_picks_highest_semver() {
        let pattern = TagPattern::new("v{version}").unwrap();
        let tags = vec!["v1.9.0", "v1.10.0", "v0.3.0", "nightly"];
        let scan = pattern.scan(&tags);

        let latest = scan.latest.unwrap();
        assert_eq!(latest.name, "v1.10.0");
        assert_eq!(latest.version, Version::new(1, 10, 0));
        assert!(scan.unparsable.is_empty());
    }

    #[test]
    fn test_scan_reports_unparsable() {
        let pattern = TagPattern::new("v{version}").unwrap();
        let scan = pattern.scan(&["v1.0", "v1.0.0"]);
        assert_eq!(scan.unparsable, vec!["v1.0".to_string()]);
        assert_eq!(scan.latest.unwrap().name, "v1.0.0");
    }

    #[test]
    fn test_scan_empty() {
        let pattern = TagPattern::new("v{version}").unwrap();
        let tags: Vec<String> = Vec::new();
        assert_eq!(pattern.scan(&tags), TagScan::default());
    }
}
