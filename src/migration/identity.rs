//! Module identity derivation.
//!
//! A module identity is the canonical path a package declares for itself, e.g.
//! `github.com/acme/widget`. From major version 2 on, the identity carries a `/vN` suffix.

/// Normalize a repository locator into a bare module path.
///
/// Handles `https://host/owner/repo.git`, `ssh://git@host/owner/repo`, scp-style
/// `git@host:owner/repo.git` and `owner/repo` shorthand (which gets `default_host`).
pub fn normalize_locator(locator: &str, default_host: &str) -> String {
    let mut rest = locator.trim().trim_end_matches('/');

    let had_scheme = match rest.find("://") {
        Some(idx) => {
            rest = &rest[idx + 3..];
            true
        }
        None => false,
    };

    // user@host...
    let authority_end = rest.find('/').unwrap_or(rest.len());
    if let Some(at) = rest[..authority_end].rfind('@') {
        rest = &rest[at + 1..];
    }

    let mut path = String::with_capacity(rest.len());
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].split_once(':') {
        // host:port after a scheme, the port is not part of the identity
        Some((host, _port)) if had_scheme => {
            path.push_str(host);
            path.push_str(&rest[authority_end..]);
        }
        // scp-style host:owner/repo
        Some((host, owner)) => {
            path.push_str(host);
            path.push('/');
            path.push_str(owner);
            path.push_str(&rest[authority_end..]);
        }
        None => path.push_str(rest),
    }

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let first_segment = path.split('/').next().unwrap_or("");
    if first_segment.contains('.') || first_segment == "localhost" {
        path.to_string()
    } else {
        format!("{}/{}", default_host.trim_end_matches('/'), path)
    }
}

/// Major version encoded in a trailing `/vN` segment (N >= 2), if any.
pub fn major_suffix(identity: &str) -> Option<u64> {
    let (_, last) = identity.rsplit_once('/')?;
    let digits = last.strip_prefix('v')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok().filter(|major| *major >= 2)
}

/// Identity without its major version suffix
pub fn strip_major_suffix(identity: &str) -> &str {
    match major_suffix(identity) {
        Some(_) => identity
            .rsplit_once('/')
            .map(|(base, _)| base)
            .unwrap_or(identity),
        None => identity,
    }
}

/// Identity for `major`, replacing any existing suffix.
///
/// Majors 0 and 1 carry no suffix. Applying this twice gives the same result as once.
pub fn with_major_suffix(identity: &str, major: u64) -> String {
    let base = strip_major_suffix(identity);
    if major >= 2 {
        format!("{}/v{}", base, major)
    } else {
        base.to_string()
    }
}

/// Module identity for a repository locator at the given major version
pub fn module_identity(locator: &str, default_host: &str, major: u64) -> String {
    with_major_suffix(&normalize_locator(locator, default_host), major)
}

/// Identity declared by a `module` directive in manifest text
pub fn declared_identity(manifest: &str) -> Option<String> {
    manifest.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or("").trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let identity = rest.trim().trim_matches('"').trim_matches('`');
        (!identity.is_empty()).then(|| identity.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "github.com";

    #[test]
    fn test_normalize_https() {
        assert_eq!(
            normalize_locator("https://github.com/acme/widget.git", HOST),
            "github.com/acme/widget"
        );
        assert_eq!(
            normalize_locator("http://github.com/acme/widget/", HOST),
            "github.com/acme/widget"
        );
    }

    #[test]
    fn test_normalize_scp_style() {
        assert_eq!(
            normalize_locator("git@github.com:acme/widget.git", HOST),
            "github.com/acme/widget"
        );
    }

    #[test]
    fn test_normalize_ssh_with_port() {
        assert_eq!(
            normalize_locator("ssh://git@git.example.org:2222/team/tool.git", HOST),
            "git.example.org/team/tool"
        );
    }

    #[test]
    fn test_normalize_other_host() {
        assert_eq!(
            normalize_locator("https://gitlab.com/group/sub/project", HOST),
            "gitlab.com/group/sub/project"
        );
    }

    #[test]
    fn test_normalize_shorthand() {
        assert_eq!(
            normalize_locator("acme/widget", HOST),
            "github.com/acme/widget"
        );
        assert_eq!(
            normalize_locator("https://acme/widget", HOST),
            "github.com/acme/widget"
        );
    }

    #[test]
    fn test_normalize_already_bare() {
        assert_eq!(
            normalize_locator("github.com/acme/widget", HOST),
            "github.com/acme/widget"
        );
    }

    #[test]
    fn test_major_suffix() {
        assert_eq!(major_suffix("github.com/acme/widget/v3"), Some(3));
        assert_eq!(major_suffix("github.com/acme/widget/v1"), None);
        assert_eq!(major_suffix("github.com/acme/widget/vendor"), None);
        assert_eq!(major_suffix("github.com/acme/widget"), None);
    }

    #[test]
    fn test_with_major_suffix() {
        assert_eq!(
            with_major_suffix("github.com/acme/widget", 2),
            "github.com/acme/widget/v2"
        );
        assert_eq!(
            with_major_suffix("github.com/acme/widget/v2", 3),
            "github.com/acme/widget/v3"
        );
        assert_eq!(
            with_major_suffix("github.com/acme/widget/v2", 1),
            "github.com/acme/widget"
        );
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = with_major_suffix("github.com/acme/widget/v4", 4);
        let twice = with_major_suffix(&once, 4);
        assert_eq!(once, "github.com/acme/widget/v4");
        assert_eq!(twice, once);
    }

    #[test]
    fn test_module_identity() {
        assert_eq!(
            module_identity("https://github.com/acme/widget.git", HOST, 2),
            "github.com/acme/widget/v2"
        );
    }

    #[test]
    fn test_declared_identity() {
        let manifest = "// generated\nmodule github.com/acme/widget/v2 // canonical\n\ngo 1.22\n";
        assert_eq!(
            declared_identity(manifest),
            Some("github.com/acme/widget/v2".to_string())
        );
        assert_eq!(
            declared_identity("module \"example.com/quoted\"\n"),
            Some("example.com/quoted".to_string())
        );
        assert_eq!(declared_identity("go 1.22\nmodules x\n"), None);
    }
}
