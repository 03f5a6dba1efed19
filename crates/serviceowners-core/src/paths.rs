//! Path normalization for matching.
//!
//! Paths reach the matcher from git output, stdin, CI event payloads and user
//! arguments. They are all brought to one repository-relative, `/`-separated
//! form before matching.

use std::path::Path;

/// Normalizes a path for matching against SERVICEOWNERS rules.
///
/// - `\` becomes `/` and surrounding whitespace is trimmed.
/// - One layer of matching surrounding quotes is removed.
/// - An absolute path under `repo_root` is made relative to it.
/// - Leading `./` (repeated) and a single leading `/` are stripped.
/// - Empty and `.` segments are collapsed.
///
/// A path that collapses to nothing becomes `.`.
pub fn normalize_repo_path(path: &str, repo_root: Option<&Path>) -> String {
    let posix = path.replace('\\', "/");
    let unquoted = strip_quotes(posix.trim());

    let relative = repo_root.and_then(|root| relativize(unquoted, root));
    let mut p = relative.as_deref().unwrap_or(unquoted);

    while let Some(rest) = p.strip_prefix("./") {
        p = rest;
    }
    let p = p.strip_prefix('/').unwrap_or(p);

    let joined = p
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/");

    if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Normalizes every non-blank path.
pub fn normalize_paths<I>(paths: I, repo_root: Option<&Path>) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    paths
        .into_iter()
        .filter(|p| !p.as_ref().trim().is_empty())
        .map(|p| normalize_repo_path(p.as_ref(), repo_root))
        .collect()
}

fn strip_quotes(p: &str) -> &str {
    for quote in ['"', '\''] {
        if p.len() >= 2
            && let Some(inner) = p.strip_prefix(quote).and_then(|s| s.strip_suffix(quote))
        {
            return inner;
        }
    }
    p
}

fn relativize(p: &str, root: &Path) -> Option<String> {
    let candidate = Path::new(p);
    if !candidate.is_absolute() {
        return None;
    }
    let rel = candidate.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn backslashes_become_slashes() {
        assert_eq!(normalize_repo_path("src\\lib\\mod.rs", None), "src/lib/mod.rs");
    }

    #[test]
    fn strips_leading_dot_slash_repeatedly() {
        assert_eq!(normalize_repo_path("././src/a.rs", None), "src/a.rs");
        assert_eq!(normalize_repo_path("/src/a.rs", None), "src/a.rs");
    }

    #[test]
    fn keeps_dot_directories() {
        assert_eq!(
            normalize_repo_path(".github/workflows/ci.yml", None),
            ".github/workflows/ci.yml"
        );
        assert_eq!(normalize_repo_path("./.env", None), ".env");
    }

    #[test]
    fn strips_surrounding_quotes_once() {
        assert_eq!(normalize_repo_path("\"docs/a b.md\"", None), "docs/a b.md");
        assert_eq!(normalize_repo_path("'docs/x.md'", None), "docs/x.md");
        assert_eq!(normalize_repo_path("\"mixed'", None), "\"mixed'");
    }

    #[test]
    fn collapses_empty_and_current_segments() {
        assert_eq!(normalize_repo_path("a//b/./c", None), "a/b/c");
        assert_eq!(normalize_repo_path("a/b/", None), "a/b");
        assert_eq!(normalize_repo_path("./", None), ".");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(normalize_repo_path("  src/a.rs \n", None), "src/a.rs");
    }

    #[cfg(unix)]
    #[test]
    fn absolute_paths_relative_to_root() {
        let root = PathBuf::from("/work/repo");
        assert_eq!(
            normalize_repo_path("/work/repo/apps/api/main.go", Some(root.as_path())),
            "apps/api/main.go"
        );
        // Outside the root: only the leading slash goes.
        assert_eq!(
            normalize_repo_path("/elsewhere/file", Some(root.as_path())),
            "elsewhere/file"
        );
    }

    #[test]
    fn normalize_paths_drops_blank_entries() {
        let paths = normalize_paths(["./a.rs", "", "   ", "b\\c.rs"], None);
        assert_eq!(paths, vec!["a.rs", "b/c.rs"]);
    }
}
