//! Drafting a SERVICEOWNERS file from an existing CODEOWNERS file.
//!
//! Each CODEOWNERS rule keeps its pattern. The service name is guessed, in
//! order, from the last literal path segment of the pattern, from the first
//! owner's team or user name, or falls back to `service`. The draft is meant
//! to be edited by hand.

use log::debug;
use std::path::{Path, PathBuf};

/// Service name used when nothing better can be inferred.
pub const FALLBACK_SERVICE: &str = "service";

const GLOB_CHARS: [char; 4] = ['*', '?', '[', ']'];

/// Finds the CODEOWNERS file in a repository.
///
/// Searches in the following locations (in order):
/// 1. `.github/CODEOWNERS`
/// 2. `CODEOWNERS`
/// 3. `docs/CODEOWNERS`
pub fn find_codeowners_file(repo_path: &Path) -> Option<PathBuf> {
    let locations = [
        repo_path.join(".github/CODEOWNERS"),
        repo_path.join("CODEOWNERS"),
        repo_path.join("docs/CODEOWNERS"),
    ];
    locations.into_iter().find(|p| p.is_file())
}

/// Infers a service name from the last glob-free segment of a pattern.
///
/// ```rust
/// use serviceowners_core::bootstrap::infer_service_from_pattern;
///
/// assert_eq!(infer_service_from_pattern("/apps/Billing/**"), Some("billing".to_string()));
/// assert_eq!(infer_service_from_pattern("*.md"), None);
/// ```
pub fn infer_service_from_pattern(pattern: &str) -> Option<String> {
    let normalized = pattern.trim().replace('\\', "/");
    normalized
        .split('/')
        .filter(|seg| !seg.is_empty())
        .filter(|seg| !seg.contains(GLOB_CHARS))
        .next_back()
        .map(|seg| seg.trim().to_lowercase())
        .filter(|seg| !seg.is_empty())
}

/// Infers a service name from a CODEOWNERS owner.
///
/// `@org/team-name` yields `team_name`, `@user` yields `user`.
pub fn infer_service_from_owner(owner: &str) -> Option<String> {
    let owner = owner.trim();
    let owner = owner.strip_prefix('@').unwrap_or(owner);
    let name = owner.split_once('/').map_or(owner, |(_, team)| team);
    let name = name.replace('-', "_").to_lowercase();
    (!name.is_empty()).then_some(name)
}

/// Produces a SERVICEOWNERS draft from CODEOWNERS text.
///
/// Comment and blank lines are dropped, as are rules without owners. The
/// output starts with a short header and has one `pattern<TAB>service` line
/// per rule, in the original order.
pub fn bootstrap_from_codeowners(codeowners: &str) -> String {
    let mut out = String::from("# Generated from CODEOWNERS\n# pattern    service\n");
    let mut rules = 0usize;

    for line in codeowners.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut columns = line.split_whitespace();
        let (Some(pattern), Some(first_owner)) = (columns.next(), columns.next()) else {
            continue;
        };

        let service = infer_service_from_pattern(pattern)
            .or_else(|| infer_service_from_owner(first_owner))
            .unwrap_or_else(|| FALLBACK_SERVICE.to_string());

        out.push_str(pattern);
        out.push('\t');
        out.push_str(&service);
        out.push('\n');
        rules += 1;
    }

    debug!("Bootstrapped {} rules from CODEOWNERS", rules);
    out
}
