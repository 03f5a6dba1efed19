//! Ownership resolution over an ordered rule set.
//!
//! Every rule is tested against the path, in file order, and all matching
//! rules are kept. The last matching rule is authoritative (last-match-wins).
//! The full candidate list is what overlap detection and `--explain` output
//! are built from, so matching never stops early.

use crate::ruleset::{Rule, RuleSet};
use log::trace;

/// The result of resolving a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'a> {
    /// The path that was resolved.
    pub path: String,
    /// All rules matching the path, in rule-set order.
    pub candidates: Vec<&'a Rule>,
    /// The authoritative rule: the last candidate, if any.
    pub chosen: Option<&'a Rule>,
}

impl<'a> Match<'a> {
    /// Returns the owning service, or `None` if the path is unmapped.
    pub fn service(&self) -> Option<&'a str> {
        self.chosen.map(Rule::service)
    }

    /// Returns true if no rule matched.
    pub fn is_unmapped(&self) -> bool {
        self.chosen.is_none()
    }

    /// Returns the services of all candidates, in order (may repeat).
    pub fn candidate_services(&self) -> Vec<&'a str> {
        self.candidates.iter().map(|r| r.service()).collect()
    }

    /// Returns true if the candidates belong to more than one distinct service.
    pub fn spans_services(&self) -> bool {
        match self.candidates.split_first() {
            Some((first, rest)) => rest.iter().any(|r| r.service() != first.service()),
            None => false,
        }
    }
}

/// An in-memory index resolving paths to rules.
#[derive(Debug, Clone, Default)]
pub struct OwnershipIndex {
    rules: RuleSet,
}

impl OwnershipIndex {
    /// Creates an index over the given rules.
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Returns the indexed rules.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Resolves `path` against every rule.
    ///
    /// `path` is expected to be normalized (see [`crate::paths`]).
    pub fn match_path(&self, path: &str) -> Match<'_> {
        match_rules(self.rules.rules(), path)
    }
}

/// Resolves `path` against a slice of rules in order.
///
/// This is the matching step behind [`OwnershipIndex::match_path`], usable
/// on borrowed rules without building an index.
pub fn match_rules<'a>(rules: &'a [Rule], path: &str) -> Match<'a> {
    let candidates: Vec<&Rule> = rules.iter().filter(|r| r.matches(path)).collect();
    let chosen = candidates.last().copied();
    trace!(
        "{}: {} candidate(s), chosen {:?}",
        path,
        candidates.len(),
        chosen.map(Rule::service)
    );

    Match {
        path: path.to_string(),
        candidates,
        chosen,
    }
}

impl From<RuleSet> for OwnershipIndex {
    fn from(rules: RuleSet) -> Self {
        Self::new(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_rules;

    fn index(input: &str) -> OwnershipIndex {
        OwnershipIndex::new(parse_rules(input, "SERVICEOWNERS").unwrap())
    }

    #[test]
    fn last_match_wins() {
        let idx = index("*.py core\nsrc/** platform\n");
        let m = idx.match_path("src/main.py");
        assert_eq!(m.service(), Some("platform"));
        assert_eq!(m.candidates.len(), 2);
        assert_eq!(m.candidate_services(), vec!["core", "platform"]);
        assert_eq!(m.chosen.map(Rule::line), Some(2));
        assert!(m.spans_services());
    }

    #[test]
    fn order_decides_precedence() {
        let idx = index("src/** platform\n*.py core\n");
        assert_eq!(idx.match_path("src/main.py").service(), Some("core"));
    }

    #[test]
    fn single_candidate() {
        let idx = index("apps/api/** api\napps/web/** web\n");
        let m = idx.match_path("apps/web/index.ts");
        assert_eq!(m.service(), Some("web"));
        assert_eq!(m.candidates.len(), 1);
        assert!(!m.spans_services());
    }

    #[test]
    fn unmapped_path() {
        let idx = index("apps/api/** api\n");
        let m = idx.match_path("README.md");
        assert!(m.is_unmapped());
        assert!(m.candidates.is_empty());
        assert_eq!(m.service(), None);
    }

    #[test]
    fn empty_rule_set_matches_nothing() {
        let idx = OwnershipIndex::default();
        for path in ["a", "src/main.rs", ".github/workflows/ci.yml"] {
            let m = idx.match_path(path);
            assert!(m.chosen.is_none());
            assert!(m.candidates.is_empty());
        }
    }

    #[test]
    fn same_service_twice_is_not_spanning() {
        let idx = index("src/** api\nsrc/api/** api\n");
        let m = idx.match_path("src/api/mod.rs");
        assert_eq!(m.candidates.len(), 2);
        assert!(!m.spans_services());
    }

    #[test]
    fn chosen_is_the_later_duplicate() {
        let idx = index("src/** api\nsrc/** web\n");
        let m = idx.match_path("src/x.rs");
        assert_eq!(m.service(), Some("web"));
        assert_eq!(m.chosen.map(Rule::line), Some(2));
    }
}
