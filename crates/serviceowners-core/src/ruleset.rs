//! Rules and ordered rule sets.

use crate::pattern::{CompiledPattern, PatternSyntaxError, compile_pattern};
use serde::Serialize;
use std::fmt::{self, Display};
use std::sync::Arc;

/// A single `pattern -> service` mapping with its position and provenance.
///
/// Rules are immutable once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    pattern: String,
    service: String,
    line: usize,
    source: String,
    #[serde(skip)]
    matcher: Arc<CompiledPattern>,
}

impl Rule {
    /// Creates a rule from an already compiled matcher.
    pub fn new(
        pattern: impl Into<String>,
        service: impl Into<String>,
        line: usize,
        source: impl Into<String>,
        matcher: Arc<CompiledPattern>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            service: service.into(),
            line,
            source: source.into(),
            matcher,
        }
    }

    /// Compiles `pattern` and creates a rule from it.
    pub fn compile(
        pattern: &str,
        service: impl Into<String>,
        line: usize,
        source: impl Into<String>,
    ) -> Result<Self, PatternSyntaxError> {
        let matcher = Arc::new(compile_pattern(pattern)?);
        Ok(Self::new(pattern, service, line, source, matcher))
    }

    /// The pattern as authored.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The owning service.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The 1-based line number within the source.
    pub fn line(&self) -> usize {
        self.line
    }

    /// The source identifier (usually the file path).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled matcher for this rule's pattern.
    pub fn matcher(&self) -> &CompiledPattern {
        &self.matcher
    }

    /// Returns true if this rule's pattern matches `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
            && self.service == other.service
            && self.line == other.line
            && self.source == other.source
    }
}

impl Eq for Rule {}

impl Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({}:{})",
            self.pattern, self.service, self.source, self.line
        )
    }
}

/// An ordered sequence of rules.
///
/// Order defines precedence (later rules win). Duplicates are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates a rule set from rules in file order.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Appends a rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Appends all rules of another set after this one's.
    pub fn extend(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }

    /// Returns the rules in order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Iterates over the rules in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl From<Vec<Rule>> for RuleSet {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_accessors() {
        let rule = Rule::compile("src/**", "api", 3, "SERVICEOWNERS").unwrap();
        assert_eq!(rule.pattern(), "src/**");
        assert_eq!(rule.service(), "api");
        assert_eq!(rule.line(), 3);
        assert_eq!(rule.source(), "SERVICEOWNERS");
        assert!(rule.matches("src/lib.rs"));
        assert_eq!(rule.to_string(), "src/** -> api (SERVICEOWNERS:3)");
    }

    #[test]
    fn rule_compile_rejects_bad_pattern() {
        assert!(Rule::compile("/", "api", 1, "SERVICEOWNERS").is_err());
    }

    #[test]
    fn extend_preserves_order() {
        let mut first = RuleSet::new(vec![Rule::compile("a/**", "a", 1, "one").unwrap()]);
        let second = RuleSet::new(vec![
            Rule::compile("b/**", "b", 1, "two").unwrap(),
            Rule::compile("a/**", "a", 2, "two").unwrap(),
        ]);
        first.extend(second);

        let order: Vec<_> = first.iter().map(|r| (r.source(), r.line())).collect();
        assert_eq!(order, vec![("one", 1), ("two", 1), ("two", 2)]);
    }

    #[test]
    fn serializes_without_matcher() {
        let rule = Rule::compile("*.md", "docs", 1, "SERVICEOWNERS").unwrap();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["pattern"], "*.md");
        assert_eq!(json["service"], "docs");
        assert_eq!(json["line"], 1);
        assert!(json.get("matcher").is_none());
    }
}
