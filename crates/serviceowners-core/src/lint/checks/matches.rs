//! Patterns that match no tracked file.

use super::{Check, CheckContext};
use crate::lint::issue::{Issue, IssueCode, LintResult, Severity};

/// Flags rules whose pattern matches none of the tracked files.
#[derive(Debug, Clone, Default)]
pub struct MatchesNothingCheck;

impl MatchesNothingCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Check for MatchesNothingCheck {
    fn name(&self) -> &'static str {
        "matches"
    }

    fn needs_files(&self) -> bool {
        true
    }

    fn run(&self, ctx: &CheckContext) -> LintResult {
        let mut result = LintResult::new();
        let severity = Severity::escalated(ctx.options.strict);

        for rule in ctx.rules {
            if ctx.tracked_files.iter().any(|f| rule.matches(f)) {
                continue;
            }
            result.push(
                Issue::new(
                    severity,
                    IssueCode::PatternMatchesNothing,
                    format!("Pattern '{}' matches no tracked files.", rule.pattern()),
                )
                .at(rule.source(), rule.line())
                .with_hint("Remove it or fix the glob (or ignore if files are generated later)."),
            );
        }

        result
    }
}
