//! Duplicate pattern detection check.
//!
//! The same pattern assigned to different services is almost always a
//! mistake: only the last one ever takes effect.

use super::{Check, CheckContext};
use crate::lint::issue::{Issue, IssueCode, LintResult, Severity};
use crate::ruleset::Rule;
use std::collections::HashMap;

/// Flags a pattern that reappears with a different service.
///
/// Each rule is compared with the remembered occurrence of its pattern. A
/// conflicting rule is reported and not remembered; a repeat with the same
/// service replaces the remembered occurrence.
#[derive(Debug, Clone, Default)]
pub struct DupPatternsCheck;

impl DupPatternsCheck {
    /// Creates a new duplicate patterns check.
    pub fn new() -> Self {
        Self
    }
}

impl Check for DupPatternsCheck {
    fn name(&self) -> &'static str {
        "duppatterns"
    }

    fn run(&self, ctx: &CheckContext) -> LintResult {
        let mut result = LintResult::new();
        let severity = Severity::escalated(ctx.options.strict);
        let mut seen: HashMap<&str, &Rule> = HashMap::new();

        for rule in ctx.rules {
            let conflict = seen
                .get(rule.pattern())
                .copied()
                .filter(|prev| prev.service() != rule.service());

            match conflict {
                Some(prev) => {
                    result.push(
                        Issue::new(
                            severity,
                            IssueCode::DuplicatePattern,
                            format!(
                                "Pattern '{}' is defined multiple times (last-match wins). \
                                 Previous: {} (line {}), this: {} (line {}).",
                                rule.pattern(),
                                prev.service(),
                                prev.line(),
                                rule.service(),
                                rule.line()
                            ),
                        )
                        .at(rule.source(), rule.line())
                        .with_hint("Remove duplicates or make precedence explicit."),
                    );
                }
                None => {
                    seen.insert(rule.pattern(), rule);
                }
            }
        }

        result
    }
}
