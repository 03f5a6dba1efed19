//! Cross-service overlap detection.
//!
//! A tracked file matched by rules of two or more services is owned by the
//! last one, which is often fine but easy to misread. This check reports up
//! to [`MAX_OVERLAP_EXAMPLES`] such files in a single aggregate warning.

use super::{Check, CheckContext};
use crate::lint::issue::{Issue, IssueCode, LintResult, Severity};
use crate::ownership::match_rules;

/// Maximum number of example files listed in the overlap warning.
pub const MAX_OVERLAP_EXAMPLES: usize = 25;

/// Reports tracked files whose candidate rules span several services.
#[derive(Debug, Clone, Default)]
pub struct OverlapsCheck;

impl OverlapsCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Check for OverlapsCheck {
    fn name(&self) -> &'static str {
        "overlaps"
    }

    fn needs_files(&self) -> bool {
        true
    }

    fn run(&self, ctx: &CheckContext) -> LintResult {
        let mut result = LintResult::new();
        let mut examples: Vec<String> = Vec::new();

        for file in ctx.tracked_files {
            let m = match_rules(ctx.rules.rules(), file);
            if !m.spans_services() {
                continue;
            }
            examples.push(format!("{} -> {}", file, m.candidate_services().join(", ")));
            if examples.len() >= MAX_OVERLAP_EXAMPLES {
                break;
            }
        }

        if !examples.is_empty() {
            result.push(
                Issue::new(
                    Severity::Warn,
                    IssueCode::OverlappingRules,
                    format!(
                        "Some files match multiple services (last-match wins). Examples: {}",
                        examples.join("; ")
                    ),
                )
                .with_hint("Often OK. If it's confusing, tighten globs or add comments."),
            );
        }

        result
    }
}
