//! Check trait and runner for SERVICEOWNERS linting.
//!
//! Each check inspects the rule set (and optionally service metadata and the
//! tracked file list) and reports issues. The runner executes checks in the
//! order they were added.

mod duppatterns;
mod matches;
mod overlaps;
mod services;

pub use duppatterns::DupPatternsCheck;
pub use matches::MatchesNothingCheck;
pub use overlaps::OverlapsCheck;
pub use services::{ServiceContactCheck, UnknownServiceCheck};

use super::LintOptions;
use super::issue::LintResult;
use crate::ruleset::RuleSet;
use crate::services::ServiceCatalog;
use log::{debug, info};

/// Context provided to checks.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// The rules being linted, in order.
    pub rules: &'a RuleSet,
    /// Service metadata, if any was supplied.
    pub services: Option<&'a ServiceCatalog>,
    /// Lint options.
    pub options: &'a LintOptions,
    /// Tracked repository files. Empty unless an opt-in check asked for them.
    pub tracked_files: &'a [String],
}

impl<'a> CheckContext<'a> {
    /// Creates a new check context.
    pub fn new(
        rules: &'a RuleSet,
        services: Option<&'a ServiceCatalog>,
        options: &'a LintOptions,
        tracked_files: &'a [String],
    ) -> Self {
        Self {
            rules,
            services,
            options,
            tracked_files,
        }
    }

    /// Returns the service catalog only when it declares at least one service.
    pub fn declared_services(&self) -> Option<&'a ServiceCatalog> {
        self.services.filter(|catalog| !catalog.is_empty())
    }
}

/// A lint check.
pub trait Check: Send + Sync {
    /// Returns the name of this check.
    fn name(&self) -> &'static str;

    /// Returns true if the check needs the tracked file list.
    fn needs_files(&self) -> bool {
        false
    }

    /// Runs the check and returns its issues.
    fn run(&self, ctx: &CheckContext) -> LintResult;
}

/// Runs multiple checks and collects results.
#[derive(Default)]
pub struct CheckRunner {
    checks: Vec<Box<dyn Check>>,
}

impl CheckRunner {
    /// Creates an empty runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner with the checks enabled by `options`.
    ///
    /// The default checks always run. The file-based checks run only when
    /// requested.
    pub fn for_options(options: &LintOptions) -> Self {
        let mut runner = Self::new();
        runner.add_check(DupPatternsCheck::new());
        runner.add_check(UnknownServiceCheck::new());
        runner.add_check(ServiceContactCheck::new());
        if options.check_matches {
            runner.add_check(MatchesNothingCheck::new());
        }
        if options.check_overlaps {
            runner.add_check(OverlapsCheck::new());
        }
        runner
    }

    /// Adds a check.
    pub fn add_check<C: Check + 'static>(&mut self, check: C) {
        self.checks.push(Box::new(check));
    }

    /// Returns the names of checks that need the tracked file list.
    pub fn file_checks(&self) -> Vec<&'static str> {
        self.checks
            .iter()
            .filter(|c| c.needs_files())
            .map(|c| c.name())
            .collect()
    }

    /// Returns the number of registered checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns true if no checks are registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Runs all checks and returns combined results.
    pub fn run(&self, ctx: &CheckContext) -> LintResult {
        info!("Running {} lint checks", self.checks.len());
        let mut result = LintResult::new();

        for check in &self.checks {
            debug!("Running check: {}", check.name());
            let check_result = check.run(ctx);
            debug!(
                "Check '{}' found {} issues",
                check.name(),
                check_result.issues.len()
            );
            result.merge(check_result);
        }

        info!("Lint checks complete: {} total issues", result.issues.len());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_runner_has_three_checks() {
        let runner = CheckRunner::for_options(&LintOptions::default());
        assert_eq!(runner.len(), 3);
        assert!(runner.file_checks().is_empty());
    }

    #[test]
    fn opt_in_checks_are_file_checks() {
        let options = LintOptions::new()
            .with_check_matches(true)
            .with_check_overlaps(true);
        let runner = CheckRunner::for_options(&options);
        assert_eq!(runner.len(), 5);
        assert_eq!(runner.file_checks(), vec!["matches", "overlaps"]);
    }

    #[test]
    fn declared_services_ignores_empty_catalog() {
        let rules = RuleSet::default();
        let options = LintOptions::default();
        let empty = ServiceCatalog::new();
        let ctx = CheckContext::new(&rules, Some(&empty), &options, &[]);
        assert!(ctx.declared_services().is_none());

        let ctx = CheckContext::new(&rules, None, &options, &[]);
        assert!(ctx.declared_services().is_none());
    }
}
