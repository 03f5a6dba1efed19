//! Checks against service metadata.
//!
//! Both checks are skipped unless a non-empty service catalog is supplied.

use super::{Check, CheckContext};
use crate::lint::issue::{Issue, IssueCode, LintResult, Severity};

/// Flags rules that name a service missing from the catalog.
#[derive(Debug, Clone, Default)]
pub struct UnknownServiceCheck;

impl UnknownServiceCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Check for UnknownServiceCheck {
    fn name(&self) -> &'static str {
        "unknownservice"
    }

    fn run(&self, ctx: &CheckContext) -> LintResult {
        let mut result = LintResult::new();
        let Some(catalog) = ctx.declared_services() else {
            return result;
        };
        let severity = Severity::escalated(ctx.options.strict);

        for rule in ctx.rules.iter().filter(|r| !catalog.contains(r.service())) {
            result.push(
                Issue::new(
                    severity,
                    IssueCode::UnknownService,
                    format!(
                        "SERVICEOWNERS references unknown service '{}'.",
                        rule.service()
                    ),
                )
                .at(rule.source(), rule.line())
                .with_hint("Add it to services.yaml (or fix the spelling)."),
            );
        }

        result
    }
}

/// Flags services nobody can be reached for.
///
/// A service passes with at least one owner, or a slack or email contact.
/// Always a warning, strict or not.
#[derive(Debug, Clone, Default)]
pub struct ServiceContactCheck;

impl ServiceContactCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Check for ServiceContactCheck {
    fn name(&self) -> &'static str {
        "servicecontact"
    }

    fn run(&self, ctx: &CheckContext) -> LintResult {
        let mut result = LintResult::new();
        let Some(catalog) = ctx.declared_services() else {
            return result;
        };

        for service in catalog.iter().filter(|s| !s.has_contact()) {
            result.push(
                Issue::new(
                    Severity::Warn,
                    IssueCode::ServiceHasNoContact,
                    format!(
                        "Service '{}' has no owners and no contact (slack/email).",
                        service.name
                    ),
                )
                .with_hint("Add owners/contact so PRs have someone to page."),
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::LintOptions;
    use crate::parse::parse_rules;
    use crate::services::{ServiceCatalog, parse_services};

    const RULES: &str = "apps/api/** api\napps/web/** web\n";

    fn run<C: Check>(check: C, services: Option<&ServiceCatalog>, strict: bool) -> LintResult {
        let rules = parse_rules(RULES, "SERVICEOWNERS").unwrap();
        let options = LintOptions::new().with_strict(strict);
        let ctx = CheckContext::new(&rules, services, &options, &[]);
        check.run(&ctx)
    }

    #[test]
    fn unknown_service_is_reported() {
        let catalog = parse_services("web:\n  owners: ['@acme/web']\n", "services.yaml").unwrap();
        let result = run(UnknownServiceCheck::new(), Some(&catalog), false);

        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues[0];
        assert_eq!(issue.code, IssueCode::UnknownService);
        assert_eq!(issue.severity, Severity::Warn);
        assert!(issue.message.contains("'api'"));
        assert_eq!(issue.location.as_ref().map(|l| l.line), Some(1));
    }

    #[test]
    fn unknown_service_strict_is_error() {
        let catalog = parse_services("web: {}\n", "x").unwrap();
        let result = run(UnknownServiceCheck::new(), Some(&catalog), true);
        assert_eq!(result.issues[0].severity, Severity::Error);
    }

    #[test]
    fn skipped_without_metadata() {
        assert!(run(UnknownServiceCheck::new(), None, true).is_clean());
        let empty = ServiceCatalog::new();
        assert!(run(UnknownServiceCheck::new(), Some(&empty), true).is_clean());
        assert!(run(ServiceContactCheck::new(), Some(&empty), true).is_clean());
    }

    #[test]
    fn service_without_contact_is_warned() {
        let catalog = parse_services(
            "api:\n  contact:\n    slack: '#api'\nweb: {}\nbatch:\n  owners: [alice]\n",
            "x",
        )
        .unwrap();
        let result = run(ServiceContactCheck::new(), Some(&catalog), true);

        assert_eq!(result.issues.len(), 1);
        let issue = &result.issues[0];
        assert_eq!(issue.code, IssueCode::ServiceHasNoContact);
        assert_eq!(issue.severity, Severity::Warn);
        assert!(issue.message.contains("'web'"));
        assert!(issue.location.is_none());
    }

    #[test]
    fn empty_contact_fields_are_warned() {
        let catalog =
            parse_services("api:\n  contact:\n    slack: ''\n    email: ''\n", "x").unwrap();
        let result = run(ServiceContactCheck::new(), Some(&catalog), false);

        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].code, IssueCode::ServiceHasNoContact);
        assert!(result.issues[0].message.contains("'api'"));
    }
}
