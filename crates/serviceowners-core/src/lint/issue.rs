//! Lint issue and result types.

use serde::Serialize;
use std::fmt::{self, Display};

/// The severity of a lint issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    /// Worth a look; does not fail a non-strict run.
    #[serde(rename = "WARN")]
    Warn,
    /// Fails the run.
    #[serde(rename = "ERROR")]
    Error,
}

impl Severity {
    /// `Error` when `strict`, otherwise `Warn`.
    pub fn escalated(strict: bool) -> Self {
        if strict { Self::Error } else { Self::Warn }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable identifier of an issue kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    DuplicatePattern,
    UnknownService,
    ServiceHasNoContact,
    PatternMatchesNothing,
    OverlappingRules,
    FileListingFailed,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::DuplicatePattern => "DUPLICATE_PATTERN",
            IssueCode::UnknownService => "UNKNOWN_SERVICE",
            IssueCode::ServiceHasNoContact => "SERVICE_HAS_NO_CONTACT",
            IssueCode::PatternMatchesNothing => "PATTERN_MATCHES_NOTHING",
            IssueCode::OverlappingRules => "OVERLAPPING_RULES",
            IssueCode::FileListingFailed => "FILE_LISTING_FAILED",
        }
    }
}

impl Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in a rule source an issue points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Source identifier of the rule.
    pub file: String,
    /// 1-based line of the rule.
    pub line: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    #[serde(flatten)]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Issue {
    /// Creates an issue with no location or hint.
    pub fn new(severity: Severity, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location: None,
            hint: None,
        }
    }

    /// Points the issue at a rule.
    pub fn at(mut self, file: impl Into<String>, line: usize) -> Self {
        self.location = Some(Location::new(file, line));
        self
    }

    /// Attaches a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warn
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.code)?;
        if let Some(location) = &self.location {
            write!(f, " {}", location)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// All issues found by a lint run, in check order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintResult {
    pub issues: Vec<Issue>,
}

impl LintResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if nothing was found.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(Issue::is_warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_warning())
    }

    /// Returns true if the run should fail: any error, or any warning when
    /// `strict`.
    pub fn fails(&self, strict: bool) -> bool {
        self.has_errors() || (strict && self.has_warnings())
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn merge(&mut self, other: LintResult) {
        self.issues.extend(other.issues);
    }
}

impl From<Vec<Issue>> for LintResult {
    fn from(issues: Vec<Issue>) -> Self {
        Self { issues }
    }
}
