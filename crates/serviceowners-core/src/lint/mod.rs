//! Linting for SERVICEOWNERS rule sets.
//!
//! The default checks are cheap and need only the rules and, optionally,
//! service metadata. The file-based checks (`check_matches`,
//! `check_overlaps`) are opt-in and need a [`FileLister`].
//!
//! # Example
//!
//! ```rust
//! use serviceowners_core::lint::{IssueCode, LintOptions, lint};
//! use serviceowners_core::parse::parse_rules;
//!
//! let rules = parse_rules("src/** api\nsrc/** web\n", "SERVICEOWNERS").unwrap();
//! let result = lint(&rules, None, &LintOptions::default(), None).unwrap();
//!
//! assert_eq!(result.issues.len(), 1);
//! assert_eq!(result.issues[0].code, IssueCode::DuplicatePattern);
//! ```

pub mod checks;
mod issue;

pub use issue::{Issue, IssueCode, LintResult, Location, Severity};

use crate::files::FileLister;
use crate::ruleset::RuleSet;
use crate::services::ServiceCatalog;
use checks::{CheckContext, CheckRunner};
use log::{debug, warn};
use thiserror::Error;

/// Options controlling which checks run and how strictly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LintOptions {
    /// Escalate escalatable warnings to errors.
    pub strict: bool,
    /// Report patterns matching no tracked file.
    pub check_matches: bool,
    /// Report tracked files owned by more than one service's rules.
    pub check_overlaps: bool,
}

impl LintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict(mut self, value: bool) -> Self {
        self.strict = value;
        self
    }

    pub fn with_check_matches(mut self, value: bool) -> Self {
        self.check_matches = value;
        self
    }

    pub fn with_check_overlaps(mut self, value: bool) -> Self {
        self.check_overlaps = value;
        self
    }
}

/// A configuration error that prevents linting altogether.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LintError {
    /// A file-based check was requested but no file lister was given.
    #[error("the '{check}' check requires a file lister")]
    MissingFileLister { check: &'static str },
}

/// Lints `rules` against optional service metadata.
///
/// Checks run in a fixed order: duplicate patterns, unknown services,
/// services without contact, then the opt-in file checks. The tracked file
/// list is fetched at most once. If the lister fails, a
/// `FILE_LISTING_FAILED` error is reported and the file checks run against
/// an empty list.
pub fn lint(
    rules: &RuleSet,
    services: Option<&ServiceCatalog>,
    options: &LintOptions,
    file_lister: Option<&dyn FileLister>,
) -> Result<LintResult, LintError> {
    let runner = CheckRunner::for_options(options);
    let mut result = LintResult::new();

    let file_checks = runner.file_checks();
    let tracked_files = match (file_checks.first(), file_lister) {
        (None, _) => Vec::new(),
        (Some(&check), None) => return Err(LintError::MissingFileLister { check }),
        (Some(_), Some(lister)) => match lister.list_files() {
            Ok(files) => {
                debug!("Linting against {} tracked files", files.len());
                files
            }
            Err(e) => {
                warn!("File listing failed: {}", e);
                result.push(
                    Issue::new(
                        Severity::Error,
                        IssueCode::FileListingFailed,
                        format!("Could not list tracked files: {}", e),
                    )
                    .with_hint("Run inside a git checkout or pass a valid repository root."),
                );
                Vec::new()
            }
        },
    };

    let ctx = CheckContext::new(rules, services, options, &tracked_files);
    result.merge(runner.run(&ctx));
    Ok(result)
}
