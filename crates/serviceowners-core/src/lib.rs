//! ServiceOwners Core
//!
//! A library for mapping repository paths to the services that own them,
//! driven by a CODEOWNERS-like `SERVICEOWNERS` file.
//!
//! # Features
//!
//! - **Patterns**: Deterministic glob matching with a shareable compile cache
//! - **Ownership**: Last-match-wins resolution that keeps every candidate rule
//! - **Impact**: Group changed files by owning service, with unmapped files
//!   and overlaps called out
//! - **Lint**: Duplicate patterns, unknown services, unreachable services and
//!   (opt-in) dead or overlapping rules
//!
//! # Quick Start
//!
//! ```rust
//! use serviceowners_core::{OwnershipIndex, compute_impact, parse_rules};
//!
//! let input = r#"
//! # pattern        service
//! apps/api/**      api
//! apps/web/**      web
//! *.md             docs
//! "#;
//!
//! let index = OwnershipIndex::new(parse_rules(input, "SERVICEOWNERS").unwrap());
//!
//! let m = index.match_path("apps/api/README.md");
//! assert_eq!(m.service(), Some("docs"));
//! assert_eq!(m.candidates.len(), 2);
//!
//! let report = compute_impact(&index, ["apps/web/index.ts", "Makefile"]);
//! assert_eq!(report.impacted_services(), vec!["web"]);
//! assert_eq!(report.unmapped_files, vec!["Makefile"]);
//! ```
//!
//! # Modules
//!
//! - [`pattern`]: Glob compilation and the pattern cache
//! - [`parse`]: Parser for SERVICEOWNERS files
//! - [`ownership`]: Path resolution
//! - [`impact`]: Change impact reports
//! - [`lint`]: Rule set checks
//! - [`services`]: Service metadata (`services.yaml`)

pub mod bootstrap;
pub mod files;
#[cfg(feature = "generate")]
pub mod generate;
pub mod impact;
pub mod lint;
pub mod ownership;
pub mod parse;
pub mod paths;
pub mod pattern;
pub mod ruleset;
pub mod services;

// Re-export commonly used types at the crate root
pub use bootstrap::{bootstrap_from_codeowners, find_codeowners_file};
pub use files::{FileListError, FileLister, StaticFileList, WalkFileLister};
pub use impact::{ImpactReport, compute_impact};
pub use lint::{Issue, IssueCode, LintError, LintOptions, LintResult, Severity, lint};
pub use ownership::{Match, OwnershipIndex};
pub use parse::{ParseError, parse_rules, parse_rules_with_cache};
pub use paths::{normalize_paths, normalize_repo_path};
pub use pattern::{CompiledPattern, PatternCache, PatternSyntaxError, compile_pattern};
pub use ruleset::{Rule, RuleSet};
pub use services::{ServiceCatalog, ServicesError, load_services, parse_services};
