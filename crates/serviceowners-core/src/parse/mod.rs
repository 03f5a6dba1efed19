//! Parser module for SERVICEOWNERS files.
//!
//! A SERVICEOWNERS file maps glob patterns to service names, one rule per
//! line. Blank lines and `#` comments are ignored.
//!
//! # Example
//!
//! ```rust
//! use serviceowners_core::parse::parse_rules;
//!
//! let input = r#"
//! # pattern     service
//! apps/api/**   api
//! *.md          docs   # docs live everywhere
//! "#;
//!
//! let rules = parse_rules(input, "SERVICEOWNERS").unwrap();
//! assert_eq!(rules.len(), 2);
//! ```

mod error;
mod lexer;
mod parser;

pub use error::ParseError;
pub use lexer::{is_blank_line, parse_columns, parse_comment_line, strip_inline_comment};
pub use parser::{DEFAULT_SOURCE, parse_rules, parse_rules_with_cache};
