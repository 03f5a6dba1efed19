//! File-level parser for SERVICEOWNERS sources.

use super::error::ParseError;
use super::lexer::{is_blank_line, parse_columns, parse_comment_line, strip_inline_comment};
use crate::pattern::PatternCache;
use crate::ruleset::{Rule, RuleSet};
use log::{debug, trace};

/// Default source identifier used when none is given.
pub const DEFAULT_SOURCE: &str = "SERVICEOWNERS";

/// Parses a SERVICEOWNERS source with a private pattern cache.
///
/// See [`parse_rules_with_cache`].
pub fn parse_rules(input: &str, source: &str) -> Result<RuleSet, ParseError> {
    parse_rules_with_cache(input, source, &PatternCache::new())
}

/// Parses a SERVICEOWNERS source into an ordered rule set.
///
/// Every non-blank, non-comment line must have exactly two columns:
/// `<pattern> <service>`. Parsing stops at the first invalid line. An input
/// with no rules yields an empty set.
pub fn parse_rules_with_cache(
    input: &str,
    source: &str,
    cache: &PatternCache,
) -> Result<RuleSet, ParseError> {
    debug!("Parsing {} ({} bytes)", source, input.len());
    let mut rules = RuleSet::default();

    for (line_idx, raw_line) in input.lines().enumerate() {
        let line_num = line_idx + 1;

        if is_blank_line(raw_line) || parse_comment_line(raw_line).is_ok() {
            continue;
        }

        let content = strip_inline_comment(raw_line);
        if is_blank_line(content) {
            continue;
        }

        // Any comment-free line splits into columns; a failure reads as zero.
        let columns = parse_columns(content).map_or_else(|_| Vec::new(), |(_, c)| c);

        let &[pattern, service] = columns.as_slice() else {
            debug!("Line {}: {} columns", line_num, columns.len());
            return Err(ParseError::column_count(
                source,
                line_num,
                columns.len(),
                raw_line,
            ));
        };

        let matcher = cache
            .get_or_compile(pattern)
            .map_err(|e| ParseError::invalid_pattern(source, line_num, e))?;

        trace!("Line {}: {} -> {}", line_num, pattern, service);
        rules.push(Rule::new(pattern, service, line_num, source, matcher));
    }

    debug!("Parsed {} rules from {}", rules.len(), source);
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternSyntaxError;

    #[test]
    fn parses_rules_in_order() {
        let input = "\
# Ownership map
src/**      platform

*.md        docs   # docs everywhere
apps/api/   api
";
        let rules = parse_rules(input, "SERVICEOWNERS").unwrap();
        assert_eq!(rules.len(), 3);

        let summary: Vec<_> = rules
            .iter()
            .map(|r| (r.pattern(), r.service(), r.line()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("src/**", "platform", 2),
                ("*.md", "docs", 4),
                ("apps/api/", "api", 5),
            ]
        );
        assert!(rules.iter().all(|r| r.source() == "SERVICEOWNERS"));
    }

    #[test]
    fn indented_lines_are_accepted() {
        let rules = parse_rules("\n\n        apps/api/** api\n        apps/web/** web\n", "x").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.rules()[1].line(), 4);
    }

    #[test]
    fn empty_input_is_valid() {
        assert!(parse_rules("", DEFAULT_SOURCE).unwrap().is_empty());
        assert!(parse_rules("# nothing yet\n\n", DEFAULT_SOURCE).unwrap().is_empty());
    }

    #[test]
    fn hash_inside_pattern_is_not_a_comment() {
        let rules = parse_rules("docs/#/faq web\n", DEFAULT_SOURCE).unwrap();
        assert_eq!(rules.rules()[0].pattern(), "docs/#/faq");
    }

    #[test]
    fn crlf_line_endings() {
        let rules = parse_rules("a/** one\r\nb/** two\r\n", DEFAULT_SOURCE).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.rules()[1].service(), "two");
    }

    #[test]
    fn unicode_whitespace_separates_columns() {
        let rules = parse_rules("src/**\u{2003}api\u{a0}\n", DEFAULT_SOURCE).unwrap();
        assert_eq!(rules.rules()[0].pattern(), "src/**");
        assert_eq!(rules.rules()[0].service(), "api");
    }

    #[test]
    fn single_column_is_an_error() {
        let err = parse_rules("src/**\n", DEFAULT_SOURCE).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ColumnCount {
                line: 1,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn three_columns_is_an_error() {
        let err = parse_rules("ok/** svc\nsrc/** api web\n", DEFAULT_SOURCE).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ColumnCount {
                line: 2,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn bad_pattern_is_wrapped_with_location() {
        let err = parse_rules("# header\n/ root\n", "owners.txt").unwrap_err();
        match err {
            ParseError::InvalidPattern { file, line, error } => {
                assert_eq!(file, "owners.txt");
                assert_eq!(line, 2);
                assert!(matches!(error, PatternSyntaxError::RepositoryRoot { .. }));
            }
            other => panic!("Expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn quotes_are_not_unescaped() {
        let rules = parse_rules("\"docs\" web\n", DEFAULT_SOURCE).unwrap();
        assert_eq!(rules.rules()[0].pattern(), "\"docs\"");
    }

    #[test]
    fn shared_cache_reuses_compilations() {
        let cache = PatternCache::new();
        parse_rules_with_cache("src/** a\nsrc/** b\n", "one", &cache).unwrap();
        parse_rules_with_cache("src/** c\n*.md d\n", "two", &cache).unwrap();
        assert_eq!(cache.len(), 2);
    }
}
