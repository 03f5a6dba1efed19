//! Lexer and token parsers for SERVICEOWNERS files.
//!
//! This module contains nom-based parsers for comment lines and the
//! whitespace-separated columns of a rule line.

use nom::{
    IResult, Parser,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, space0},
    combinator::{all_consuming, rest},
    multi::many0,
    sequence::{preceded, terminated},
};

/// Characters that can appear in a column token.
fn is_column_char(c: char) -> bool {
    !c.is_whitespace()
}

fn whitespace(input: &str) -> IResult<&str, &str> {
    take_while(char::is_whitespace)(input)
}

/// Parses a complete comment line (optional whitespace + # + content).
pub fn parse_comment_line(input: &str) -> IResult<&str, &str> {
    (space0, char('#'), rest)
        .map(|(_, _, content)| content)
        .parse(input)
}

/// Checks if a line is blank (empty or only whitespace).
pub fn is_blank_line(input: &str) -> bool {
    input.trim().is_empty()
}

/// Removes a trailing inline comment from a rule line.
///
/// A `#` starts a comment only at the start of the line or after whitespace,
/// and never inside a quoted span, so patterns such as `docs/#/faq` survive.
pub fn strip_inline_comment(line: &str) -> &str {
    let mut in_quote = false;
    let mut prev: Option<char> = None;

    for (idx, c) in line.char_indices() {
        if c == '\'' || c == '"' {
            in_quote = !in_quote;
        }
        if c == '#' && !in_quote && prev.is_none_or(char::is_whitespace) {
            return line[..idx].trim_end();
        }
        prev = Some(c);
    }

    line.trim_end()
}

/// Splits a (comment-free) rule line into its whitespace-separated columns.
pub fn parse_columns(input: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(terminated(
        many0(preceded(whitespace, take_while1(is_column_char))),
        whitespace,
    ))
    .parse(input)
}
