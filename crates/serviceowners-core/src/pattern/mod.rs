//! Pattern compilation for SERVICEOWNERS rules.
//!
//! Patterns are glob-style and segment oriented (`/` is the separator):
//!
//! - `*` matches any sequence of non-slash characters
//! - `**` matches any sequence including slashes; a leading `**/` segment also
//!   matches zero directories
//! - `?` matches exactly one non-slash character
//! - `[...]` is a character class, `[!...]` its negation
//! - a trailing `/` means "this directory and everything beneath it"
//! - patterns containing a `/` are anchored at the repository root, patterns
//!   without one match the final path segment at any depth

mod cache;

pub use cache::PatternCache;

use log::trace;
use regex::Regex;
use thiserror::Error;

/// An error produced when a pattern cannot be compiled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternSyntaxError {
    /// The pattern is empty after trimming.
    #[error("empty pattern")]
    Empty,

    /// The pattern resolves to the repository root (`/`).
    #[error("pattern '{pattern}' points to the repository root ('/'), which is not a file glob")]
    RepositoryRoot {
        /// The raw pattern text.
        pattern: String,
    },

    /// The translated pattern was rejected by the matcher engine.
    #[error("invalid pattern '{pattern}': {reason}")]
    Invalid {
        /// The raw pattern text.
        pattern: String,
        /// Why the pattern could not be rendered.
        reason: String,
    },
}

/// A compiled SERVICEOWNERS pattern that can match repository paths.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// The pattern as authored.
    raw: String,
    /// The pattern after normalization.
    normalized: String,
    /// The compiled matcher.
    regex: Regex,
}

impl CompiledPattern {
    /// Returns the pattern as authored.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the normalized pattern (leading `./` and `/` stripped, trailing
    /// `/` rewritten to `/**`).
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Returns true if this pattern matches basenames at any depth.
    pub fn is_basename(&self) -> bool {
        !self.normalized.contains('/')
    }

    /// Returns the regular expression this pattern was translated to.
    pub fn as_regex(&self) -> &str {
        self.regex.as_str()
    }

    /// Checks if this pattern matches the given path.
    ///
    /// The path should already be normalized: relative to the repository root
    /// with forward slashes.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Compiles a raw pattern into a matcher.
///
/// Compilation is a pure function of `raw`; use a [`PatternCache`] to share
/// compiled patterns between rules.
pub fn compile_pattern(raw: &str) -> Result<CompiledPattern, PatternSyntaxError> {
    let normalized = normalize_pattern(raw)?;
    let body = glob_to_regex(&normalized);

    let source = if normalized.contains('/') {
        format!("(?s)^{}$", body)
    } else {
        format!("(?s)^(?:.*/)?{}$", body)
    };
    trace!("Compiled pattern '{}' to /{}/", raw, source);

    let regex = Regex::new(&source).map_err(|e| PatternSyntaxError::Invalid {
        pattern: raw.to_string(),
        reason: e.to_string(),
    })?;

    Ok(CompiledPattern {
        raw: raw.to_string(),
        normalized,
        regex,
    })
}

/// Normalizes a raw pattern.
fn normalize_pattern(raw: &str) -> Result<String, PatternSyntaxError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PatternSyntaxError::Empty);
    }

    let pattern = trimmed.replace('\\', "/");

    let mut rest = pattern.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    let rest = rest.strip_prefix('/').unwrap_or(rest);

    let root = || PatternSyntaxError::RepositoryRoot {
        pattern: raw.to_string(),
    };

    if rest.is_empty() {
        return Err(root());
    }

    if rest.ends_with('/') {
        let dir = rest.trim_end_matches('/');
        if dir.is_empty() {
            return Err(root());
        }
        return Ok(format!("{}/**", dir));
    }

    Ok(rest.to_string())
}

/// Translates a normalized glob into an unanchored regex body.
fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                let start = i;
                while i + 1 < chars.len() && chars[i + 1] == '*' {
                    i += 1;
                }
                if i == start {
                    out.push_str("[^/]*");
                } else {
                    let starts_segment = start == 0 || chars[start - 1] == '/';
                    if starts_segment && chars.get(i + 1) == Some(&'/') {
                        // `**/` may also stand for no directory at all
                        out.push_str("(?:.*/)?");
                        i += 1;
                    } else {
                        out.push_str(".*");
                    }
                }
            }
            '?' => out.push_str("[^/]"),
            '[' => match translate_class(&chars[i..]) {
                Some((class, consumed)) => {
                    out.push_str(&class);
                    i += consumed - 1;
                }
                None => out.push_str(r"\["),
            },
            c => push_literal(&mut out, c),
        }
        i += 1;
    }

    out
}

/// Translates a character class starting at `chars[0] == '['`.
///
/// Returns the regex class and the number of glob characters consumed, or
/// `None` when the class is unterminated.
fn translate_class(chars: &[char]) -> Option<(String, usize)> {
    let mut j = 1;
    let negated = matches!(chars.get(j), Some('!') | Some('^'));
    if negated {
        j += 1;
    }
    let body_start = j;

    while j < chars.len() && chars[j] != ']' {
        j += 1;
    }
    if j >= chars.len() {
        return None;
    }

    let mut class = String::from("[");
    if negated {
        class.push('^');
    }
    for &c in &chars[body_start..j] {
        match c {
            // class-set syntax of the regex engine
            '\\' | '[' | '&' | '~' | '^' => {
                class.push('\\');
                class.push(c);
            }
            _ => class.push(c),
        }
    }
    class.push(']');

    Some((class, j + 1))
}

fn push_literal(out: &mut String, c: char) {
    let mut buf = [0u8; 4];
    out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}
