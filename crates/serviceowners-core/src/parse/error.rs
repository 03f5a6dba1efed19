//! Error types for SERVICEOWNERS parsing.

use crate::pattern::PatternSyntaxError;
use thiserror::Error;

/// An error that occurred while parsing a SERVICEOWNERS source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A rule line did not have exactly two columns.
    #[error("{file}:{line}: expected 2 columns: <pattern> <service>, found {found}: {raw:?}")]
    ColumnCount {
        /// The source identifier (usually a file path).
        file: String,
        /// The line number (1-based).
        line: usize,
        /// How many columns were found.
        found: usize,
        /// The raw line text.
        raw: String,
    },

    /// The pattern column could not be compiled.
    #[error("{file}:{line}: {error}")]
    InvalidPattern {
        /// The source identifier.
        file: String,
        /// The line number (1-based).
        line: usize,
        /// The underlying pattern error.
        #[source]
        error: PatternSyntaxError,
    },
}

impl ParseError {
    /// Creates a column count error.
    pub fn column_count(
        file: impl Into<String>,
        line: usize,
        found: usize,
        raw: impl Into<String>,
    ) -> Self {
        Self::ColumnCount {
            file: file.into(),
            line,
            found,
            raw: raw.into(),
        }
    }

    /// Creates an invalid pattern error.
    pub fn invalid_pattern(file: impl Into<String>, line: usize, error: PatternSyntaxError) -> Self {
        Self::InvalidPattern {
            file: file.into(),
            line,
            error,
        }
    }

    /// Returns the line number where this error occurred.
    pub fn line(&self) -> usize {
        match self {
            ParseError::ColumnCount { line, .. } => *line,
            ParseError::InvalidPattern { line, .. } => *line,
        }
    }

    /// Returns the source identifier of the file being parsed.
    pub fn file(&self) -> &str {
        match self {
            ParseError::ColumnCount { file, .. } => file,
            ParseError::InvalidPattern { file, .. } => file,
        }
    }
}
