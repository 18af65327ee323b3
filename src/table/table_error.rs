//! Error types for count tables.

use std::fmt;
use thiserror::Error;

/// Kinds of problems found in a count table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableErrorKind {
    #[error("IO error - {0}")]
    IoError(String),
    #[error("Table has no header line with sample ids")]
    MissingHeader,
    #[error("Table has no samples")]
    NoSamples,
    #[error("Expected {expected} fields but found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("Invalid count '{0}'")]
    InvalidCount(String),
    #[error("Negative count {0}")]
    NegativeCount(f64),
    #[error("Duplicate sample id '{0}'")]
    DuplicateSample(String),
    #[error("Counts have shape {rows}x{cols} but table has {taxa} taxa and {samples} samples")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        taxa: usize,
        samples: usize,
    },
}

/// Count table error, with the 1-based line it was found on (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct TableError {
    line: Option<usize>,
    kind: TableErrorKind,
}

impl TableError {
    /// Creates an error located at the given 1-based line.
    pub fn at_line(line: usize, kind: TableErrorKind) -> Self {
        Self { line: Some(line), kind }
    }

    /// Creates an error not tied to a line, e.g. from in-memory construction.
    pub fn without_line(kind: TableErrorKind) -> Self {
        Self { line: None, kind }
    }

    pub fn kind(&self) -> &TableErrorKind {
        &self.kind
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} on line {}", self.kind, line),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for TableError {}

impl From<std::io::Error> for TableError {
    fn from(err: std::io::Error) -> Self {
        Self::without_line(TableErrorKind::IoError(err.to_string()))
    }
}
