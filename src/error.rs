//! Crate-wide error type.

use crate::model::TreeError;
use crate::parser::ParsingError;
use crate::table::TableError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving metrics or computing distance matrices.
#[derive(Error, Debug)]
pub enum BetaDiversityError {
    /// Metric name resolves in neither registry
    #[error("Could not find metric {name}.\n\nKnown metrics are: {}", .known.join(", "))]
    UnknownMetric { name: String, known: Vec<String> },

    /// Tree-based metric requested without a tree
    #[error("metric {metric} requires a tree, but none found")]
    MissingTree { metric: String },

    /// Requested row id is not a sample of the table
    #[error("Sample '{sample}' not found in table")]
    UnknownSample { sample: String },

    /// Metric list contains no (or an empty) name
    #[error("Metric list is empty or contains an empty name")]
    EmptyMetricList,

    #[error("Failed to parse tree: {0}")]
    Parsing(#[from] ParsingError),

    #[error("Failed to read count table: {0}")]
    Table(#[from] TableError),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BetaDiversityError {
    /// Wraps an IO error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BetaDiversityError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for this crate.
pub type Result<T, E = BetaDiversityError> = std::result::Result<T, E>;
