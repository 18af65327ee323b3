//! Results of a distance computation: full or restricted to some rows.

use crate::table::writer::{format_distance_matrix, format_matrix};
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Square, symmetric, zero-diagonal distances aligned with `sample_names`.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    sample_names: Vec<String>,
    values: Array2<f64>,
}

impl DistanceMatrix {
    /// Creates a distance matrix.
    ///
    /// # Panics
    /// Panics if `values` is not `n x n` for `n` sample names.
    pub fn new(sample_names: Vec<String>, values: Array2<f64>) -> Self {
        let n = sample_names.len();
        assert_eq!(values.dim(), (n, n), "Distance matrix must be {n}x{n}");
        Self { sample_names, values }
    }

    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Returns the distance between the samples at positions `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }

    /// Returns the tab-delimited text form, sample ids as row and column headers.
    pub fn to_text(&self) -> String {
        format_distance_matrix(&self.sample_names, self.values.view())
    }
}

/// Distances from some requested samples (rows) to all samples (columns).
#[derive(Debug, Clone, PartialEq)]
pub struct PartialMatrix {
    row_names: Vec<String>,
    col_names: Vec<String>,
    values: Array2<f64>,
}

impl PartialMatrix {
    /// Creates a partial matrix.
    ///
    /// # Panics
    /// Panics if `values` is not `rows x cols` for the given names.
    pub fn new(row_names: Vec<String>, col_names: Vec<String>, values: Array2<f64>) -> Self {
        assert_eq!(
            values.dim(),
            (row_names.len(), col_names.len()),
            "Partial matrix shape must match its row and column names"
        );
        Self {
            row_names,
            col_names,
            values,
        }
    }

    pub fn row_names(&self) -> &[String] {
        &self.row_names
    }

    pub fn col_names(&self) -> &[String] {
        &self.col_names
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Iterates over `(row sample id, distances to all samples)`.
    pub fn rows(&self) -> impl Iterator<Item = (&str, ArrayView1<'_, f64>)> {
        self.row_names.iter().map(String::as_str).zip(self.values.rows())
    }

    pub fn to_text(&self) -> String {
        format_matrix(self.values.view(), &self.row_names, &self.col_names)
    }
}

/// Outcome of the computation planner.
#[derive(Debug, Clone, PartialEq)]
pub enum DistanceResult {
    Full(DistanceMatrix),
    Partial(PartialMatrix),
}

impl DistanceResult {
    pub fn values(&self) -> ArrayView2<'_, f64> {
        match self {
            DistanceResult::Full(matrix) => matrix.values(),
            DistanceResult::Partial(matrix) => matrix.values(),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            DistanceResult::Full(matrix) => matrix.to_text(),
            DistanceResult::Partial(matrix) => matrix.to_text(),
        }
    }
}
