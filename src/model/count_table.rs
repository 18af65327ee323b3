//! Taxon x sample count table.

use crate::error::BetaDiversityError;
use crate::table::table_error::{TableError, TableErrorKind};
use ndarray::{Array2, ArrayView2};
use std::collections::HashSet;

/// Counts of taxa (rows) in samples (columns).
///
/// # Invariants
/// - `counts` has `taxon_names.len()` rows and `sample_names.len()` columns
/// - all counts are finite and non-negative
/// - sample ids are unique
/// - if present, `lineages` has one entry per taxon
///
/// Counts are stored taxon-major, as read. Metrics work on the transposed,
/// sample-major matrix obtained via [CountTable::sample_major].
#[derive(Debug, Clone, PartialEq)]
pub struct CountTable {
    sample_names: Vec<String>,
    taxon_names: Vec<String>,
    counts: Array2<f64>,
    lineages: Option<Vec<String>>,
}

impl CountTable {
    /// Creates a count table, checking all invariants.
    ///
    /// # Example
    /// ```
    /// use betadiv::model::CountTable;
    /// use ndarray::array;
    ///
    /// let table = CountTable::new(
    ///     vec!["S1".into(), "S2".into()],
    ///     vec!["OTU1".into(), "OTU2".into(), "OTU3".into()],
    ///     array![[1.0, 0.0], [2.0, 5.0], [0.0, 1.0]],
    ///     None,
    /// ).unwrap();
    ///
    /// assert_eq!(table.sample_major().dim(), (2, 3));
    /// ```
    pub fn new(
        sample_names: Vec<String>,
        taxon_names: Vec<String>,
        counts: Array2<f64>,
        lineages: Option<Vec<String>>,
    ) -> Result<Self, TableError> {
        let (rows, cols) = counts.dim();
        let lineage_mismatch = lineages.as_ref().is_some_and(|l| l.len() != taxon_names.len());
        if rows != taxon_names.len() || cols != sample_names.len() || lineage_mismatch {
            return Err(TableError::without_line(TableErrorKind::ShapeMismatch {
                rows,
                cols,
                taxa: taxon_names.len(),
                samples: sample_names.len(),
            }));
        }

        let mut seen = HashSet::with_capacity(sample_names.len());
        if let Some(duplicate) = sample_names.iter().find(|name| !seen.insert(name.as_str())) {
            let kind = TableErrorKind::DuplicateSample(duplicate.clone());
            return Err(TableError::without_line(kind));
        }

        if let Some(&bad) = counts.iter().find(|c| !c.is_finite() || **c < 0.0) {
            let kind = if bad.is_finite() {
                TableErrorKind::NegativeCount(bad)
            } else {
                TableErrorKind::InvalidCount(bad.to_string())
            };
            return Err(TableError::without_line(kind));
        }

        Ok(Self {
            sample_names,
            taxon_names,
            counts,
            lineages,
        })
    }

    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    pub fn taxon_names(&self) -> &[String] {
        &self.taxon_names
    }

    /// Returns the counts as stored, indexed `[taxon, sample]`.
    pub fn counts(&self) -> ArrayView2<'_, f64> {
        self.counts.view()
    }

    /// Returns the per-taxon lineage strings, if the table had any.
    pub fn lineages(&self) -> Option<&[String]> {
        self.lineages.as_deref()
    }

    pub fn num_samples(&self) -> usize {
        self.sample_names.len()
    }

    pub fn num_taxa(&self) -> usize {
        self.taxon_names.len()
    }

    /// Returns the column of the sample with exactly this id.
    pub fn sample_index(&self, sample: &str) -> Option<usize> {
        sample_position(&self.sample_names, sample).ok()
    }

    /// Returns a sample-major copy of the counts, indexed `[sample, taxon]`.
    pub fn sample_major(&self) -> Array2<f64> {
        self.counts.t().to_owned()
    }
}

/// Position of the sample with exactly this id (no trimming, case-sensitive).
///
/// # Errors
/// [BetaDiversityError::UnknownSample] if no id matches.
pub fn sample_position(sample_names: &[String], sample: &str) -> Result<usize, BetaDiversityError> {
    sample_names
        .iter()
        .position(|s| s == sample)
        .ok_or_else(|| BetaDiversityError::UnknownSample {
            sample: sample.to_string(),
        })
}
