//! Computation planner: picks and runs the cheapest correct way to compute
//! a full or row-restricted distance matrix.
//!
//! | Rows requested | Metric                           | [Strategy]                  |
//! |----------------|----------------------------------|-----------------------------|
//! | no             | any                              | [Strategy::FullMatrix]      |
//! | yes            | [table-wide](Locality::TableWide)| [Strategy::FullThenSelect]  |
//! | yes            | tree-based with a row metric     | [Strategy::RowMetric]       |
//! | yes            | otherwise                        | [Strategy::Pairwise]        |
//!
//! # Example
//! ```
//! use betadiv::metrics::MetricRegistry;
//! use betadiv::model::CountTable;
//! use betadiv::planner::{plan, MetricInput, Strategy};
//! use ndarray::array;
//!
//! let table = CountTable::new(
//!     vec!["S1".into(), "S2".into(), "S3".into()],
//!     vec!["OTU1".into(), "OTU2".into()],
//!     array![[1.0, 0.0, 3.0], [2.0, 5.0, 0.0]],
//!     None,
//! ).unwrap();
//! let registry = MetricRegistry::global();
//! let handle = registry.resolve("bray_curtis").unwrap();
//! let rows = vec!["S2".to_string()];
//!
//! let plan = plan(&handle, Some(rows.as_slice()), registry);
//! assert_eq!(plan.strategy(), Strategy::Pairwise);
//!
//! let result = plan.execute(&MetricInput::new(&table, None)).unwrap();
//! assert_eq!(result.values().dim(), (1, 3));
//! ```

use crate::error::BetaDiversityError;
use crate::metrics::{Locality, MetricFn, MetricHandle, MetricRegistry, RowMetricFn};
use crate::model::{
    CountTable, DistanceMatrix, DistanceResult, PartialMatrix, PhyloTree, sample_position,
};
use ndarray::{Array2, ArrayView2, Axis};
use tracing::debug;

/// Prefix stripped from a registered key to derive the row metric name
const DIST_PREFIX: &str = "dist_";

/// Everything a metric may need, with counts already sample-major.
pub struct MetricInput<'a> {
    data: Array2<f64>,
    taxon_names: &'a [String],
    sample_names: &'a [String],
    tree: Option<&'a PhyloTree>,
}

impl<'a> MetricInput<'a> {
    /// Transposes the table's counts to sample-major and attaches the
    /// (prepared) tree, if any.
    pub fn new(table: &'a CountTable, tree: Option<&'a PhyloTree>) -> Self {
        Self {
            data: table.sample_major(),
            taxon_names: table.taxon_names(),
            sample_names: table.sample_names(),
            tree,
        }
    }

    /// Sample-major counts, `[sample, taxon]`.
    pub fn data(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn sample_names(&self) -> &[String] {
        self.sample_names
    }

    /// Positions of the requested samples, in requested order.
    ///
    /// # Errors
    /// [BetaDiversityError::UnknownSample] for the first id without exact match.
    pub fn sample_indices(&self, rows: &[String]) -> Result<Vec<usize>, BetaDiversityError> {
        rows.iter()
            .map(|row| sample_position(self.sample_names, row))
            .collect()
    }
}

/// How a distance result is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One call of the metric on the whole table
    FullMatrix,
    /// Whole table, then only the requested rows are kept
    FullThenSelect,
    /// One call of the row metric per requested row
    RowMetric,
    /// One call of the metric on a two-sample sub-table per requested row
    /// and sample
    Pairwise,
}

/// A chosen [Strategy] together with what is needed to execute it.
#[derive(Clone)]
pub struct Plan {
    strategy: Strategy,
    handle: MetricHandle,
    rows: Option<Vec<String>>,
    row_metric: Option<RowMetricFn>,
}

/// Chooses the strategy for `handle`, optionally restricted to `rows`.
pub fn plan(handle: &MetricHandle, rows: Option<&[String]>, registry: &MetricRegistry) -> Plan {
    let mut row_metric = None;
    let strategy = match rows {
        None => Strategy::FullMatrix,
        Some(_) if handle.locality() == Locality::TableWide => Strategy::FullThenSelect,
        Some(_) => {
            if handle.is_phylogenetic() {
                let metric_name = handle.key().strip_prefix(DIST_PREFIX).unwrap_or(handle.key());
                row_metric = registry.row_metric(metric_name);
            }
            if row_metric.is_some() {
                Strategy::RowMetric
            } else {
                Strategy::Pairwise
            }
        }
    };

    debug!(metric = handle.name(), ?strategy, "Chose computation strategy");

    Plan {
        strategy,
        handle: handle.clone(),
        rows: rows.map(<[String]>::to_vec),
        row_metric,
    }
}

impl Plan {
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn handle(&self) -> &MetricHandle {
        &self.handle
    }

    /// Runs the plan.
    ///
    /// # Errors
    /// * [BetaDiversityError::MissingTree] - tree-based metric without a tree
    /// * [BetaDiversityError::UnknownSample] - a requested row is not a sample
    pub fn execute(&self, input: &MetricInput<'_>) -> Result<DistanceResult, BetaDiversityError> {
        let Some(rows) = &self.rows else {
            return self.execute_full(input).map(DistanceResult::Full);
        };
        let tree = self.tree_for(input)?;

        let indices = input.sample_indices(rows)?;
        let n = input.sample_names.len();
        let mut values = Array2::zeros((indices.len(), n));

        match self.strategy {
            Strategy::FullMatrix | Strategy::FullThenSelect => {
                let full = self.call(input.data(), input, tree, input.sample_names)?;
                values = full.select(Axis(0), &indices);
            }
            Strategy::RowMetric => {
                if let (Some(row_metric), Some(tree)) = (self.row_metric, tree) {
                    for (mut target, row) in values.rows_mut().into_iter().zip(rows) {
                        let distances = row_metric(
                            input.data(),
                            input.taxon_names,
                            tree,
                            input.sample_names,
                            row,
                        )?;
                        target.assign(&distances);
                    }
                }
            }
            Strategy::Pairwise => {
                for (mut target, &i) in values.rows_mut().into_iter().zip(&indices) {
                    for j in 0..n {
                        let pair = input.data().select(Axis(0), &[i, j]);
                        let names = [input.sample_names[i].clone(), input.sample_names[j].clone()];
                        target[j] = self.call(pair.view(), input, tree, &names)?[[0, 1]];
                    }
                }
            }
        }

        Ok(DistanceResult::Partial(PartialMatrix::new(
            rows.clone(),
            input.sample_names.to_vec(),
            values,
        )))
    }

    /// Computes the full matrix, ignoring any row restriction.
    ///
    /// # Errors
    /// [BetaDiversityError::MissingTree] for a tree-based metric without a tree.
    pub fn execute_full(
        &self,
        input: &MetricInput<'_>,
    ) -> Result<DistanceMatrix, BetaDiversityError> {
        let tree = self.tree_for(input)?;
        let values = self.call(input.data(), input, tree, input.sample_names)?;
        Ok(DistanceMatrix::new(input.sample_names.to_vec(), values))
    }

    /// Returns the input's tree, which must be present for tree-based metrics.
    fn tree_for<'a>(
        &self,
        input: &MetricInput<'a>,
    ) -> Result<Option<&'a PhyloTree>, BetaDiversityError> {
        match (self.handle.is_phylogenetic(), input.tree) {
            (true, None) => Err(BetaDiversityError::MissingTree {
                metric: self.handle.name().to_string(),
            }),
            (_, tree) => Ok(tree),
        }
    }

    /// Calls the resolved metric on `data` (sample-major).
    fn call(
        &self,
        data: ArrayView2<'_, f64>,
        input: &MetricInput<'_>,
        tree: Option<&PhyloTree>,
        sample_names: &[String],
    ) -> Result<Array2<f64>, BetaDiversityError> {
        match (self.handle.func(), tree) {
            (MetricFn::TreeFree(func), _) => Ok(func(data)),
            (MetricFn::Phylogenetic(func), Some(tree)) => {
                Ok(func(data, input.taxon_names, tree, sample_names))
            }
            (MetricFn::Phylogenetic(_), None) => Err(BetaDiversityError::MissingTree {
                metric: self.handle.name().to_string(),
            }),
        }
    }
}
