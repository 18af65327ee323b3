//! Distance metrics and their registry.
//!
//! All metrics work on a sample-major matrix (`[sample, taxon]`) and return
//! a square, symmetric, zero-diagonal `[sample, sample]` matrix; they never
//! mutate their inputs.
//!
//! * [nonphylo] - tree-free metrics (`dist_*`, `binary_dist_*`)
//! * [unifrac] - tree-based UniFrac metrics and their row variants
//! * [registry] - name resolution across both, see [MetricRegistry]

pub mod nonphylo;
pub mod registry;
pub mod unifrac;

pub use registry::{MetricFn, MetricHandle, MetricRegistry};

use crate::error::BetaDiversityError;
use crate::model::PhyloTree;
use ndarray::{Array1, Array2, ArrayView2};

/// Tree-free metric: `f(samples x taxa) -> distances`.
pub type TreeFreeFn = fn(ArrayView2<'_, f64>) -> Array2<f64>;

/// Tree-based metric: `f(samples x taxa, taxon ids, tree, sample ids) -> distances`.
pub type PhyloFn = fn(ArrayView2<'_, f64>, &[String], &PhyloTree, &[String]) -> Array2<f64>;

/// Row metric: like [PhyloFn] plus a target sample id, returning the
/// distances from that sample to every sample in table order.
pub type RowMetricFn = fn(
    ArrayView2<'_, f64>,
    &[String],
    &PhyloTree,
    &[String],
    &str,
) -> Result<Array1<f64>, BetaDiversityError>;

/// Whether a metric's value for a pair of samples depends on the pair only.
///
/// This is a closed, explicitly assigned tag: only metrics registered as
/// [Locality::TableWide] have their rows taken from the full matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locality {
    /// Value for `(i, j)` depends on rows `i` and `j` only
    Pairwise,
    /// Value for `(i, j)` depends on statistics of the whole table
    TableWide,
}
