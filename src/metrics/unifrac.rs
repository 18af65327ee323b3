//! UniFrac distances between samples on a phylogenetic tree.
//!
//! Sample abundances are pushed from the leaves up to every vertex; a pair
//! of samples is then compared branch by branch:
//! * unweighted: share of branch length leading to taxa of only one sample
//! * weighted: branch lengths weighted by the difference in relative abundance
//! * weighted normalized: weighted, scaled to `[0, 1]` by the root distances
//!   of the observed taxa
//!
//! Taxa absent from the tree contribute nothing, missing branch lengths count
//! as 0, and the branch above the root is ignored. Full matrices and single
//! rows are computed by the same pair function, so a row equals the
//! corresponding row of the full matrix exactly.

use crate::error::BetaDiversityError;
use crate::model::{PhyloTree, Vertex, sample_position};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Flavour of UniFrac.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Weighting {
    Unweighted,
    Weighted,
    WeightedNormalized,
}

// ============================================================================
// Metrics (pub)
// ============================================================================
pub fn dist_unweighted_unifrac(
    data: ArrayView2<'_, f64>,
    taxon_names: &[String],
    tree: &PhyloTree,
    _sample_names: &[String],
) -> Array2<f64> {
    UnifracContext::new(data, taxon_names, tree).full(Weighting::Unweighted)
}

pub fn dist_weighted_unifrac(
    data: ArrayView2<'_, f64>,
    taxon_names: &[String],
    tree: &PhyloTree,
    _sample_names: &[String],
) -> Array2<f64> {
    UnifracContext::new(data, taxon_names, tree).full(Weighting::Weighted)
}

pub fn dist_weighted_normalized_unifrac(
    data: ArrayView2<'_, f64>,
    taxon_names: &[String],
    tree: &PhyloTree,
    _sample_names: &[String],
) -> Array2<f64> {
    UnifracContext::new(data, taxon_names, tree).full(Weighting::WeightedNormalized)
}

/// Unweighted UniFrac from `sample` to every sample, in table order.
///
/// # Errors
/// [BetaDiversityError::UnknownSample] if `sample` is not in `sample_names`.
pub fn one_sample_unweighted_unifrac(
    data: ArrayView2<'_, f64>,
    taxon_names: &[String],
    tree: &PhyloTree,
    sample_names: &[String],
    sample: &str,
) -> Result<Array1<f64>, BetaDiversityError> {
    let row = sample_position(sample_names, sample)?;
    Ok(UnifracContext::new(data, taxon_names, tree).row(row, Weighting::Unweighted))
}

/// Weighted UniFrac from `sample` to every sample, in table order.
///
/// # Errors
/// [BetaDiversityError::UnknownSample] if `sample` is not in `sample_names`.
pub fn one_sample_weighted_unifrac(
    data: ArrayView2<'_, f64>,
    taxon_names: &[String],
    tree: &PhyloTree,
    sample_names: &[String],
    sample: &str,
) -> Result<Array1<f64>, BetaDiversityError> {
    let row = sample_position(sample_names, sample)?;
    Ok(UnifracContext::new(data, taxon_names, tree).row(row, Weighting::Weighted))
}

// ============================================================================
// Per-vertex abundances
// ============================================================================
/// Abundances of every sample at every vertex of the tree.
struct UnifracContext {
    /// Length of the branch above each vertex; 0 for the root
    branch_lengths: Vec<f64>,
    /// Distance of each vertex to the root
    root_distances: Vec<f64>,
    /// Whether each vertex is a leaf
    is_leaf: Vec<bool>,
    /// Summed counts below each vertex, `[sample, vertex]`
    counts: Array2<f64>,
    /// `counts` divided by the sample total
    proportions: Array2<f64>,
}

impl UnifracContext {
    fn new(data: ArrayView2<'_, f64>, taxon_names: &[String], tree: &PhyloTree) -> Self {
        let leaf_map = tree.leaf_index_map();
        let mapped: Vec<(usize, usize)> = taxon_names
            .iter()
            .enumerate()
            .filter_map(|(taxon, name)| leaf_map.get(name.as_str()).map(|&vertex| (taxon, vertex)))
            .collect();
        let post_order: Vec<usize> = tree.post_order_iter().map(Vertex::index).collect();

        let num_vertices = tree.num_vertices();
        let mut counts = Array2::zeros((data.nrows(), num_vertices));
        for (sample, mut row) in counts.rows_mut().into_iter().enumerate() {
            for &(taxon, vertex) in &mapped {
                row[vertex] += data[[sample, taxon]];
            }
            for &vertex in &post_order {
                if let Some(parent) = tree[vertex].parent() {
                    let below = row[vertex];
                    row[parent] += below;
                }
            }
        }

        let mut proportions = counts.clone();
        let root = tree.root_index();
        for mut row in proportions.rows_mut() {
            let total = row[root];
            if total > 0.0 {
                row /= total;
            }
        }

        let branch_lengths = tree
            .vertices()
            .iter()
            .map(|v| if v.is_root() { 0.0 } else { v.branch_length_or_zero() })
            .collect();

        Self {
            branch_lengths,
            root_distances: tree.distances_to_root(),
            is_leaf: tree.vertices().iter().map(Vertex::is_leaf).collect(),
            counts,
            proportions,
        }
    }

    fn num_samples(&self) -> usize {
        self.counts.nrows()
    }

    fn full(&self, weighting: Weighting) -> Array2<f64> {
        let n = self.num_samples();
        let mut distances = Array2::zeros((n, n));
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.pair(i, j, weighting);
                distances[[i, j]] = d;
                distances[[j, i]] = d;
            }
        }
        distances
    }

    fn row(&self, i: usize, weighting: Weighting) -> Array1<f64> {
        (0..self.num_samples())
            .map(|j| if i == j { 0.0 } else { self.pair(i, j, weighting) })
            .collect()
    }

    /// Distance between samples `i` and `j`; symmetric in its arguments.
    fn pair(&self, i: usize, j: usize, weighting: Weighting) -> f64 {
        match weighting {
            Weighting::Unweighted => self.unweighted(self.counts.row(i), self.counts.row(j)),
            Weighting::Weighted => self.weighted(self.proportions.row(i), self.proportions.row(j)),
            Weighting::WeightedNormalized => {
                let (x, y) = (self.proportions.row(i), self.proportions.row(j));
                let normalizer: f64 = self
                    .root_distances
                    .iter()
                    .zip(&self.is_leaf)
                    .zip(x.iter().zip(y))
                    .filter(|((_, leaf), _)| **leaf)
                    .map(|((distance, _), (a, b))| distance * (a + b))
                    .sum();
                if normalizer == 0.0 {
                    0.0
                } else {
                    self.weighted(x, y) / normalizer
                }
            }
        }
    }

    fn unweighted(&self, x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
        let (mut unique, mut observed) = (0.0, 0.0);
        for ((length, a), b) in self.branch_lengths.iter().zip(x).zip(y) {
            let (in_x, in_y) = (*a > 0.0, *b > 0.0);
            if in_x || in_y {
                observed += length;
                if in_x != in_y {
                    unique += length;
                }
            }
        }
        if observed == 0.0 { 0.0 } else { unique / observed }
    }

    fn weighted(&self, x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> f64 {
        self.branch_lengths
            .iter()
            .zip(x.iter().zip(y))
            .map(|(length, (a, b))| length * (a - b).abs())
            .sum()
    }
}
