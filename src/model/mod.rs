//! Data model: phylogenetic trees and taxon count tables.
//!
//! * [PhyloTree] - rooted, possibly multifurcating tree using the arena
//!   pattern; vertices are referenced by [VertexIndex] only
//! * [Vertex] / [BranchLength] - vertex variants and non-negative lengths
//! * [CountTable] - taxon x sample counts with sample and taxon ids
//! * [DistanceMatrix] / [PartialMatrix] - computed distances

/// Taxon count table
pub mod count_table;
/// Full and partial distance matrices
pub mod distance_matrix;
/// Phylogenetic tree structure and operations
pub mod tree;
/// Tree vertex types (root, internal, leaf)
pub mod vertex;

pub use count_table::{CountTable, sample_position};
pub use distance_matrix::{DistanceMatrix, DistanceResult, PartialMatrix};
pub use tree::{PhyloTree, TreeError, VertexIndex};
pub use vertex::{BranchLength, Vertex};
