//! Betadiv computes beta diversity: distance matrices between samples of a
//! taxon count table, optionally using a phylogenetic tree relating the taxa.
//!
//! Core functionality provided:
//! - Metric registry: user-typed metric names are resolved case-insensitively
//!   against a tree-free registry first and a tree-based (UniFrac) registry
//!   second. See [MetricRegistry].
//! - Computation planner: distances for all pairs, or only from some
//!   requested samples to all samples, using the cheapest correct strategy
//!   (full matrix, full matrix then selected rows, row metric, or pairwise
//!   sub-tables). See [planner].
//! - Tree preparation: reference trees are pruned to the table's taxa unless
//!   declared minimal. See [prepare].
//! - Drivers: one table file or a whole directory of them, one output file
//!   per metric. See [batch].
//! - Formats:
//!   - Count tables: tab-delimited, taxa as rows, samples as columns,
//!     optional lineage column. See [table].
//!   - Trees: Newick, multifurcating, internal labels kept. See [newick].
//!   - Output: tab-delimited matrices with sample ids as headers.
//!
//! # Usage patterns
//! 1. The quick API below covers the common cases with default settings.
//! 2. For control over the steps, combine [table::parse_count_table],
//!    [newick::parse_str], [prepare::prepare_tree] and [planner::plan].
//!
//! ## Example Quick API
//! ```
//! use betadiv::{distance_matrix, parse_count_table_str};
//!
//! let table = parse_count_table_str("\tS1\tS2\tS3\nOTU1\t1\t0\t2\nOTU2\t3\t4\t0\n").unwrap();
//! let matrix = distance_matrix(&table, "bray_curtis", None).unwrap();
//!
//! assert_eq!(matrix.sample_names(), ["S1", "S2", "S3"]);
//! assert_eq!(matrix.get(0, 1), 0.25);
//! ```
//!
//! ## Example Run Configuration
//! ```no_run
//! use betadiv::batch::multiple_file_beta;
//! use betadiv::config::BetaConfig;
//!
//! let config = BetaConfig::new("bray_curtis,weighted_unifrac", "beta_div")?
//!     .with_tree("rep_set.tre")
//!     .with_rows("S1,S2");
//! let written = multiple_file_beta("otu_tables", &config)?;
//! println!("Wrote {} distance files", written.len());
//! # Ok::<(), betadiv::error::BetaDiversityError>(())
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod newick;
pub mod parser;
pub mod planner;
pub mod prepare;
pub mod table;

pub use crate::error::BetaDiversityError;
pub use crate::metrics::MetricRegistry;

use crate::model::{CountTable, DistanceMatrix, PhyloTree};
use crate::planner::MetricInput;
use crate::table::TableError;

// ============================================================================
// Quick API
// ============================================================================
/// Computes the full distance matrix of a metric for a table.
///
/// The tree, if given, is pruned to the table's taxa first.
///
/// # Errors
/// * [BetaDiversityError::UnknownMetric] - unknown metric name
/// * [BetaDiversityError::MissingTree] - tree-based metric without a tree
/// * [BetaDiversityError::Tree] - no table taxon is in the tree
pub fn distance_matrix(
    table: &CountTable,
    metric: &str,
    tree: Option<&PhyloTree>,
) -> Result<DistanceMatrix, BetaDiversityError> {
    let registry = MetricRegistry::global();
    let handle = registry.resolve(metric)?;
    let prepared = match tree {
        Some(tree) if handle.is_phylogenetic() => {
            Some(prepare::prepare_tree(tree, table.taxon_names(), false)?)
        }
        _ => None,
    };

    let input = MetricInput::new(table, prepared.as_deref());
    planner::plan(&handle, None, registry).execute_full(&input)
}

/// Parses a count table from a string, see [table::parse_count_table].
pub fn parse_count_table_str<S: AsRef<str>>(table: S) -> Result<CountTable, TableError> {
    table::parse_count_table(table.as_ref().as_bytes())
}

/// Returns the names of all known metrics, tree-free first.
pub fn list_known_metrics() -> Vec<String> {
    MetricRegistry::global().list_known_metrics()
}
