//! Options of one beta diversity run.

use crate::error::BetaDiversityError;
use crate::metrics::{MetricHandle, MetricRegistry};
use std::path::{Path, PathBuf};

/// Configuration for [single_file_beta](crate::batch::single_file_beta) and
/// [multiple_file_beta](crate::batch::multiple_file_beta).
///
/// # Configuration
/// * `with_tree(path)` - Newick file, required by tree-based metrics
/// * `with_rows(ids)` - only compute distances from these samples
///   (comma-separated) to all samples
/// * `with_full_tree()` - the tree holds exactly the table's taxa, skip pruning
///
/// # Example
/// ```
/// use betadiv::config::BetaConfig;
///
/// let config = BetaConfig::new("bray_curtis,unweighted_unifrac", "beta_out")
///     .unwrap()
///     .with_tree("rep_set.tre")
///     .with_rows("S1,S3");
///
/// assert_eq!(config.metrics(), ["bray_curtis", "unweighted_unifrac"]);
/// assert_eq!(config.rows().unwrap(), ["S1", "S3"]);
/// assert!(!config.full_tree());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BetaConfig {
    metrics: Vec<String>,
    output_dir: PathBuf,
    tree_path: Option<PathBuf>,
    rows: Option<Vec<String>>,
    full_tree: bool,
}

impl BetaConfig {
    /// Creates a configuration from a comma-separated metric list.
    ///
    /// # Errors
    /// [BetaDiversityError::EmptyMetricList] if the list or one of its
    /// entries is empty.
    pub fn new<P: AsRef<Path>>(metrics: &str, output_dir: P) -> Result<Self, BetaDiversityError> {
        let metrics: Vec<String> = metrics.split(',').map(|m| m.trim().to_string()).collect();
        if metrics.iter().any(String::is_empty) {
            return Err(BetaDiversityError::EmptyMetricList);
        }

        Ok(Self {
            metrics,
            output_dir: output_dir.as_ref().to_path_buf(),
            tree_path: None,
            rows: None,
            full_tree: false,
        })
    }

    /// Sets the Newick tree file.
    pub fn with_tree<P: AsRef<Path>>(mut self, tree_path: P) -> Self {
        self.tree_path = Some(tree_path.as_ref().to_path_buf());
        self
    }

    /// Restricts output to the given comma-separated sample ids.
    pub fn with_rows(mut self, rows: &str) -> Self {
        self.rows = Some(rows.split(',').map(|r| r.trim().to_string()).collect());
        self
    }

    /// Declares the tree minimal for the tables, so it is not pruned.
    pub fn with_full_tree(mut self) -> Self {
        self.full_tree = true;
        self
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn tree_path(&self) -> Option<&Path> {
        self.tree_path.as_deref()
    }

    pub fn rows(&self) -> Option<&[String]> {
        self.rows.as_deref()
    }

    pub fn full_tree(&self) -> bool {
        self.full_tree
    }

    /// Resolves every metric and checks that tree-based ones have a tree.
    ///
    /// # Errors
    /// * [BetaDiversityError::UnknownMetric] - first name resolving nowhere
    /// * [BetaDiversityError::MissingTree] - tree-based metric but no tree path
    pub fn validate(
        &self,
        registry: &MetricRegistry,
    ) -> Result<Vec<MetricHandle>, BetaDiversityError> {
        self.metrics
            .iter()
            .map(|metric| {
                let handle = registry.resolve(metric)?;
                if handle.is_phylogenetic() && self.tree_path.is_none() {
                    return Err(BetaDiversityError::MissingTree { metric: metric.clone() });
                }
                Ok(handle)
            })
            .collect()
    }
}
