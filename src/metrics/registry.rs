//! Registries of named distance metrics and tolerant name resolution.
//!
//! Three explicit namespaces, each an ordered map from registered key to
//! function:
//! * tree-free metrics (`dist_*`, `binary_dist_*`), each tagged with its
//!   [Locality]
//! * tree-based metrics (`dist_*`)
//! * row metrics (`one_sample_*`), one-sample-vs-all variants of tree-based
//!   metrics
//!
//! A user-typed name is resolved case-insensitively by trying, per registry
//! and tree-free first, the keys `dist_<name>`, `<name>` with `binary`
//! replaced by `binary_dist`, and `<name>` itself.

use crate::error::BetaDiversityError;
use crate::metrics::{Locality, PhyloFn, RowMetricFn, TreeFreeFn, nonphylo, unifrac};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Registry with all metrics of this crate, built on first use.
static DEFAULT_REGISTRY: OnceLock<MetricRegistry> = OnceLock::new();

/// Prefix of distance metric keys
const DIST_PREFIX: &str = "dist_";
/// Prefix of presence/absence distance metric keys
const BINARY_DIST_PREFIX: &str = "binary_dist_";
/// Prefix of row metric keys
const ROW_METRIC_PREFIX: &str = "one_sample_";

/// Callable of a resolved metric.
#[derive(Clone, Copy)]
pub enum MetricFn {
    /// Needs only the sample-major count matrix
    TreeFree(TreeFreeFn),
    /// Additionally needs taxon ids, a tree and the sample ids
    Phylogenetic(PhyloFn),
}

/// A metric name resolved against a [MetricRegistry].
#[derive(Clone)]
pub struct MetricHandle {
    name: String,
    key: String,
    func: MetricFn,
    locality: Locality,
}

impl MetricHandle {
    /// Name as requested by the user, used for output file names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key the name resolved to, e.g. `dist_bray_curtis`.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn func(&self) -> MetricFn {
        self.func
    }

    pub fn locality(&self) -> Locality {
        self.locality
    }

    /// Returns whether the metric needs a tree.
    pub fn is_phylogenetic(&self) -> bool {
        matches!(self.func, MetricFn::Phylogenetic(_))
    }

    /// Returns whether a row of this metric must be taken from the
    /// full-table computation, i.e. the metric is [Locality::TableWide].
    pub fn is_row_decomposable(&self) -> bool {
        self.locality == Locality::TableWide
    }
}

impl fmt::Debug for MetricHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricHandle")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("is_phylogenetic", &self.is_phylogenetic())
            .field("locality", &self.locality)
            .finish()
    }
}

impl PartialEq for MetricHandle {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.is_phylogenetic() == other.is_phylogenetic()
    }
}

/// Tree-free and tree-based metrics plus row metrics, by registered key.
///
/// # Example
/// ```
/// use betadiv::metrics::MetricRegistry;
///
/// let registry = MetricRegistry::global();
/// let handle = registry.resolve("Binary_Jaccard").unwrap();
/// assert_eq!(handle.key(), "binary_dist_jaccard");
/// assert!(!handle.is_phylogenetic());
///
/// assert!(registry.resolve("unweighted_unifrac").unwrap().is_phylogenetic());
/// assert!(registry.resolve("not_a_metric").is_err());
/// ```
#[derive(Clone, Default)]
pub struct MetricRegistry {
    tree_free: BTreeMap<String, (TreeFreeFn, Locality)>,
    tree_based: BTreeMap<String, PhyloFn>,
    row_metrics: BTreeMap<String, RowMetricFn>,
}

impl MetricRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry holding every metric of this crate.
    pub fn global() -> &'static MetricRegistry {
        DEFAULT_REGISTRY.get_or_init(MetricRegistry::with_defaults)
    }

    /// Creates a registry holding every metric of this crate.
    pub fn with_defaults() -> Self {
        use Locality::{Pairwise, TableWide};

        let mut registry = Self::new();

        registry.register_tree_free("dist_euclidean", nonphylo::dist_euclidean, Pairwise);
        registry.register_tree_free("dist_manhattan", nonphylo::dist_manhattan, Pairwise);
        registry.register_tree_free("dist_bray_curtis", nonphylo::dist_bray_curtis, Pairwise);
        registry.register_tree_free("dist_canberra", nonphylo::dist_canberra, Pairwise);
        registry.register_tree_free("dist_chisq", nonphylo::dist_chisq, TableWide);
        registry.register_tree_free("dist_gower", nonphylo::dist_gower, TableWide);
        registry.register_tree_free("dist_hellinger", nonphylo::dist_hellinger, TableWide);
        registry.register_tree_free("dist_kulczynski", nonphylo::dist_kulczynski, Pairwise);
        registry.register_tree_free("dist_morisita_horn", nonphylo::dist_morisita_horn, Pairwise);
        registry.register_tree_free("dist_pearson", nonphylo::dist_pearson, Pairwise);
        registry.register_tree_free("dist_soergel", nonphylo::dist_soergel, Pairwise);
        registry.register_tree_free("dist_specprof", nonphylo::dist_specprof, Pairwise);
        registry.register_tree_free("binary_dist_chisq", nonphylo::binary_dist_chisq, TableWide);
        registry.register_tree_free(
            "binary_dist_euclidean",
            nonphylo::binary_dist_euclidean,
            Pairwise,
        );
        registry.register_tree_free("binary_dist_hamming", nonphylo::binary_dist_hamming, Pairwise);
        registry.register_tree_free("binary_dist_jaccard", nonphylo::binary_dist_jaccard, Pairwise);
        registry.register_tree_free("binary_dist_lennon", nonphylo::binary_dist_lennon, Pairwise);
        registry.register_tree_free("binary_dist_ochiai", nonphylo::binary_dist_ochiai, Pairwise);
        registry.register_tree_free("binary_dist_pearson", nonphylo::binary_dist_pearson, Pairwise);
        registry.register_tree_free(
            "binary_dist_sorensen_dice",
            nonphylo::binary_dist_sorensen_dice,
            Pairwise,
        );

        registry.register_tree_based("dist_unweighted_unifrac", unifrac::dist_unweighted_unifrac);
        registry.register_tree_based("dist_weighted_unifrac", unifrac::dist_weighted_unifrac);
        registry.register_tree_based(
            "dist_weighted_normalized_unifrac",
            unifrac::dist_weighted_normalized_unifrac,
        );

        registry.register_row_metric(
            "one_sample_unweighted_unifrac",
            unifrac::one_sample_unweighted_unifrac,
        );
        registry.register_row_metric(
            "one_sample_weighted_unifrac",
            unifrac::one_sample_weighted_unifrac,
        );

        registry
    }

    /// Registers a tree-free metric under `key` (stored lower-cased).
    pub fn register_tree_free(&mut self, key: &str, func: TreeFreeFn, locality: Locality) {
        self.tree_free.insert(key.to_lowercase(), (func, locality));
    }

    /// Registers a tree-based metric under `key` (stored lower-cased).
    pub fn register_tree_based(&mut self, key: &str, func: PhyloFn) {
        self.tree_based.insert(key.to_lowercase(), func);
    }

    /// Registers a row metric under `key` (stored lower-cased), by
    /// convention `one_sample_<metric name>`.
    pub fn register_row_metric(&mut self, key: &str, func: RowMetricFn) {
        self.row_metrics.insert(key.to_lowercase(), func);
    }

    /// Resolves a metric name, tree-free registry first.
    ///
    /// # Errors
    /// [BetaDiversityError::UnknownMetric] with the requested name and
    /// [`list_known_metrics()`](Self::list_known_metrics) if no lookup succeeds.
    pub fn resolve(&self, name: &str) -> Result<MetricHandle, BetaDiversityError> {
        let candidates = candidate_keys(name);

        let tree_free = candidates
            .iter()
            .find_map(|key| self.tree_free.get_key_value(key.as_str()))
            .map(|(key, &(func, locality))| (key, MetricFn::TreeFree(func), locality));
        let resolved = tree_free.or_else(|| {
            candidates
                .iter()
                .find_map(|key| self.tree_based.get_key_value(key.as_str()))
                .map(|(key, &func)| (key, MetricFn::Phylogenetic(func), Locality::Pairwise))
        });

        match resolved {
            Some((key, func, locality)) => Ok(MetricHandle {
                name: name.to_string(),
                key: key.clone(),
                func,
                locality,
            }),
            None => Err(BetaDiversityError::UnknownMetric {
                name: name.to_string(),
                known: self.list_known_metrics(),
            }),
        }
    }

    /// Returns the row metric `one_sample_<name>` (lower-cased), if registered.
    pub fn row_metric(&self, name: &str) -> Option<RowMetricFn> {
        let key = format!("{ROW_METRIC_PREFIX}{}", name.to_lowercase());
        self.row_metrics.get(&key).copied()
    }

    /// Returns the user-facing names of all metrics: sorted tree-free names
    /// (`dist_x` as `x`, `binary_dist_x` as `binary_x`) followed by sorted
    /// tree-based names (`dist_x` as `x`).
    pub fn list_known_metrics(&self) -> Vec<String> {
        let mut tree_free: Vec<String> = self
            .tree_free
            .keys()
            .filter_map(|key| {
                if let Some(rest) = key.strip_prefix(DIST_PREFIX) {
                    Some(rest.to_string())
                } else {
                    key.strip_prefix(BINARY_DIST_PREFIX).map(|rest| format!("binary_{rest}"))
                }
            })
            .collect();
        tree_free.sort();

        let mut tree_based: Vec<String> = self
            .tree_based
            .keys()
            .filter_map(|key| key.strip_prefix(DIST_PREFIX).map(str::to_string))
            .collect();
        tree_based.sort();

        tree_free.extend(tree_based);
        tree_free
    }
}

/// Keys tried for a user-typed name, in order.
fn candidate_keys(name: &str) -> [String; 3] {
    let lower = name.to_lowercase();
    [
        format!("{DIST_PREFIX}{lower}"),
        lower.replace("binary", "binary_dist"),
        lower,
    ]
}
