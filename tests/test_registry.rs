use betadiv::metrics::{Locality, MetricRegistry, nonphylo, unifrac};
use betadiv::{BetaDiversityError, list_known_metrics};
use ndarray::{Array2, ArrayView2};

const TREE_FREE: [&str; 20] = [
    "binary_chisq",
    "binary_euclidean",
    "binary_hamming",
    "binary_jaccard",
    "binary_lennon",
    "binary_ochiai",
    "binary_pearson",
    "binary_sorensen_dice",
    "bray_curtis",
    "canberra",
    "chisq",
    "euclidean",
    "gower",
    "hellinger",
    "kulczynski",
    "manhattan",
    "morisita_horn",
    "pearson",
    "soergel",
    "specprof",
];

const TREE_BASED: [&str; 3] = [
    "unweighted_unifrac",
    "weighted_normalized_unifrac",
    "weighted_unifrac",
];

#[test]
fn test_known_metrics_lists_tree_free_then_tree_based() {
    let expected: Vec<&str> = TREE_FREE.iter().chain(&TREE_BASED).copied().collect();
    assert_eq!(list_known_metrics(), expected);
}

#[test]
fn test_classification_of_every_known_metric() {
    let registry = MetricRegistry::global();
    for name in TREE_FREE {
        assert!(!registry.resolve(name).unwrap().is_phylogenetic(), "{name}");
    }
    for name in TREE_BASED {
        assert!(registry.resolve(name).unwrap().is_phylogenetic(), "{name}");
    }
}

#[test]
fn test_resolution_is_case_insensitive() {
    let registry = MetricRegistry::global();
    assert_eq!(
        registry.resolve("Bray_Curtis").unwrap(),
        registry.resolve("bray_curtis").unwrap()
    );
    assert_eq!(registry.resolve("UNWEIGHTED_UNIFRAC").unwrap().key(), "dist_unweighted_unifrac");
}

#[test]
fn test_handle_keeps_requested_name() {
    let handle = MetricRegistry::global().resolve("Bray_Curtis").unwrap();
    assert_eq!(handle.name(), "Bray_Curtis");
    assert_eq!(handle.key(), "dist_bray_curtis");
}

#[test]
fn test_binary_names_use_substitution() {
    let registry = MetricRegistry::global();
    let handle = registry.resolve("binary_sorensen_dice").unwrap();
    assert_eq!(handle.key(), "binary_dist_sorensen_dice");
    assert!(!handle.is_phylogenetic());
}

#[test]
fn test_registered_keys_resolve_directly() {
    let registry = MetricRegistry::global();
    assert_eq!(registry.resolve("dist_canberra").unwrap().key(), "dist_canberra");
    assert_eq!(registry.resolve("binary_dist_jaccard").unwrap().key(), "binary_dist_jaccard");
}

#[test]
fn test_table_wide_metrics_are_exactly_the_whitelist() {
    let registry = MetricRegistry::global();
    let table_wide: Vec<&str> = TREE_FREE
        .iter()
        .copied()
        .filter(|name| registry.resolve(name).unwrap().is_row_decomposable())
        .collect();
    assert_eq!(table_wide, ["binary_chisq", "chisq", "gower", "hellinger"]);

    for name in TREE_BASED {
        assert_eq!(registry.resolve(name).unwrap().locality(), Locality::Pairwise);
    }
}

#[test]
fn test_unknown_metric_lists_known_metrics() {
    let err = MetricRegistry::global().resolve("not_a_real_metric").unwrap_err();
    match err {
        BetaDiversityError::UnknownMetric { name, known } => {
            assert_eq!(name, "not_a_real_metric");
            assert_eq!(known, list_known_metrics());
        }
        other => panic!("Unexpected error {other:?}"),
    }
}

#[test]
fn test_unknown_metric_message() {
    let err = MetricRegistry::global().resolve("nope").unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Could not find metric nope."));
    assert!(message.contains("bray_curtis, canberra"));
}

#[test]
fn test_row_metrics_exist_for_unifrac_only() {
    let registry = MetricRegistry::global();
    assert!(registry.row_metric("unweighted_unifrac").is_some());
    assert!(registry.row_metric("Weighted_UniFrac").is_some());
    assert!(registry.row_metric("weighted_normalized_unifrac").is_none());
    assert!(registry.row_metric("bray_curtis").is_none());
}

fn all_zeros(data: ArrayView2<'_, f64>) -> Array2<f64> {
    Array2::zeros((data.nrows(), data.nrows()))
}

#[test]
fn test_tree_free_registry_wins_over_tree_based() {
    let mut registry = MetricRegistry::new();
    registry.register_tree_based("dist_euclidean", unifrac::dist_unweighted_unifrac);
    registry.register_tree_free("dist_euclidean", nonphylo::dist_euclidean, Locality::Pairwise);

    assert!(!registry.resolve("euclidean").unwrap().is_phylogenetic());
}

#[test]
fn test_custom_registry() {
    let mut registry = MetricRegistry::new();
    assert!(registry.list_known_metrics().is_empty());

    registry.register_tree_free("dist_Nothing", all_zeros, Locality::Pairwise);
    let handle = registry.resolve("NOTHING").unwrap();
    assert_eq!(handle.key(), "dist_nothing");
    assert_eq!(registry.list_known_metrics(), ["nothing"]);
    assert!(registry.resolve("bray_curtis").is_err());
}
