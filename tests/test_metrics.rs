use approx::assert_abs_diff_eq;
use betadiv::metrics::{MetricFn, MetricRegistry, nonphylo, unifrac};
use betadiv::newick::parse_str;
use betadiv::{BetaDiversityError, list_known_metrics};
use ndarray::{Array2, array};

fn names(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn assert_symmetric_zero_diagonal(matrix: &Array2<f64>) {
    let n = matrix.nrows();
    assert_eq!(matrix.dim(), (n, n));
    for i in 0..n {
        assert_eq!(matrix[[i, i]], 0.0);
        for j in 0..n {
            assert_eq!(matrix[[i, j]], matrix[[j, i]]);
        }
    }
}

// ============= Tree-free metrics =============
#[test]
fn test_quantitative_metrics_known_values() {
    let data = array![[1.0, 2.0, 3.0], [3.0, 2.0, 1.0]];

    assert_abs_diff_eq!(
        nonphylo::dist_bray_curtis(data.view())[[0, 1]],
        1.0 / 3.0,
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(
        nonphylo::dist_euclidean(data.view())[[0, 1]],
        8f64.sqrt(),
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(nonphylo::dist_manhattan(data.view())[[0, 1]], 4.0, epsilon = 1e-12);
    assert_abs_diff_eq!(nonphylo::dist_soergel(data.view())[[0, 1]], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(nonphylo::dist_canberra(data.view())[[0, 1]], 1.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(nonphylo::dist_kulczynski(data.view())[[0, 1]], 1.0 / 3.0, epsilon = 1e-12);
}

#[test]
fn test_identical_samples_have_zero_distance() {
    let data = array![[4.0, 0.0, 1.0], [4.0, 0.0, 1.0]];

    assert_abs_diff_eq!(nonphylo::dist_bray_curtis(data.view())[[0, 1]], 0.0);
    assert_abs_diff_eq!(nonphylo::dist_morisita_horn(data.view())[[0, 1]], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(nonphylo::dist_pearson(data.view())[[0, 1]], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(nonphylo::dist_specprof(data.view())[[0, 1]], 0.0, epsilon = 1e-12);
}

#[test]
fn test_gower_scales_by_table_range() {
    let data = array![[0.0, 0.0], [1.0, 2.0], [2.0, 4.0]];
    let distances = nonphylo::dist_gower(data.view());

    assert_abs_diff_eq!(distances[[0, 1]], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(distances[[0, 2]], 2.0, epsilon = 1e-12);
}

#[test]
fn test_hellinger_of_disjoint_samples() {
    let data = array![[5.0, 0.0], [0.0, 2.0]];
    assert_abs_diff_eq!(
        nonphylo::dist_hellinger(data.view())[[0, 1]],
        2f64.sqrt(),
        epsilon = 1e-12
    );
}

#[test]
fn test_binary_metrics_known_values() {
    // a = 1, b = 2, c = 1, d = 0
    let data = array![[7.0, 0.0, 2.0, 1.0], [1.0, 3.0, 0.0, 0.0]];

    assert_abs_diff_eq!(nonphylo::binary_dist_jaccard(data.view())[[0, 1]], 0.75, epsilon = 1e-12);
    assert_abs_diff_eq!(
        nonphylo::binary_dist_sorensen_dice(data.view())[[0, 1]],
        0.6,
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(nonphylo::binary_dist_hamming(data.view())[[0, 1]], 3.0);
    assert_abs_diff_eq!(
        nonphylo::binary_dist_euclidean(data.view())[[0, 1]],
        3f64.sqrt(),
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(nonphylo::binary_dist_lennon(data.view())[[0, 1]], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(
        nonphylo::binary_dist_ochiai(data.view())[[0, 1]],
        1.0 - 1.0 / 6f64.sqrt(),
        epsilon = 1e-12
    );
}

#[test]
fn test_zero_denominators_give_zero() {
    let data = array![[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];

    for distances in [
        nonphylo::dist_bray_curtis(data.view()),
        nonphylo::dist_canberra(data.view()),
        nonphylo::dist_kulczynski(data.view()),
        nonphylo::dist_soergel(data.view()),
        nonphylo::binary_dist_jaccard(data.view()),
        nonphylo::binary_dist_sorensen_dice(data.view()),
    ] {
        assert_eq!(distances[[0, 1]], 0.0);
        assert!(distances.iter().all(|d| d.is_finite()));
    }
}

#[test]
fn test_every_registered_metric_is_symmetric_with_zero_diagonal() {
    let data = array![
        [10.0, 0.0, 3.0, 1.0],
        [2.0, 8.0, 0.0, 1.0],
        [0.0, 4.0, 7.0, 0.0],
        [5.0, 5.0, 5.0, 5.0]
    ];
    let taxa = names(&["OTU1", "OTU2", "OTU3", "OTU4"]);
    let samples = names(&["S1", "S2", "S3", "S4"]);
    let tree = parse_str("((OTU1:0.1,OTU2:0.2):0.3,(OTU3:0.4,OTU4:0.5):0.1);").unwrap();

    let registry = MetricRegistry::global();
    for name in list_known_metrics() {
        let handle = registry.resolve(&name).unwrap();
        let distances = match handle.func() {
            MetricFn::TreeFree(func) => func(data.view()),
            MetricFn::Phylogenetic(func) => func(data.view(), &taxa, &tree, &samples),
        };
        assert_symmetric_zero_diagonal(&distances);
        assert!(distances.iter().all(|d| d.is_finite()), "{name} is not finite");
    }
}

// ============= UniFrac =============
fn unifrac_inputs() -> (Array2<f64>, Vec<String>, Vec<String>) {
    let data = array![
        [1.0, 0.0, 0.0, 4.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 5.0, 0.0]
    ];
    // "X" is not in the tree and must not change any distance
    (data, names(&["A", "B", "C", "X"]), names(&["S1", "S2", "S3"]))
}

#[test]
fn test_unweighted_unifrac_known_values() {
    let (data, taxa, samples) = unifrac_inputs();
    let tree = parse_str("((A:1,B:1):1,C:2);").unwrap();
    let distances = unifrac::dist_unweighted_unifrac(data.view(), &taxa, &tree, &samples);

    assert_abs_diff_eq!(distances[[0, 1]], 2.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(distances[[0, 2]], 1.0, epsilon = 1e-12);
    assert_symmetric_zero_diagonal(&distances);
}

#[test]
fn test_weighted_unifrac_known_values() {
    let (data, taxa, samples) = unifrac_inputs();
    let tree = parse_str("((A:1,B:1):1,C:2);").unwrap();

    let weighted = unifrac::dist_weighted_unifrac(data.view(), &taxa, &tree, &samples);
    assert_abs_diff_eq!(weighted[[0, 1]], 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(weighted[[0, 2]], 4.0, epsilon = 1e-12);

    let normalized = unifrac::dist_weighted_normalized_unifrac(data.view(), &taxa, &tree, &samples);
    assert_abs_diff_eq!(normalized[[0, 1]], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(normalized[[0, 2]], 1.0, epsilon = 1e-12);
}

#[test]
fn test_unifrac_ignores_root_branch() {
    let (data, taxa, samples) = unifrac_inputs();
    let with_root_branch = parse_str("((A:1,B:1):1,C:2):50;").unwrap();
    let without = parse_str("((A:1,B:1):1,C:2);").unwrap();

    assert_eq!(
        unifrac::dist_unweighted_unifrac(data.view(), &taxa, &with_root_branch, &samples),
        unifrac::dist_unweighted_unifrac(data.view(), &taxa, &without, &samples)
    );
}

#[test]
fn test_one_sample_unifrac_equals_full_row() {
    let (data, taxa, samples) = unifrac_inputs();
    let tree = parse_str("((A:1,B:1):1,C:2);").unwrap();

    let full = unifrac::dist_unweighted_unifrac(data.view(), &taxa, &tree, &samples);
    let row = unifrac::one_sample_unweighted_unifrac(
        data.view(),
        &taxa,
        &tree,
        &samples,
        "S2",
    )
    .unwrap();
    assert_eq!(row, full.row(1));

    let full = unifrac::dist_weighted_unifrac(data.view(), &taxa, &tree, &samples);
    let row = unifrac::one_sample_weighted_unifrac(
        data.view(),
        &taxa,
        &tree,
        &samples,
        "S3",
    )
    .unwrap();
    assert_eq!(row, full.row(2));
}

#[test]
fn test_one_sample_unifrac_unknown_sample() {
    let (data, taxa, samples) = unifrac_inputs();
    let tree = parse_str("((A:1,B:1):1,C:2);").unwrap();

    let err = unifrac::one_sample_unweighted_unifrac(
        data.view(),
        &taxa,
        &tree,
        &samples,
        "S9",
    )
    .unwrap_err();
    assert!(matches!(err, BetaDiversityError::UnknownSample { sample } if sample == "S9"));
}
