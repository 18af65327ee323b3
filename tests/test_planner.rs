use approx::assert_abs_diff_eq;
use betadiv::BetaDiversityError;
use betadiv::metrics::MetricRegistry;
use betadiv::model::{CountTable, DistanceResult, PhyloTree};
use betadiv::newick::parse_str;
use betadiv::planner::{MetricInput, Strategy, plan};
use betadiv::prepare::prepare_tree;
use ndarray::array;

fn table() -> CountTable {
    CountTable::new(
        vec!["S1".into(), "S2".into(), "S3".into(), "S4".into()],
        vec!["OTU1".into(), "OTU2".into(), "OTU3".into(), "OTU4".into()],
        array![
            [10.0, 2.0, 0.0, 5.0],
            [0.0, 8.0, 4.0, 5.0],
            [3.0, 0.0, 7.0, 5.0],
            [1.0, 1.0, 0.0, 0.0]
        ],
        None,
    )
    .unwrap()
}

fn tree() -> PhyloTree {
    parse_str("((OTU1:0.1,OTU2:0.2):0.3,(OTU3:0.4,(OTU4:0.5,OTU5:0.6):0.1):0.2);").unwrap()
}

fn rows(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn partial_values(result: DistanceResult) -> ndarray::Array2<f64> {
    match result {
        DistanceResult::Partial(partial) => partial.values().to_owned(),
        DistanceResult::Full(_) => panic!("Expected a partial matrix"),
    }
}

// ============= Strategy selection =============
#[test]
fn test_strategy_selection() {
    let registry = MetricRegistry::global();
    let requested = rows(&["S1"]);
    let strategy = |metric: &str, rows: Option<&[String]>| {
        plan(&registry.resolve(metric).unwrap(), rows, registry).strategy()
    };

    assert_eq!(strategy("bray_curtis", None), Strategy::FullMatrix);
    assert_eq!(strategy("unweighted_unifrac", None), Strategy::FullMatrix);
    assert_eq!(strategy("chisq", Some(requested.as_slice())), Strategy::FullThenSelect);
    assert_eq!(strategy("binary_chisq", Some(requested.as_slice())), Strategy::FullThenSelect);
    assert_eq!(strategy("gower", Some(requested.as_slice())), Strategy::FullThenSelect);
    assert_eq!(strategy("hellinger", Some(requested.as_slice())), Strategy::FullThenSelect);
    assert_eq!(strategy("unweighted_unifrac", Some(requested.as_slice())), Strategy::RowMetric);
    assert_eq!(strategy("Weighted_UniFrac", Some(requested.as_slice())), Strategy::RowMetric);
    assert_eq!(
        strategy("weighted_normalized_unifrac", Some(requested.as_slice())),
        Strategy::Pairwise
    );
    assert_eq!(strategy("bray_curtis", Some(requested.as_slice())), Strategy::Pairwise);
}

// ============= Execution =============
#[test]
fn test_full_matrix() {
    let table = table();
    let registry = MetricRegistry::global();
    let handle = registry.resolve("bray_curtis").unwrap();

    let result = plan(&handle, None, registry).execute(&MetricInput::new(&table, None)).unwrap();
    match result {
        DistanceResult::Full(matrix) => {
            assert_eq!(matrix.sample_names(), ["S1", "S2", "S3", "S4"]);
            assert_eq!(matrix.values().dim(), (4, 4));
            assert_abs_diff_eq!(matrix.get(0, 1), 19.0 / 25.0, epsilon = 1e-12);
        }
        DistanceResult::Partial(_) => panic!("Expected a full matrix"),
    }
}

#[test]
fn test_table_wide_rows_are_identical_to_full_matrix_rows() {
    let table = table();
    let input = MetricInput::new(&table, None);
    let registry = MetricRegistry::global();

    for metric in ["chisq", "gower", "hellinger", "binary_chisq"] {
        let handle = registry.resolve(metric).unwrap();
        let full = plan(&handle, None, registry).execute_full(&input).unwrap();
        let requested = rows(&["S3", "S1"]);
        let planned = plan(&handle, Some(requested.as_slice()), registry);
        let partial = partial_values(planned.execute(&input).unwrap());

        assert_eq!(partial.row(0), full.values().row(2), "{metric}");
        assert_eq!(partial.row(1), full.values().row(0), "{metric}");
    }
}

#[test]
fn test_row_metric_equals_full_matrix_row() {
    let table = table();
    let tree = tree();
    let prepared = prepare_tree(&tree, table.taxon_names(), false).unwrap();
    let input = MetricInput::new(&table, Some(&*prepared));
    let registry = MetricRegistry::global();

    for metric in ["unweighted_unifrac", "weighted_unifrac"] {
        let handle = registry.resolve(metric).unwrap();
        let full = plan(&handle, None, registry).execute_full(&input).unwrap();
        let requested = rows(&["S2", "S4"]);
        let planned = plan(&handle, Some(requested.as_slice()), registry);
        let partial = partial_values(planned.execute(&input).unwrap());

        assert_eq!(partial.row(0), full.values().row(1), "{metric}");
        assert_eq!(partial.row(1), full.values().row(3), "{metric}");
    }
}

#[test]
fn test_pairwise_fallback_matches_full_matrix() {
    let table = table();
    let tree = tree();
    let prepared = prepare_tree(&tree, table.taxon_names(), false).unwrap();
    let input = MetricInput::new(&table, Some(&*prepared));
    let registry = MetricRegistry::global();

    for metric in ["bray_curtis", "binary_jaccard", "weighted_normalized_unifrac"] {
        let handle = registry.resolve(metric).unwrap();
        let full = plan(&handle, None, registry).execute_full(&input).unwrap();
        let requested = rows(&["S1", "S3"]);
        let planned = plan(&handle, Some(requested.as_slice()), registry);
        assert_eq!(planned.strategy(), Strategy::Pairwise);
        let partial = partial_values(planned.execute(&input).unwrap());

        for (r, &i) in [0, 2].iter().enumerate() {
            for j in 0..4 {
                assert_abs_diff_eq!(partial[[r, j]], full.get(i, j), epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn test_partial_matrix_keeps_requested_order_and_all_columns() {
    let table = table();
    let registry = MetricRegistry::global();
    let handle = registry.resolve("euclidean").unwrap();
    let requested = rows(&["S4", "S2"]);

    let result = plan(&handle, Some(requested.as_slice()), registry)
        .execute(&MetricInput::new(&table, None))
        .unwrap();
    let DistanceResult::Partial(partial) = result else {
        panic!("Expected a partial matrix");
    };
    assert_eq!(partial.row_names(), ["S4", "S2"]);
    assert_eq!(partial.col_names(), ["S1", "S2", "S3", "S4"]);
    assert_eq!(partial.values()[[0, 3]], 0.0);
    assert_eq!(partial.values()[[1, 1]], 0.0);
}

// ============= Errors =============
#[test]
fn test_unknown_requested_sample() {
    let table = table();
    let registry = MetricRegistry::global();
    let requested = rows(&["S1", "S99"]);

    for metric in ["bray_curtis", "chisq"] {
        let handle = registry.resolve(metric).unwrap();
        let err = plan(&handle, Some(requested.as_slice()), registry)
            .execute(&MetricInput::new(&table, None))
            .unwrap_err();
        assert!(matches!(err, BetaDiversityError::UnknownSample { ref sample } if sample == "S99"));
    }
}

#[test]
fn test_unknown_requested_sample_with_row_metric() {
    let table = table();
    let tree = tree();
    let registry = MetricRegistry::global();
    let handle = registry.resolve("unweighted_unifrac").unwrap();
    let requested = rows(&["Nope"]);

    let err = plan(&handle, Some(requested.as_slice()), registry)
        .execute(&MetricInput::new(&table, Some(&tree)))
        .unwrap_err();
    assert!(matches!(err, BetaDiversityError::UnknownSample { .. }));
}

#[test]
fn test_tree_based_metric_without_tree() {
    let table = table();
    let registry = MetricRegistry::global();
    let handle = registry.resolve("unweighted_unifrac").unwrap();

    let err = plan(&handle, None, registry)
        .execute(&MetricInput::new(&table, None))
        .unwrap_err();
    assert!(matches!(
        err,
        BetaDiversityError::MissingTree { ref metric } if metric == "unweighted_unifrac"
    ));

    let requested = rows(&["S1"]);
    let err = plan(&handle, Some(requested.as_slice()), registry)
        .execute(&MetricInput::new(&table, None))
        .unwrap_err();
    assert!(matches!(err, BetaDiversityError::MissingTree { .. }));
}
