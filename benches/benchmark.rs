use betadiv::metrics::MetricRegistry;
use betadiv::model::{CountTable, PhyloTree};
use betadiv::newick::parse_str;
use betadiv::planner::{MetricInput, plan};
use criterion::{Criterion, criterion_group, criterion_main};
use ndarray::Array2;

const NUM_TAXA: usize = 256;
const NUM_SAMPLES: usize = 48;
const ROWS: &[&str] = &["S0", "S7"];

/// Sparse-ish deterministic counts, about a third of them zero.
fn synthetic_table() -> CountTable {
    let counts = Array2::from_shape_fn((NUM_TAXA, NUM_SAMPLES), |(t, s)| {
        let x = (t * 7919 + s * 104_729) % 97;
        if x % 3 == 0 { 0.0 } else { x as f64 }
    });
    CountTable::new(
        (0..NUM_SAMPLES).map(|s| format!("S{s}")).collect(),
        (0..NUM_TAXA).map(|t| format!("OTU{t}")).collect(),
        counts,
        None,
    )
    .unwrap()
}

/// Balanced binary tree over all taxa.
fn synthetic_tree() -> PhyloTree {
    let mut clades: Vec<String> =
        (0..NUM_TAXA).map(|t| format!("OTU{t}:0.{}", t % 9 + 1)).collect();
    while clades.len() > 1 {
        clades = clades
            .chunks(2)
            .map(|pair| match pair {
                [a, b] => format!("({a},{b}):0.05"),
                [a] => a.clone(),
                _ => unreachable!(),
            })
            .collect();
    }
    parse_str(format!("{};", clades[0])).unwrap()
}

fn strategies(c: &mut Criterion) {
    let table = synthetic_table();
    let tree = synthetic_tree();
    let input = MetricInput::new(&table, Some(&tree));
    let registry = MetricRegistry::global();
    let rows: Vec<String> = ROWS.iter().map(|r| r.to_string()).collect();

    let metrics = ["bray_curtis", "hellinger", "unweighted_unifrac", "weighted_normalized_unifrac"];
    for metric in metrics {
        let handle = registry.resolve(metric).unwrap();
        let full = plan(&handle, None, registry);
        let restricted = plan(&handle, Some(rows.as_slice()), registry);

        c.bench_function(&format!("{metric}/full"), |b| {
            b.iter(|| full.execute(&input).unwrap());
        });
        c.bench_function(&format!("{metric}/{:?}", restricted.strategy()), |b| {
            b.iter(|| restricted.execute(&input).unwrap());
        });
    }
}

fn tree_pruning(c: &mut Criterion) {
    let table = synthetic_table();
    let tree = synthetic_tree();
    let half: Vec<String> = table.taxon_names().iter().step_by(2).cloned().collect();

    c.bench_function("sub_tree/half", |b| {
        b.iter(|| tree.sub_tree(&half, true).unwrap());
    });
}

criterion_group!(regression, strategies, tree_pruning);
criterion_main!(regression);
