//! Command line interface: beta diversity distance matrices for one count
//! table or a directory of them.

use anyhow::{Context, Result, bail};
use betadiv::batch::{multiple_file_beta, single_file_beta};
use betadiv::config::BetaConfig;
use betadiv::list_known_metrics;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "beta_diversity")]
#[command(author, version, about = "Beta diversity distance matrices from taxon count tables")]
#[command(long_about = "Compute distance matrices between the samples of taxon count tables.

The input is a tab-delimited table (taxa as rows, samples as columns) or a
directory of such tables. One output file per metric and input table is
written to the output directory.

Examples:
  beta_diversity -i otu_table.txt -m bray_curtis,unweighted_unifrac -t rep_set.tre -o beta_div
  beta_diversity -i otu_tables/ -m weighted_unifrac -t rep_set.tre -o beta_div -r S1,S2
  beta_diversity -s")]
struct Cli {
    /// Count table, or directory of count tables (hidden files are skipped)
    #[arg(short, long, required_unless_present = "show_metrics")]
    input_path: Option<PathBuf>,

    /// Output directory, created if needed
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Comma-separated metric names (see --show-metrics)
    #[arg(short, long, default_value = "unweighted_unifrac,weighted_unifrac")]
    metrics: String,

    /// Newick tree, required by tree-based metrics
    #[arg(short, long)]
    tree_path: Option<PathBuf>,

    /// Only compute distances from these comma-separated sample ids to all samples
    #[arg(short, long)]
    rows: Option<String>,

    /// Tree holds exactly the table's taxa, skip pruning
    #[arg(short, long)]
    full_tree: bool,

    /// Print known metric names and exit
    #[arg(short, long)]
    show_metrics: bool,

    /// Log debug messages
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.show_metrics {
        println!("Known metrics are: {}", list_known_metrics().join(", "));
        return Ok(());
    }

    let Some(input_path) = cli.input_path else {
        bail!("--input-path is required");
    };

    let mut config = BetaConfig::new(&cli.metrics, &cli.output_dir).context("Invalid metric list")?;
    if let Some(tree_path) = &cli.tree_path {
        config = config.with_tree(tree_path);
    }
    if let Some(rows) = &cli.rows {
        config = config.with_rows(rows);
    }
    if cli.full_tree {
        config = config.with_full_tree();
    }

    let written = if input_path.is_dir() {
        multiple_file_beta(&input_path, &config)
            .with_context(|| format!("Failed to process directory {}", input_path.display()))?
    } else {
        single_file_beta(&input_path, &config)
            .with_context(|| format!("Failed to process {}", input_path.display()))?
    };

    info!(outputs = written.len(), output_dir = %cli.output_dir.display(), "Done");
    Ok(())
}

/// Logs to stderr; `RUST_LOG` overrides the level chosen by `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
