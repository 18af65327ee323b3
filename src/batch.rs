//! Single-file and directory drivers.
//!
//! Output files are named after the metric (as given) and the input file:
//! * full matrix: `<metric>_<input file name>`
//! * restricted rows: `<metric>_<row1>_<row2>..._<input file name>`
//!
//! Re-running with the same inputs overwrites the same files.

use crate::config::BetaConfig;
use crate::error::{BetaDiversityError, Result};
use crate::metrics::MetricRegistry;
use crate::model::{CountTable, PhyloTree};
use crate::newick::NewickParser;
use crate::parser::ByteParser;
use crate::planner::{MetricInput, plan};
use crate::prepare::prepare_tree;
use crate::table::parse_count_table;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Marks hidden files in an input directory
const HIDDEN_FILE_MARKER: char = '.';

// ============================================================================
// Single file
// ============================================================================
/// Computes every configured metric for one count table, writing one output
/// file per metric into the output directory (created if needed).
///
/// The tree is read and pruned to the table's taxa (unless the configuration
/// declares it a full tree) only when a tree-based metric is requested.
///
/// # Returns
/// Paths of the written files, in metric order.
///
/// # Errors
/// Unknown metric or tree-based metric without a tree, before anything is
/// written. Afterwards the first error aborts the file's remaining metrics:
/// unreadable or malformed table or tree, unknown requested sample, or a
/// failed write.
pub fn single_file_beta<P: AsRef<Path>>(
    input_path: P,
    config: &BetaConfig,
) -> Result<Vec<PathBuf>> {
    single_file_beta_with(input_path.as_ref(), config, MetricRegistry::global())
}

/// Like [single_file_beta], resolving metrics against the given registry.
pub fn single_file_beta_with(
    input_path: &Path,
    config: &BetaConfig,
    registry: &MetricRegistry,
) -> Result<Vec<PathBuf>> {
    info!(input = %input_path.display(), "Processing count table");

    let handles = config.validate(registry)?;
    let file_name = input_path.file_name().map(OsString::from).ok_or_else(|| {
        let error = io::Error::new(io::ErrorKind::InvalidInput, "path has no file name");
        BetaDiversityError::io(input_path, error)
    })?;
    let table = read_table(input_path)?;

    let needs_tree = handles.iter().any(|handle| handle.is_phylogenetic());
    let tree = match config.tree_path() {
        Some(path) if needs_tree => Some(read_tree(path)?),
        _ => None,
    };
    let prepared = match &tree {
        Some(tree) => Some(prepare_tree(tree, table.taxon_names(), config.full_tree())?),
        None => None,
    };
    let input = MetricInput::new(&table, prepared.as_deref());

    create_output_dir(config.output_dir())?;

    let mut written = Vec::with_capacity(handles.len());
    for (metric, handle) in config.metrics().iter().zip(&handles) {
        info!(metric = metric.as_str(), key = handle.key(), "Computing distances");
        let result = plan(handle, config.rows(), registry).execute(&input)?;

        let output_name = output_file_name(metric, config.rows(), &file_name);
        let output_path = config.output_dir().join(output_name);
        write_output(&output_path, &result.to_text())?;
        written.push(output_path);
    }

    Ok(written)
}

// ============================================================================
// Directory
// ============================================================================
/// Runs [single_file_beta] for every non-hidden regular file of a directory,
/// in file name order.
///
/// All metric names and the tree requirement are checked before any file
/// is read or written.
///
/// # Returns
/// Paths of all written files.
///
/// # Errors
/// Validation errors before any processing; afterwards the first error of
/// any file aborts the batch.
pub fn multiple_file_beta<P: AsRef<Path>>(
    input_dir: P,
    config: &BetaConfig,
) -> Result<Vec<PathBuf>> {
    multiple_file_beta_with(input_dir.as_ref(), config, MetricRegistry::global())
}

/// Like [multiple_file_beta], resolving metrics against the given registry.
pub fn multiple_file_beta_with(
    input_dir: &Path,
    config: &BetaConfig,
    registry: &MetricRegistry,
) -> Result<Vec<PathBuf>> {
    config.validate(registry)?;

    let input_files = list_input_files(input_dir)?;
    if input_files.is_empty() {
        warn!(input_dir = %input_dir.display(), "No count tables found in input directory");
    }

    create_output_dir(config.output_dir())?;

    let mut written = Vec::new();
    for input_file in &input_files {
        written.extend(single_file_beta_with(input_file, config, registry)?);
    }

    info!(files = input_files.len(), outputs = written.len(), "Finished batch");
    Ok(written)
}

/// Lists non-hidden regular files of a directory, sorted by file name.
fn list_input_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(input_dir).map_err(|e| BetaDiversityError::io(input_dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BetaDiversityError::io(input_dir, e))?;
        let hidden = entry.file_name().to_string_lossy().starts_with(HIDDEN_FILE_MARKER);
        let path = entry.path();
        if !hidden && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

// ============================================================================
// Helpers
// ============================================================================
/// `<metric>_<input>` or `<metric>_<row1>_..._<rowk>_<input>`.
pub fn output_file_name(
    metric: &str,
    rows: Option<&[String]>,
    input_file_name: &OsString,
) -> OsString {
    let mut name = OsString::from(metric);
    name.push("_");
    if let Some(rows) = rows {
        name.push(rows.join("_"));
        name.push("_");
    }
    name.push(input_file_name);
    name
}

fn create_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| BetaDiversityError::io(dir, e))
}

fn read_table(path: &Path) -> Result<CountTable> {
    let file = File::open(path).map_err(|e| BetaDiversityError::io(path, e))?;
    Ok(parse_count_table(BufReader::new(file))?)
}

fn read_tree(path: &Path) -> Result<PhyloTree> {
    let bytes = fs::read(path).map_err(|e| BetaDiversityError::io(path, e))?;
    Ok(NewickParser::new().parse(&mut ByteParser::for_bytes(&bytes))?)
}

/// Writes through a scoped buffered writer, flushed before returning.
fn write_output(path: &Path, text: &str) -> Result<()> {
    let file = File::create(path).map_err(|e| BetaDiversityError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(text.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|e| BetaDiversityError::io(path, e))
}
