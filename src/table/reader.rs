//! Reader for tab-delimited taxon count tables.
//!
//! # Format
//! ```text
//! # optional comment lines
//! #OTU ID<TAB>S1<TAB>S2<TAB>Consensus Lineage
//! OTU1<TAB>10<TAB>0<TAB>Bacteria; Firmicutes
//! OTU2<TAB>3<TAB>7<TAB>Bacteria; Proteobacteria
//! ```
//! * The header's first field is ignored, so it may be blank (the line then
//!   starts with a tab) or `#OTU ID`.
//! * If the last header field is `Consensus Lineage`, each row must end with
//!   a lineage field; otherwise a row may carry one optional extra field,
//!   taken as its lineage.
//! * Other lines starting with `#` and blank lines are skipped.

use crate::model::CountTable;
use crate::table::table_error::{TableError, TableErrorKind};
use ndarray::Array2;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Header prefix of tables written by OTU pickers
const OTU_ID_HEADER: &str = "#OTU ID";

/// Name of the trailing lineage column
const LINEAGE_HEADER: &str = "consensus lineage";

/// Parses a count table from a reader.
///
/// # Errors
/// [TableError] with the 1-based line of the first problem: missing header,
/// header without samples, wrong number of fields, non-numeric, non-finite
/// or negative counts, duplicate sample ids, or an IO failure.
///
/// # Example
/// ```
/// use betadiv::table::parse_count_table;
///
/// let input = "\tS1\tS2\nOTU1\t1\t0\nOTU2\t4\t2\n";
/// let table = parse_count_table(input.as_bytes()).unwrap();
/// assert_eq!(table.sample_names(), ["S1", "S2"]);
/// assert_eq!(table.counts()[[1, 0]], 4.0);
/// ```
pub fn parse_count_table<R: BufRead>(reader: R) -> Result<CountTable, TableError> {
    let mut header: Option<Header> = None;
    let mut taxon_names = Vec::new();
    let mut lineages = Vec::new();
    let mut any_lineage = false;
    let mut counts = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line_number = i + 1;
        let line = line.map_err(|e| {
            TableError::at_line(line_number, TableErrorKind::IoError(e.to_string()))
        })?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        let Some(columns) = header.as_ref() else {
            if line.starts_with(OTU_ID_HEADER) || !line.starts_with('#') {
                header = Some(Header::parse(line, line_number)?);
            }
            continue;
        };
        if line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let num_samples = columns.sample_names.len();
        let lineage = match (fields.len() - 1).checked_sub(num_samples) {
            Some(0) if !columns.has_lineage_column => None,
            Some(1) => Some(fields[num_samples + 1]),
            _ => {
                let expected = num_samples + 1 + usize::from(columns.has_lineage_column);
                return Err(TableError::at_line(
                    line_number,
                    TableErrorKind::FieldCount {
                        expected,
                        found: fields.len(),
                    },
                ));
            }
        };

        taxon_names.push(fields[0].trim().to_string());
        for field in &fields[1..=num_samples] {
            counts.push(parse_count(field).map_err(|kind| TableError::at_line(line_number, kind))?);
        }
        any_lineage |= lineage.is_some();
        lineages.push(lineage.map(|l| l.trim().to_string()).unwrap_or_default());
    }

    let header = header.ok_or_else(|| TableError::without_line(TableErrorKind::MissingHeader))?;
    let shape = (taxon_names.len(), header.sample_names.len());
    let counts = Array2::from_shape_vec(shape, counts).map_err(|_| {
        TableError::without_line(TableErrorKind::ShapeMismatch {
            rows: shape.0,
            cols: shape.1,
            taxa: shape.0,
            samples: shape.1,
        })
    })?;
    let lineages = (any_lineage || header.has_lineage_column).then_some(lineages);

    CountTable::new(header.sample_names, taxon_names, counts, lineages)
        .map_err(|e| TableError::at_line(header.line, e.kind().clone()))
}

/// Reads a count table from a file.
pub fn read_count_table<P: AsRef<Path>>(path: P) -> Result<CountTable, TableError> {
    let file = File::open(path)?;
    parse_count_table(BufReader::new(file))
}

/// Sample ids of the header and whether a lineage column is declared.
struct Header {
    sample_names: Vec<String>,
    has_lineage_column: bool,
    line: usize,
}

impl Header {
    fn parse(line: &str, line_number: usize) -> Result<Self, TableError> {
        let mut sample_names: Vec<String> =
            line.split('\t').skip(1).map(|s| s.trim().to_string()).collect();

        let has_lineage_column = sample_names
            .last()
            .is_some_and(|last| last.eq_ignore_ascii_case(LINEAGE_HEADER));
        if has_lineage_column {
            sample_names.pop();
        }
        if sample_names.is_empty() {
            return Err(TableError::at_line(line_number, TableErrorKind::NoSamples));
        }

        Ok(Self {
            sample_names,
            has_lineage_column,
            line: line_number,
        })
    }
}

/// Parses a single count, which must be a finite non-negative number.
fn parse_count(field: &str) -> Result<f64, TableErrorKind> {
    let field = field.trim();
    let value: f64 = field
        .parse()
        .map_err(|_| TableErrorKind::InvalidCount(field.to_string()))?;
    if !value.is_finite() {
        return Err(TableErrorKind::InvalidCount(field.to_string()));
    }
    if value < 0.0 {
        return Err(TableErrorKind::NegativeCount(value));
    }
    Ok(value)
}
