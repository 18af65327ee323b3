//! Text formatting of distance matrices.
//!
//! Layout: a header line of a tab followed by the tab-separated column ids,
//! then one line per row with the row id followed by its values. Values use
//! the shortest representation that reads back to the same `f64`, always
//! with a decimal point (`0.0`, `0.25`).

use ndarray::ArrayView2;
use std::fmt::Write;

/// Formats a full square distance matrix with `sample_names` as both row
/// and column ids.
///
/// # Example
/// ```
/// use betadiv::table::format_distance_matrix;
/// use ndarray::array;
///
/// let names = vec!["S1".to_string(), "S2".to_string()];
/// let text = format_distance_matrix(&names, array![[0.0, 0.5], [0.5, 0.0]].view());
/// assert_eq!(text, "\tS1\tS2\nS1\t0.0\t0.5\nS2\t0.5\t0.0\n");
/// ```
pub fn format_distance_matrix<S: AsRef<str>>(
    sample_names: &[S],
    matrix: ArrayView2<'_, f64>,
) -> String {
    format_matrix(matrix, sample_names, sample_names)
}

/// Formats a matrix with the given row and column ids.
///
/// Used for partial distance matrices, where rows are the requested samples
/// and columns are all samples of the table.
pub fn format_matrix<R: AsRef<str>, C: AsRef<str>>(
    matrix: ArrayView2<'_, f64>,
    row_names: &[R],
    col_names: &[C],
) -> String {
    let mut out = String::new();

    for name in col_names {
        out.push('\t');
        out.push_str(name.as_ref());
    }
    out.push('\n');

    for (name, row) in row_names.iter().zip(matrix.rows()) {
        out.push_str(name.as_ref());
        for value in row {
            // Writing into a String cannot fail
            let _ = write!(out, "\t{value:?}");
        }
        out.push('\n');
    }

    out
}
