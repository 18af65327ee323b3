//! Label quoting helpers for the Newick format.
//!
//! Taxon identifiers from count tables are written back into Newick strings
//! verbatim whenever possible, and single-quoted otherwise.

/// Characters that end an unquoted Newick label or carry meaning in Newick.
const NEWICK_SPECIAL_CHARS: &[char] = &[
    ' ', ',', ';', '\t', '\n', '\r', '(', ')', ':', '[', ']', '\'',
];

/// Checks if a label can be written unquoted.
///
/// # Examples
/// ```
/// # use betadiv::parser::utils::needs_quoting;
/// assert!(!needs_quoting("295053"));
/// assert!(!needs_quoting("Lactobacillus_reuteri"));
/// assert!(needs_quoting("Lactobacillus reuteri"));
/// assert!(needs_quoting("OTU:17"));
/// assert!(needs_quoting(""));
/// ```
pub fn needs_quoting(label: &str) -> bool {
    label.is_empty() || label.contains(NEWICK_SPECIAL_CHARS)
}

/// Escapes a label for use in a Newick string.
///
/// Labels without special characters are returned unchanged (underscores
/// are kept as they are, since taxon identifiers must round-trip exactly).
/// Otherwise the label is wrapped in single quotes and internal single
/// quotes are doubled.
///
/// # Examples
/// ```
/// # use betadiv::parser::utils::escape_label;
/// assert_eq!(escape_label("OTU_1"), "OTU_1");
/// assert_eq!(escape_label("Bacteroides fragilis"), "'Bacteroides fragilis'");
/// assert_eq!(escape_label("d'Herelle"), "'d''Herelle'");
/// ```
pub fn escape_label(label: &str) -> String {
    if !needs_quoting(label) {
        return label.to_string();
    }

    format!("'{}'", label.replace('\'', "''"))
}
