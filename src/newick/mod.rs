//! Newick format parser and writer for phylogenetic trees.
//!
//! This module provides [`NewickParser`] to parse Newick strings into
//! [`PhyloTree`]s and [`to_newick`] to write them back.
//!
//! # Quick API
//! * [`parse_file`] - parses the first tree of a file
//! * [`parse_str`] - parses a single string
//!
//! # Format
//! The Newick format has the following simple grammar:
//! * `tree ::= vertex ';'`
//! * `vertex ::= leaf | internal_vertex`
//! * `internal_vertex ::= '(' vertex (',' vertex)* ')' [name] [branch_length]`
//! * `leaf ::= label [branch_length]`
//! * `branch_length ::= ':' number`
//!
//! Furthermore:
//! * Whitespace can occur between elements,
//!   just not within an unquoted label or a branch_length
//! * Labels may be single-quoted, with `''` standing for a quote
//! * Comments are square brackets and can occur anywhere where whitespace is allowed
//! * Internal names such as support values are kept, annotations in
//!   comments (e.g. `[&support=0.9]`) are skipped

mod defs;
mod parser;
pub mod writer;

pub use self::parser::NewickParser;
pub use self::writer::{to_newick, write_newick_file};

use crate::model::PhyloTree;
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::InMemoryByteSource;
use crate::parser::ParsingError;
use std::path::Path;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses the first Newick tree of a file.
///
/// Anything following the first `;` is ignored.
///
/// # Arguments
/// * `path` - Path to the file (accepting `&str`, `String`, `Path`, or `PathBuf`)
///
/// # Returns
/// * [`PhyloTree`] - First tree of the file
/// * [`ParsingError`] - If reading fails, the file holds no tree, or the
///   Newick string is invalid
///
/// # Example
/// ```no_run
/// use betadiv::newick::parse_file;
///
/// let tree = parse_file("rep_set.tre").unwrap();
/// println!("Reference tree has {} tips", tree.num_leaves());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<PhyloTree, ParsingError> {
    let source = InMemoryByteSource::from_file(path)?;
    let mut byte_parser = ByteParser::new(source);
    NewickParser::new().parse(&mut byte_parser)
}

/// Parses a single Newick string to obtain a [`PhyloTree`].
///
/// # Example
/// ```
/// use betadiv::newick::parse_str;
///
/// let newick = "(Fratercula_cirrhata,(Fratercula_arctica,Fratercula_corniculata));";
/// let tree = parse_str(newick).unwrap();
/// assert_eq!(tree.num_leaves(), 3);
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<PhyloTree, ParsingError> {
    let mut byte_parser = ByteParser::for_str(newick.as_ref());
    NewickParser::new().parse(&mut byte_parser)
}
