//! Recursive-descent Newick parser producing [PhyloTree]s.

use crate::model::tree::{PhyloTree, VertexIndex};
use crate::model::vertex::BranchLength;
use crate::newick::defs::{DEFAULT_NUM_LEAVES_GUESS, NEWICK_LABEL_DELIMITERS};
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::{ParsingError, ParsingErrorType};
use std::collections::HashSet;

/// Parser (configuration) for Newick strings into [PhyloTree]s.
///
/// Vertices may have any number of children. Internal vertices and the root
/// may carry a name (e.g. a bootstrap support value); leaves must be labelled
/// and leaf labels must be unique within a tree.
///
/// # Example
/// ```
/// use betadiv::newick::NewickParser;
/// use betadiv::parser::ByteParser;
///
/// let mut byte_parser = ByteParser::for_str("((A:1,B:1)0.95:0.5,C:1.5);");
/// let tree = NewickParser::new().parse(&mut byte_parser).unwrap();
/// assert_eq!(tree.num_leaves(), 3);
/// assert_eq!(tree.num_internal(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct NewickParser {
    num_leaves: usize,
}

impl Default for NewickParser {
    fn default() -> Self {
        Self::new()
    }
}

impl NewickParser {
    /// Creates a new `NewickParser` guessing a small number of leaves.
    pub fn new() -> Self {
        Self {
            num_leaves: DEFAULT_NUM_LEAVES_GUESS,
        }
    }

    /// Sets the expected number of leaves, used to pre-allocate the tree.
    pub fn with_num_leaves(mut self, num_leaves: usize) -> Self {
        self.num_leaves = num_leaves;
        self
    }

    /// Parses a single Newick tree terminated by `;`.
    ///
    /// # Errors
    /// * [ParsingErrorType::NoTree] - if only whitespace/comments remain
    /// * [ParsingErrorType::InvalidNewickString] - on structural problems,
    ///   including unlabelled leaves
    /// * [ParsingErrorType::InvalidBranchLength] - if a length is not a
    ///   non-negative finite number
    /// * [ParsingErrorType::DuplicateLabel] - if a leaf label occurs twice
    pub fn parse<S: ByteSource>(
        &self,
        parser: &mut ByteParser<S>,
    ) -> Result<PhyloTree, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if parser.is_eof() {
            return Err(ParsingError::from_parser(ParsingErrorType::NoTree, parser));
        }

        let mut state = ParseState {
            tree: PhyloTree::new(self.num_leaves),
            seen_labels: HashSet::with_capacity(self.num_leaves),
        };

        if parser.peek_is(b'(') {
            let children = state.parse_children(parser)?;
            let name = state.parse_name(parser)?;
            let branch_length = parse_branch_length(parser)?;
            state.tree.add_root(children, branch_length, name);
        } else {
            // Degenerate tree consisting of a single leaf below the root
            let leaf = state.parse_leaf(parser)?;
            state.tree.add_root(vec![leaf], None, None);
        }

        parser.skip_comment_and_whitespace()?;
        if !parser.consume_if(b';') {
            let found = parser.peek().map(|b| b as char);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected ';' at end of tree but found {found:?}"),
            ));
        }

        Ok(state.tree)
    }
}

/// Tree under construction and labels encountered so far.
struct ParseState {
    tree: PhyloTree,
    seen_labels: HashSet<String>,
}

impl ParseState {
    /// Parses a vertex and returns its index.
    fn parse_vertex<S: ByteSource>(
        &mut self,
        parser: &mut ByteParser<S>,
    ) -> Result<VertexIndex, ParsingError> {
        parser.skip_comment_and_whitespace()?;
        if parser.peek_is(b'(') {
            self.parse_internal_vertex(parser)
        } else {
            self.parse_leaf(parser)
        }
    }

    /// Parses `(children)[name][:branch_length]`.
    fn parse_internal_vertex<S: ByteSource>(
        &mut self,
        parser: &mut ByteParser<S>,
    ) -> Result<VertexIndex, ParsingError> {
        let children = self.parse_children(parser)?;
        let name = self.parse_name(parser)?;
        let branch_length = parse_branch_length(parser)?;

        Ok(self.tree.add_internal(children, branch_length, name))
    }

    /// Parses `(vertex, vertex, ...)`, expecting the parser at `(`.
    fn parse_children<S: ByteSource>(
        &mut self,
        parser: &mut ByteParser<S>,
    ) -> Result<Vec<VertexIndex>, ParsingError> {
        if !parser.consume_if(b'(') {
            let found = parser.peek().map(|b| b as char);
            return Err(ParsingError::invalid_newick_string(
                parser,
                format!("Expected '(' before children but found {found:?}"),
            ));
        }

        let mut children = vec![self.parse_vertex(parser)?];
        loop {
            parser.skip_comment_and_whitespace()?;
            match parser.peek() {
                Some(b',') => {
                    parser.next();
                    children.push(self.parse_vertex(parser)?);
                }
                Some(b')') => {
                    parser.next();
                    return Ok(children);
                }
                None => return Err(ParsingError::unexpected_eof(parser)),
                Some(other) => {
                    return Err(ParsingError::invalid_newick_string(
                        parser,
                        format!("Expected ',' or ')' after child but found {:?}", other as char),
                    ));
                }
            }
        }
    }

    /// Parses `label[:branch_length]`; the label must be non-empty and unique.
    fn parse_leaf<S: ByteSource>(
        &mut self,
        parser: &mut ByteParser<S>,
    ) -> Result<VertexIndex, ParsingError> {
        let label = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        if label.is_empty() {
            let message = "Leaf without label".to_string();
            return Err(ParsingError::invalid_newick_string(parser, message));
        }
        if !self.seen_labels.insert(label.clone()) {
            return Err(ParsingError::duplicate_label(parser, label));
        }
        let branch_length = parse_branch_length(parser)?;

        Ok(self.tree.add_leaf(branch_length, label))
    }

    /// Parses the optional name following `)`.
    fn parse_name<S: ByteSource>(
        &mut self,
        parser: &mut ByteParser<S>,
    ) -> Result<Option<String>, ParsingError> {
        let name = parser.parse_label(NEWICK_LABEL_DELIMITERS)?;
        Ok((!name.is_empty()).then_some(name))
    }
}

/// Parses optional branch length `[:number]`:
/// - Skips comments/whitespace before and after `:`
/// - Supports scientific notation (e.g., `1.5e-10`)
fn parse_branch_length<S: ByteSource>(
    parser: &mut ByteParser<S>,
) -> Result<Option<BranchLength>, ParsingError> {
    parser.skip_comment_and_whitespace()?;
    if !parser.consume_if(b':') {
        return Ok(None);
    }
    parser.skip_comment_and_whitespace()?;

    let mut branch_length_str = String::new();
    while let Some(b) = parser.peek() {
        if b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E') {
            branch_length_str.push(b as char);
            parser.next();
        } else {
            break;
        }
    }

    let value: f64 = branch_length_str.parse().map_err(|_| {
        let message = format!("'{branch_length_str}' is not a number");
        ParsingError::invalid_branch_length(parser, message)
    })?;

    BranchLength::try_new(value).map(Some).ok_or_else(|| {
        let message = format!("{value} is negative or not finite");
        ParsingError::invalid_branch_length(parser, message)
    })
}
