//! Tree preparation: restricting a reference tree to a table's taxa.

use crate::model::{PhyloTree, TreeError};
use std::borrow::Cow;
use std::collections::HashSet;
use tracing::debug;

/// Returns the tree to use for a table with the given taxa.
///
/// With `full_tree`, the caller asserts that the tree already holds exactly
/// the table's taxa and it is passed through unchanged; a tree that does not
/// gives meaningless distances, not an error. Otherwise the tree is pruned to
/// the leaves whose labels are table taxa. Table taxa missing from the tree
/// are ignored (their number is logged at debug level).
///
/// # Errors
/// [TreeError::EmptySubTree] if no table taxon is a leaf of the tree.
///
/// # Example
/// ```
/// use betadiv::newick::parse_str;
/// use betadiv::prepare::prepare_tree;
///
/// let tree = parse_str("((A:1,B:1):1,(C:1,D:1):1);").unwrap();
/// let taxa = vec!["A".to_string(), "C".to_string(), "X".to_string()];
///
/// let pruned = prepare_tree(&tree, &taxa, false).unwrap();
/// assert_eq!(pruned.num_leaves(), 2);
///
/// let unchanged = prepare_tree(&tree, &taxa, true).unwrap();
/// assert_eq!(unchanged.num_leaves(), 4);
/// ```
pub fn prepare_tree<'a>(
    tree: &'a PhyloTree,
    taxon_names: &[String],
    full_tree: bool,
) -> Result<Cow<'a, PhyloTree>, TreeError> {
    if full_tree {
        debug!(leaves = tree.num_leaves(), "Using full tree without pruning");
        return Ok(Cow::Borrowed(tree));
    }

    let leaves: HashSet<&str> = tree.leaf_labels().into_iter().collect();
    let missing = taxon_names.iter().filter(|t| !leaves.contains(t.as_str())).count();
    let pruned = tree.sub_tree(taxon_names, true)?;

    debug!(
        tree_leaves = tree.num_leaves(),
        kept_leaves = pruned.num_leaves(),
        taxa_missing_from_tree = missing,
        "Pruned tree to table taxa"
    );

    Ok(Cow::Owned(pruned))
}
