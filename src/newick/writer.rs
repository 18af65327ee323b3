//! Newick serialization of [PhyloTree]s.

use crate::model::tree::{PhyloTree, VertexIndex};
use crate::model::vertex::BranchLength;
use crate::newick::defs::{BRANCH_LENGTH_CHARS, BUFFER_CHARS};
use crate::parser::utils::escape_label;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Returns the Newick representation of a tree with closing semicolon.
///
/// Leaf labels and vertex names are escaped if necessary, branch lengths are
/// written via `f64` display (so `1.0` becomes `1`). A root branch length is
/// written as well.
///
/// # Example
/// ```
/// use betadiv::model::{BranchLength, PhyloTree};
/// use betadiv::newick::to_newick;
///
/// let mut tree = PhyloTree::new(2);
/// let a = tree.add_leaf(Some(BranchLength::new(1.0)), "A".to_string());
/// let b = tree.add_leaf(Some(BranchLength::new(2.5)), "B b".to_string());
/// tree.add_root(vec![a, b], None, None);
///
/// assert_eq!(to_newick(&tree), "(A:1,'B b':2.5);");
/// ```
pub fn to_newick(tree: &PhyloTree) -> String {
    // Helper for adding branch lengths
    fn push_branch_length(newick: &mut String, branch_length: Option<BranchLength>) {
        if let Some(branch_length) = branch_length {
            newick.push(':');
            newick.push_str(&branch_length.to_string());
        }
    }

    // Recursive helper for building the Newick string
    fn build_newick(tree: &PhyloTree, newick: &mut String, index: VertexIndex) {
        let vertex = &tree[index];

        if let Some(label) = vertex.label() {
            newick.push_str(&escape_label(label));
        } else if let Some(children) = vertex.children() {
            newick.push('(');
            for (i, &child) in children.iter().enumerate() {
                if i > 0 {
                    newick.push(',');
                }
                build_newick(tree, newick, child);
            }
            newick.push(')');
            if let Some(name) = vertex.name() {
                newick.push_str(&escape_label(name));
            }
        }
        push_branch_length(newick, vertex.branch_length());
    }

    if !tree.is_root_set() {
        return String::new();
    }

    let mut newick = String::with_capacity(estimate_newick_len(tree));
    build_newick(tree, &mut newick, tree.root_index());
    newick.push(';');

    newick
}

/// Writes the given trees to a file, one Newick string per line.
pub fn write_newick_file(file: File, trees: &[PhyloTree]) -> io::Result<()> {
    let mut writer = BufWriter::new(file);
    for tree in trees {
        writer.write_all(to_newick(tree).as_bytes())?;
        writer.write_all(b"\n")?;
    }

    writer.flush()
}

/// Estimates the length of the Newick string of a tree, for pre-allocation.
fn estimate_newick_len(tree: &PhyloTree) -> usize {
    let structure: usize = tree
        .vertices()
        .iter()
        .filter_map(|v| v.children())
        .map(|children| children.len() + 1)
        .sum();
    let labels: usize = tree.leaves().filter_map(|v| v.label()).map(str::len).sum();
    let branches = if tree.vertices_have_branch_lengths() {
        tree.num_vertices() * BRANCH_LENGTH_CHARS
    } else {
        0
    };

    structure + labels + branches + BUFFER_CHARS
}
