//! Rooted phylogenetic tree using the arena pattern.
//!
//! Provides core data structures for representing phylogenetic trees:
//! * [PhyloTree] - tree structure storing [Vertex] nodes in a vector
//! * [VertexIndex] - type used to index vertices in the tree
//! * [TreeError] - structural errors, e.g. when restricting a tree
//!
//! Unlike a strictly binary model, vertices may have any number of
//! children, since reference trees for OTU tables are often multifurcating.

use crate::model::vertex::{BranchLength, Vertex};
use crate::newick;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Index of a vertex in a tree (arena).
pub type VertexIndex = usize;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: VertexIndex = usize::MAX;

// =#========================================================================#=
// TREE ERROR
// =#========================================================================€=
/// Errors raised by structural tree operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// Restricting the tree would leave no leaf
    #[error("Sub-tree would contain no leaves")]
    EmptySubTree,
    /// A requested leaf label does not occur in the tree
    #[error("Leaf '{0}' not found in tree")]
    MissingLeaf(String),
}

// =$========================================================================$=
// TREE
// =$========================================================================$=
/// A rooted phylogenetic tree represented using the arena pattern on [Vertex].
///
/// # Structure
/// - All vertices (root, internal, and leaves) are stored in the arena.
/// - Index of root is maintained.
/// - No assumption on order of indices is maintained.
/// - Branch lengths are optional, but if provided non-negative.
///
/// # Construction
/// Bottom-up: add leaves, then internal vertices naming their children,
/// and finally the root. Test validity with [`PhyloTree::is_valid()`].
///
/// ```
/// use betadiv::model::{BranchLength, PhyloTree};
///
/// let mut tree = PhyloTree::new(3);
/// let a = tree.add_leaf(Some(BranchLength::new(1.0)), "A".to_string());
/// let b = tree.add_leaf(Some(BranchLength::new(2.0)), "B".to_string());
/// let c = tree.add_leaf(Some(BranchLength::new(3.0)), "C".to_string());
/// tree.add_root(vec![a, b, c], None, None);
///
/// assert!(tree.is_valid());
/// assert_eq!(tree.num_leaves(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PhyloTree {
    /// Vertices of this tree (arena pattern)
    vertices: Vec<Vertex>,

    /// Index of the root of this tree
    root_index: VertexIndex,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl PhyloTree {
    /// Creates a new empty tree with capacity for a binary tree with
    /// `num_leaves` leaves.
    pub fn new(num_leaves: usize) -> Self {
        PhyloTree {
            vertices: Vec::with_capacity((2 * num_leaves).saturating_sub(1)),
            root_index: NO_ROOT_SET_INDEX,
        }
    }

    /// Adds the root to the tree, returning its index.
    ///
    /// # Arguments
    /// * `children` - Indices of the children (at least one)
    /// * `branch_length` - Optional root branch length
    /// * `name` - Optional root label
    pub fn add_root(
        &mut self,
        children: Vec<VertexIndex>,
        branch_length: Option<BranchLength>,
        name: Option<String>,
    ) -> VertexIndex {
        let index = self.vertices.len();
        for &child in &children {
            self.vertices[child].set_parent(index);
        }
        self.vertices
            .push(Vertex::new_root(index, children, branch_length, name));
        self.root_index = index;

        index
    }

    /// Adds an internal vertex to the tree, returning its index.
    ///
    /// # Arguments
    /// * `children` - Indices of the children (at least one)
    /// * `branch_length` - Length of incoming branch
    /// * `name` - Optional label, e.g. a support value
    pub fn add_internal(
        &mut self,
        children: Vec<VertexIndex>,
        branch_length: Option<BranchLength>,
        name: Option<String>,
    ) -> VertexIndex {
        let index = self.vertices.len();
        for &child in &children {
            self.vertices[child].set_parent(index);
        }
        self.vertices
            .push(Vertex::new_internal(index, children, branch_length, name));

        index
    }

    /// Adds a leaf to the tree, returning its index.
    pub fn add_leaf(&mut self, branch_length: Option<BranchLength>, label: String) -> VertexIndex {
        let index = self.vertices.len();
        self.vertices
            .push(Vertex::new_leaf(index, branch_length, label));
        index
    }

    /// Returns whether root of tree has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns a reference to the root vertex.
    ///
    /// # Panics
    /// Panics if the root hasn't been set yet.
    pub fn root(&self) -> &Vertex {
        &self[self.root_index]
    }

    /// Returns the index of the root.
    pub fn root_index(&self) -> VertexIndex {
        self.root_index
    }

    /// Returns a reference to the vertex at the given index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn vertex(&self, index: VertexIndex) -> &Vertex {
        &self[index]
    }

    /// Returns all vertices in arena order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns the number of leaves in this tree.
    pub fn num_leaves(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_leaf()).count()
    }

    /// Returns the number of internal (non-root, non-leaf) vertices.
    pub fn num_internal(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_internal()).count()
    }

    /// Returns the number of vertices in this tree.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns an iterator over all leaves (arena order).
    pub fn leaves(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter().filter(|v| v.is_leaf())
    }

    /// Returns the leaf labels in arena order.
    pub fn leaf_labels(&self) -> Vec<&str> {
        self.leaves().filter_map(Vertex::label).collect()
    }

    /// Maps each leaf label to its vertex index (first occurrence wins).
    pub fn leaf_index_map(&self) -> HashMap<&str, VertexIndex> {
        let mut map = HashMap::with_capacity(self.vertices.len() / 2 + 1);
        for vertex in self.leaves() {
            if let Some(label) = vertex.label() {
                map.entry(label).or_insert(vertex.index());
            }
        }
        map
    }

    /// Returns the sum of all non-root branch lengths (missing lengths count as 0).
    pub fn total_branch_length(&self) -> f64 {
        self.vertices
            .iter()
            .filter(|v| !v.is_root())
            .map(Vertex::branch_length_or_zero)
            .sum()
    }

    /// Checks if all non-root vertices have branch lengths set.
    pub fn vertices_have_branch_lengths(&self) -> bool {
        self.vertices
            .iter()
            .all(|v| v.is_root() || v.has_branch_length())
    }

    /// Returns for each vertex (indexed like the arena) the sum of branch
    /// lengths on the path to the root; missing lengths count as 0.
    pub fn distances_to_root(&self) -> Vec<f64> {
        let mut distances = vec![0.0; self.vertices.len()];
        for vertex in self.pre_order_iter() {
            if let Some(parent) = vertex.parent() {
                distances[vertex.index()] = distances[parent] + vertex.branch_length_or_zero();
            }
        }
        distances
    }

    /// Returns the Newick representation of this tree.
    pub fn to_newick(&self) -> String {
        newick::to_newick(self)
    }
}

// ============================================================================
// Validation (pub)
// ============================================================================
impl PhyloTree {
    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Root index is set and points to the only Root vertex
    /// - All vertex indices match their position in the arena
    /// - Root and internal vertices have at least one child
    /// - All child indices are valid and point back to their parent
    /// - All non-root vertices have a parent listing them as a child
    /// - Leaves have non-empty labels
    /// - All vertices are reachable from the root
    pub fn is_valid(&self) -> bool {
        if self.root_index >= self.vertices.len() || !self.vertices[self.root_index].is_root() {
            return false;
        }

        for (index, vertex) in self.vertices.iter().enumerate() {
            if vertex.index() != index {
                return false;
            }
            if vertex.is_root() && index != self.root_index {
                return false;
            }

            if let Some(children) = vertex.children() {
                if children.is_empty() {
                    return false;
                }
                for &child in children {
                    if child >= self.vertices.len()
                        || self.vertices[child].parent() != Some(index)
                    {
                        return false;
                    }
                }
            }

            if !vertex.is_root() {
                let Some(parent) = vertex.parent() else {
                    return false;
                };
                let listed = self
                    .vertices
                    .get(parent)
                    .and_then(Vertex::children)
                    .is_some_and(|children| children.contains(&index));
                if !listed {
                    return false;
                }
            }

            if vertex.label().is_some_and(str::is_empty) {
                return false;
            }
        }

        self.pre_order_iter().count() == self.vertices.len()
    }
}

// ============================================================================
// Restriction (pub)
// ============================================================================
impl PhyloTree {
    /// Returns the sub-tree restricted to the leaves whose labels are in `names`.
    ///
    /// Vertices left with a single child are removed and their branch length
    /// is added to that child. A root left with a single internal child is
    /// replaced by it. Vertex order and all labels are kept.
    ///
    /// # Arguments
    /// * `names` - Leaf labels to keep
    /// * `ignore_missing` - If `false`, a name absent from the tree is an error;
    ///   if `true`, such names are skipped
    ///
    /// # Errors
    /// * [TreeError::MissingLeaf] - if `ignore_missing` is `false` and a name is not a leaf label
    /// * [TreeError::EmptySubTree] - if no leaf would remain
    ///
    /// # Example
    /// ```
    /// use betadiv::newick::parse_str;
    ///
    /// let tree = parse_str("((A:1,B:2):3,(C:4,D:5):6);").unwrap();
    /// let sub = tree.sub_tree(&["A", "C", "D", "Z"], true).unwrap();
    /// assert_eq!(sub.to_newick(), "(A:4,(C:4,D:5):6);");
    /// ```
    pub fn sub_tree<S: AsRef<str>>(
        &self,
        names: &[S],
        ignore_missing: bool,
    ) -> Result<PhyloTree, TreeError> {
        let keep: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();

        if !ignore_missing {
            let present = self.leaf_index_map();
            if let Some(missing) = keep.iter().find(|name| !present.contains_key(*name)) {
                return Err(TreeError::MissingLeaf(missing.to_string()));
            }
        }

        let order: Vec<VertexIndex> = self.post_order_iter().map(Vertex::index).collect();
        let mut mapped: Vec<Option<VertexIndex>> = vec![None; self.vertices.len()];
        let mut sub = PhyloTree::new(keep.len());

        for old in order {
            let vertex = &self.vertices[old];
            match vertex {
                Vertex::Leaf {
                    label, branch_length, ..
                } => {
                    if keep.contains(label.as_str()) {
                        mapped[old] = Some(sub.add_leaf(*branch_length, label.clone()));
                    }
                }
                Vertex::Internal {
                    children,
                    branch_length,
                    name,
                    ..
                } => {
                    let kept: Vec<VertexIndex> =
                        children.iter().filter_map(|&c| mapped[c]).collect();
                    mapped[old] = match kept.len() {
                        0 => None,
                        1 => {
                            let only = kept[0];
                            let joined =
                                BranchLength::join(sub[only].branch_length(), *branch_length);
                            sub.vertices[only].set_branch_length(joined);
                            Some(only)
                        }
                        _ => Some(sub.add_internal(kept, *branch_length, name.clone())),
                    };
                }
                Vertex::Root {
                    children,
                    branch_length,
                    name,
                    ..
                } => {
                    let kept: Vec<VertexIndex> =
                        children.iter().filter_map(|&c| mapped[c]).collect();
                    match kept.len() {
                        0 => return Err(TreeError::EmptySubTree),
                        1 if !sub[kept[0]].is_leaf() => sub.promote_to_root(kept[0]),
                        _ => {
                            sub.add_root(kept, *branch_length, name.clone());
                        }
                    }
                }
            }
        }

        if !sub.is_root_set() {
            return Err(TreeError::EmptySubTree);
        }

        Ok(sub)
    }

    /// Turns the internal vertex at `index` into the root of this tree.
    fn promote_to_root(&mut self, index: VertexIndex) {
        let vertex = std::mem::replace(
            &mut self.vertices[index],
            Vertex::new_leaf(index, None, String::new()),
        );
        self.vertices[index] = vertex.into_root();
        self.root_index = index;
    }
}

impl std::ops::Index<VertexIndex> for PhyloTree {
    type Output = Vertex;

    fn index(&self, index: VertexIndex) -> &Self::Output {
        &self.vertices[index]
    }
}

impl fmt::Display for PhyloTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_newick())
    }
}

// =$========================================================================$=
// ITERATORS
// =$========================================================================$=
impl PhyloTree {
    /// Returns an iterator over the tree in post-order (children before parents).
    ///
    /// Useful for aggregating data from leaves upward, e.g. per-vertex
    /// abundances for UniFrac.
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self)
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    ///
    /// Useful for propagating data from root to leaves.
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }
}

/// Iterator for post-order traversal (children before parents).
///
/// Stack-based, so deep (e.g. caterpillar) trees do not overflow the call stack.
pub struct PostOrderIter<'a> {
    tree: &'a PhyloTree,
    stack: Vec<(VertexIndex, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a PhyloTree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push((tree.root_index, false));
        }
        PostOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let vertex = &self.tree[index];

            match vertex.children() {
                Some(children) if !children_visited => {
                    self.stack.push((index, true));
                    // Push in reverse, so the first child is processed first
                    for &child in children.iter().rev() {
                        self.stack.push((child, false));
                    }
                }
                _ => return Some(vertex),
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
pub struct PreOrderIter<'a> {
    tree: &'a PhyloTree,
    stack: Vec<VertexIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a PhyloTree) -> Self {
        let mut stack = Vec::new();
        if tree.is_root_set() {
            stack.push(tree.root_index);
        }
        PreOrderIter { tree, stack }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let vertex = &self.tree[index];

        if let Some(children) = vertex.children() {
            self.stack.extend(children.iter().rev());
        }

        Some(vertex)
    }
}
