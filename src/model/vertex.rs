//! Vertex and branch length types of the phylogenetic tree model.

use crate::model::tree::VertexIndex;
use std::ops::Deref;

/// During construction, Internal and Leaf vertices might not have a parent set yet.
const NO_PARENT_SET: VertexIndex = usize::MAX;

// =#========================================================================#=
// VERTEX
// =#========================================================================#=
/// Represents a vertex (node) in a rooted phylogenetic tree.
///
/// A vertex can be either:
/// - **Root**: Has at least one child, no parent
/// - **Internal**: Has a parent and at least one child, might have a name
///   (e.g. a support value) and a branch_length
/// - **Leaf**: Has no children, has a label and might have a branch_length
///
/// # Invariants
/// - `index` is the index of the vertex in the tree arena
/// - `branch_length` is non-negative (enforced by [BranchLength]); might not be set
/// - `parent` is `NO_PARENT_SET = usize::MAX` only during construction
#[derive(PartialEq, Debug, Clone)]
pub enum Vertex {
    /// Root vertex of the tree (has no parent)
    Root {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Indices of the child vertices
        children: Vec<VertexIndex>,
        /// Root branch length (rare, but allowed in Newick)
        branch_length: Option<BranchLength>,
        /// Optional label of the root
        name: Option<String>,
    },
    /// Internal vertex (has parent and children)
    Internal {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Index of the parent vertex
        parent: VertexIndex,
        /// Indices of the child vertices
        children: Vec<VertexIndex>,
        /// Distance to parent vertex
        branch_length: Option<BranchLength>,
        /// Optional label of the internal vertex, e.g. a support value
        name: Option<String>,
    },
    /// Leaf vertex (has parent and label, no children)
    Leaf {
        /// Index of this vertex in the tree arena
        index: VertexIndex,
        /// Index of the parent vertex
        parent: VertexIndex,
        /// Distance to parent vertex
        branch_length: Option<BranchLength>,
        /// Taxon label
        label: String,
    },
}

impl Vertex {
    /// Creates a new root vertex.
    pub fn new_root(
        index: VertexIndex,
        children: Vec<VertexIndex>,
        branch_length: Option<BranchLength>,
        name: Option<String>,
    ) -> Self {
        Vertex::Root {
            index,
            children,
            branch_length,
            name,
        }
    }

    /// Creates a new internal (non-leaf, non-root) vertex without parent.
    pub fn new_internal(
        index: VertexIndex,
        children: Vec<VertexIndex>,
        branch_length: Option<BranchLength>,
        name: Option<String>,
    ) -> Self {
        Vertex::Internal {
            index,
            parent: NO_PARENT_SET,
            children,
            branch_length,
            name,
        }
    }

    /// Creates a new leaf vertex without parent.
    pub fn new_leaf(
        index: VertexIndex,
        branch_length: Option<BranchLength>,
        label: String,
    ) -> Self {
        Vertex::Leaf {
            index,
            parent: NO_PARENT_SET,
            branch_length,
            label,
        }
    }

    /// Returns the index of this vertex.
    pub fn index(&self) -> VertexIndex {
        match self {
            Vertex::Root { index, .. }
            | Vertex::Internal { index, .. }
            | Vertex::Leaf { index, .. } => *index,
        }
    }

    /// Returns the branch length to the parent (or the root branch), if set.
    pub fn branch_length(&self) -> Option<BranchLength> {
        match self {
            Vertex::Root { branch_length, .. }
            | Vertex::Internal { branch_length, .. }
            | Vertex::Leaf { branch_length, .. } => *branch_length,
        }
    }

    /// Returns the branch length as `f64`, with a missing length counting as 0.
    pub fn branch_length_or_zero(&self) -> f64 {
        self.branch_length().map_or(0.0, |bl| *bl)
    }

    /// Returns whether this vertex has a [BranchLength].
    pub fn has_branch_length(&self) -> bool {
        self.branch_length().is_some()
    }

    /// Replaces the branch length of this vertex.
    pub fn set_branch_length(&mut self, length: Option<BranchLength>) {
        match self {
            Vertex::Root { branch_length, .. }
            | Vertex::Internal { branch_length, .. }
            | Vertex::Leaf { branch_length, .. } => *branch_length = length,
        }
    }

    /// Returns the label if this is a leaf, else `None`.
    pub fn label(&self) -> Option<&str> {
        match self {
            Vertex::Leaf { label, .. } => Some(label.as_str()),
            _ => None,
        }
    }

    /// Returns the name of a root or internal vertex, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Vertex::Root { name, .. } | Vertex::Internal { name, .. } => name.as_deref(),
            Vertex::Leaf { .. } => None,
        }
    }

    /// Returns the children if this is a root or internal vertex, else `None`.
    pub fn children(&self) -> Option<&[VertexIndex]> {
        match self {
            Vertex::Root { children, .. } | Vertex::Internal { children, .. } => {
                Some(children.as_slice())
            }
            Vertex::Leaf { .. } => None,
        }
    }

    /// Returns `true` if this vertex is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Vertex::Leaf { .. })
    }

    /// Returns `true` if this vertex is an internal vertex.
    pub fn is_internal(&self) -> bool {
        matches!(self, Vertex::Internal { .. })
    }

    /// Returns `true` if this vertex is the root.
    pub fn is_root(&self) -> bool {
        matches!(self, Vertex::Root { .. })
    }

    /// Sets new parent for non-root vertex.
    ///
    /// # Panics
    /// Panics if called on root.
    pub fn set_parent(&mut self, parent: VertexIndex) {
        match self {
            Vertex::Root { .. } => panic!("Cannot set parent on root vertex"),
            Vertex::Internal { parent: p, .. } | Vertex::Leaf { parent: p, .. } => *p = parent,
        }
    }

    /// Returns the index of the parent if this is a non-root vertex with
    /// parent set, else `None`.
    pub fn parent(&self) -> Option<VertexIndex> {
        match self {
            Vertex::Internal { parent, .. } | Vertex::Leaf { parent, .. } => {
                if *parent == NO_PARENT_SET {
                    None
                } else {
                    Some(*parent)
                }
            }
            Vertex::Root { .. } => None,
        }
    }

    /// Returns `true` if this vertex has a parent set.
    pub fn has_parent(&self) -> bool {
        self.parent().is_some()
    }

    /// Turns an internal vertex into a root, dropping its branch length.
    /// Root and leaf vertices are returned unchanged.
    pub fn into_root(self) -> Self {
        match self {
            Vertex::Internal {
                index, children, name, ..
            } => Vertex::Root {
                index,
                children,
                branch_length: None,
                name,
            },
            other => other,
        }
    }
}

// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Branch length in a phylogenetic tree, enforced non-negative and finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchLength(f64);

impl BranchLength {
    /// Creates a new branch length.
    ///
    /// # Panics
    /// Panics if `length` is negative or not finite.
    pub fn new(length: f64) -> Self {
        assert!(length >= 0.0, "Branch length must be non-negative, got {length}");
        assert!(length.is_finite(), "Branch length must be finite, got {length}");
        BranchLength(length)
    }

    /// Creates a new branch length, or `None` if `length` is negative or not finite.
    pub fn try_new(length: f64) -> Option<Self> {
        (length >= 0.0 && length.is_finite()).then_some(BranchLength(length))
    }

    /// Sum of two optional branch lengths; `None` only if both are `None`.
    pub fn join(a: Option<BranchLength>, b: Option<BranchLength>) -> Option<BranchLength> {
        match (a, b) {
            (None, None) => None,
            (a, b) => Some(BranchLength(a.map_or(0.0, |x| x.0) + b.map_or(0.0, |x| x.0))),
        }
    }
}

impl Deref for BranchLength {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}
