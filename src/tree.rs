//! The S-expression tree: a flat node store plus index-based accessors.
//!
//! Nodes live in a contiguous array and reference one another by 32-bit
//! index, so the whole tree is cache-dense, trivially cloneable, and free
//! of pointer cycles. Every accessor treats an out-of-bounds index as a
//! well-defined miss and answers with its documented sentinel
//! ([`NULL_INDEX`], [`NodeKind::Invalid`], or [`AtomId::NULL`]) rather than
//! panicking, which is what the language-binding layer builds on.
//!
//! Each tree holds one reference to the process-wide intern pool, acquired
//! at construction and released on drop.

use crate::intern::{self, AtomId};
use crate::node::{Node, NodeKind, NULL_INDEX};

/// A parsed or constructed S-expression tree.
///
/// Create one with [`parse`](crate::parse), [`Sexp::new`],
/// [`Sexp::clone_subtree`], or [`Sexp::extract`]. Indices handed out by
/// this tree stay valid until the next [`remove`](Sexp::remove) or
/// [`extract`](Sexp::extract), which compact the node array and invalidate
/// every previously obtained index.
#[derive(Debug)]
pub struct Sexp {
    pub(crate) nodes: Vec<Node>,
}

impl Sexp {
    /// Creates a valid empty tree, initialising the intern pool if needed.
    ///
    /// Equivalent to parsing empty input; useful as the starting point for
    /// building trees by hand with [`allocate_node`](Sexp::allocate_node)
    /// and [`insert`](Sexp::insert).
    pub fn new() -> Sexp {
        intern::init();
        Sexp::with_node_capacity(0)
    }

    /// Internal constructor: retains the pool and reserves node storage.
    pub(crate) fn with_node_capacity(capacity: usize) -> Sexp {
        intern::retain();
        Sexp {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub(crate) fn in_bounds(&self, index: u32) -> bool {
        (index as usize) < self.nodes.len()
    }

    /// Appends a blank detached node, growing the array as needed. Returns
    /// [`NULL_INDEX`] if the index space is exhausted.
    pub(crate) fn alloc_node(&mut self) -> u32 {
        if self.nodes.len() >= NULL_INDEX as usize {
            return NULL_INDEX;
        }
        let index = self.nodes.len() as u32;
        self.nodes.push(Node::blank());
        index
    }

    /// Allocates a new detached node of the given kind and returns its
    /// index, or [`NULL_INDEX`] if `kind` is [`NodeKind::Invalid`].
    ///
    /// The node is unattached (all links [`NULL_INDEX`]) until spliced in
    /// with [`insert`](Sexp::insert). An atom allocated this way carries no
    /// content until [`set_atom`](Sexp::set_atom) assigns some.
    pub fn allocate_node(&mut self, kind: NodeKind) -> u32 {
        if kind == NodeKind::Invalid {
            return NULL_INDEX;
        }
        let index = self.alloc_node();
        if index != NULL_INDEX {
            self.nodes[index as usize].kind = kind;
        }
        index
    }

    /// Index of the first child of `index`, or [`NULL_INDEX`].
    #[inline]
    pub fn first_child(&self, index: u32) -> u32 {
        if !self.in_bounds(index) {
            return NULL_INDEX;
        }
        self.nodes[index as usize].first_child
    }

    /// Index of the next sibling of `index`, or [`NULL_INDEX`].
    #[inline]
    pub fn next_sibling(&self, index: u32) -> u32 {
        if !self.in_bounds(index) {
            return NULL_INDEX;
        }
        self.nodes[index as usize].next_sibling
    }

    /// Index of the parent of `index`, or [`NULL_INDEX`] for top-level
    /// nodes and out-of-bounds indices.
    #[inline]
    pub fn parent(&self, index: u32) -> u32 {
        if !self.in_bounds(index) {
            return NULL_INDEX;
        }
        self.nodes[index as usize].parent
    }

    /// Kind of the node at `index`; [`NodeKind::Invalid`] when out of
    /// bounds.
    #[inline]
    pub fn kind(&self, index: u32) -> NodeKind {
        if !self.in_bounds(index) {
            return NodeKind::Invalid;
        }
        self.nodes[index as usize].kind
    }

    /// Interned atom id of the node at `index`, or [`AtomId::NULL`] when
    /// the index is out of bounds or the node is not an atom.
    #[inline]
    pub fn atom(&self, index: u32) -> AtomId {
        if !self.in_bounds(index) || self.nodes[index as usize].kind != NodeKind::Atom {
            return AtomId::NULL;
        }
        self.nodes[index as usize].atom_id
    }

    /// Replaces the content of the atom at `index` with freshly interned
    /// bytes.
    ///
    /// Silent no-op when the index is out of bounds, the node is not an
    /// atom, or interning fails; the node keeps its previous content in
    /// that case.
    pub fn set_atom(&mut self, index: u32, bytes: &[u8]) {
        if !self.in_bounds(index) || self.nodes[index as usize].kind != NodeKind::Atom {
            return;
        }
        let atom_id = intern::intern(bytes);
        if !atom_id.is_null() {
            self.nodes[index as usize].atom_id = atom_id;
        }
    }
}

impl Default for Sexp {
    fn default() -> Sexp {
        Sexp::new()
    }
}

impl Drop for Sexp {
    fn drop(&mut self) {
        intern::release();
    }
}
