//! Navigation helpers and non-owning node views.
//!
//! This is the surface a language binding composes: child counting,
//! positional subscript with negative indexing, keyed subscript (find the
//! child list whose head atom matches a key), atom value access, and the
//! list-editing conveniences built on [`Sexp::insert`]. [`NodeView`] wraps
//! a (tree, index) pair behind a borrow, so a view can never outlive its
//! tree; after a `remove` or `extract` the old indices are gone and views
//! must be re-resolved from the tree.

use crate::intern::{self, AtomId};
use crate::node::{NodeKind, NULL_INDEX};
use crate::tree::Sexp;

impl Sexp {
    /// Number of direct children of the node at `index`.
    pub fn child_count(&self, index: u32) -> usize {
        let mut count = 0;
        let mut child = self.first_child(index);
        while child != NULL_INDEX {
            count += 1;
            child = self.next_sibling(child);
        }
        count
    }

    /// Index of the `position`-th direct child of `index`.
    ///
    /// Negative positions count from the end (`-1` is the last child).
    /// Returns [`NULL_INDEX`] when the position is out of range.
    pub fn child_at(&self, index: u32, position: isize) -> u32 {
        let total = self.child_count(index) as isize;
        let mut position = position;
        if position < 0 {
            position += total;
        }
        if position < 0 || position >= total {
            return NULL_INDEX;
        }

        let mut child = self.first_child(index);
        for _ in 0..position {
            child = self.next_sibling(child);
        }
        child
    }

    /// Finds the first direct child of `index` that is a list whose head
    /// atom equals `key`.
    ///
    /// This is the keyed-subscript convention for association-style data
    /// such as `(player (pos 1 2) (vel 3 4))`: looking up `pos` on the
    /// player node yields the `(pos 1 2)` list. The key is interned as a
    /// side effect, which is harmless: a key must be in the pool to ever
    /// match a node. Returns [`NULL_INDEX`] on a miss.
    pub fn child_by_key(&self, index: u32, key: &[u8]) -> u32 {
        let target = intern::intern(key);
        if target.is_null() {
            return NULL_INDEX;
        }

        let mut child = self.first_child(index);
        while child != NULL_INDEX {
            if self.kind(child) == NodeKind::List {
                let head = self.first_child(child);
                if head != NULL_INDEX
                    && self.kind(head) == NodeKind::Atom
                    && self.atom(head) == target
                {
                    return child;
                }
            }
            child = self.next_sibling(child);
        }
        NULL_INDEX
    }

    /// Copy of the atom content at `index`, or `None` for lists and
    /// out-of-bounds indices.
    pub fn value(&self, index: u32) -> Option<Vec<u8>> {
        let atom_id = self.atom(index);
        if atom_id.is_null() {
            return None;
        }
        intern::lookup(atom_id)
    }

    /// Moves `child` to the end of `parent`'s child list. Same
    /// preconditions and silent no-op behavior as [`insert`](Sexp::insert).
    pub fn append_child(&mut self, parent: u32, child: u32) {
        let mut after = NULL_INDEX;
        let mut current = self.first_child(parent);
        while current != NULL_INDEX {
            after = current;
            current = self.next_sibling(current);
        }
        self.insert(parent, after, child);
    }

    /// Moves `child` to the front of `parent`'s child list. Same
    /// preconditions and silent no-op behavior as [`insert`](Sexp::insert).
    pub fn prepend_child(&mut self, parent: u32, child: u32) {
        self.insert(parent, NULL_INDEX, child);
    }

    /// A view of the node at `index`, or `None` when out of bounds.
    pub fn node(&self, index: u32) -> Option<NodeView<'_>> {
        if !self.in_bounds(index) {
            return None;
        }
        Some(NodeView { tree: self, index })
    }

    /// View of node 0: the first top-level form of a parsed tree, or the
    /// root of a clone. `None` on an empty tree.
    pub fn root(&self) -> Option<NodeView<'_>> {
        self.node(0)
    }
}

/// A non-owning view of one node.
///
/// Cheap to copy; holds a shared borrow of the tree, so mutation requires
/// dropping the view and going back through [`Sexp`] with the node's
/// [`index`](NodeView::index).
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    tree: &'a Sexp,
    index: u32,
}

impl<'a> NodeView<'a> {
    /// The node's index in its tree, valid until the next `remove` or
    /// `extract`.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Kind of the viewed node.
    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.tree.kind(self.index)
    }

    /// True for atom nodes.
    #[inline]
    pub fn is_atom(&self) -> bool {
        self.kind() == NodeKind::Atom
    }

    /// True for list nodes.
    #[inline]
    pub fn is_list(&self) -> bool {
        self.kind() == NodeKind::List
    }

    /// Interned id of an atom node, [`AtomId::NULL`] otherwise.
    #[inline]
    pub fn atom_id(&self) -> AtomId {
        self.tree.atom(self.index)
    }

    /// Copy of the atom content, `None` for lists.
    pub fn value(&self) -> Option<Vec<u8>> {
        self.tree.value(self.index)
    }

    /// View of the parent node, `None` for top-level nodes.
    pub fn parent(&self) -> Option<NodeView<'a>> {
        self.tree.node(self.tree.parent(self.index))
    }

    /// View of the first child, `None` for atoms and empty lists.
    pub fn first_child(&self) -> Option<NodeView<'a>> {
        self.tree.node(self.tree.first_child(self.index))
    }

    /// View of the next sibling, `None` at the end of a child list.
    pub fn next_sibling(&self) -> Option<NodeView<'a>> {
        self.tree.node(self.tree.next_sibling(self.index))
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.tree.child_count(self.index)
    }

    /// Iterator over the direct children, in list order.
    pub fn children(&self) -> Children<'a> {
        Children {
            tree: self.tree,
            next: self.tree.first_child(self.index),
        }
    }

    /// Iterator over the children after the head, the arguments of an
    /// operator-style list.
    pub fn tail(&self) -> Children<'a> {
        Children {
            tree: self.tree,
            next: self.tree.next_sibling(self.tree.first_child(self.index)),
        }
    }

    /// Positional subscript with negative indexing, as
    /// [`Sexp::child_at`].
    pub fn child_at(&self, position: isize) -> Option<NodeView<'a>> {
        self.tree.node(self.tree.child_at(self.index, position))
    }

    /// Keyed subscript, as [`Sexp::child_by_key`].
    pub fn child_by_key(&self, key: &[u8]) -> Option<NodeView<'a>> {
        self.tree.node(self.tree.child_by_key(self.index, key))
    }
}

/// Iterator over the direct children of a node. Advances along the sibling
/// chain before yielding, so it stays valid for the nodes it has already
/// produced even if the caller stops early.
pub struct Children<'a> {
    tree: &'a Sexp,
    next: u32,
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeView<'a>;

    fn next(&mut self) -> Option<NodeView<'a>> {
        let index = self.next;
        if index == NULL_INDEX {
            return None;
        }
        self.next = self.tree.next_sibling(index);
        self.tree.node(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_child_count() {
        let tree = parse(b"(a b c)").unwrap();
        assert_eq!(tree.child_count(0), 3);
        assert_eq!(tree.child_count(tree.first_child(0)), 0);
        assert_eq!(tree.child_count(99), 0);
    }

    #[test]
    fn test_child_at_positions() {
        let tree = parse(b"(a b c)").unwrap();
        assert_eq!(tree.value(tree.child_at(0, 0)).as_deref(), Some(&b"a"[..]));
        assert_eq!(tree.value(tree.child_at(0, 2)).as_deref(), Some(&b"c"[..]));
        assert_eq!(tree.child_at(0, 3), NULL_INDEX);
    }

    #[test]
    fn test_child_at_negative_positions() {
        let tree = parse(b"(a b c)").unwrap();
        assert_eq!(tree.value(tree.child_at(0, -1)).as_deref(), Some(&b"c"[..]));
        assert_eq!(tree.value(tree.child_at(0, -3)).as_deref(), Some(&b"a"[..]));
        assert_eq!(tree.child_at(0, -4), NULL_INDEX);
    }

    #[test]
    fn test_child_by_key() {
        let tree = parse(b"(player (pos 1 2) (vel 3 4))").unwrap();
        let pos = tree.child_by_key(0, b"pos");
        assert_ne!(pos, NULL_INDEX);
        assert_eq!(tree.serialize_subtree(pos).as_deref(), Some(&b"(pos 1 2)"[..]));
        assert_eq!(tree.child_by_key(0, b"missing"), NULL_INDEX);
    }

    #[test]
    fn test_child_by_key_skips_non_list_children() {
        // The bare atom `pos` is not a keyed entry; only `(pos 9)` is.
        let tree = parse(b"(entity pos (pos 9))").unwrap();
        let found = tree.child_by_key(0, b"pos");
        assert_eq!(tree.serialize_subtree(found).as_deref(), Some(&b"(pos 9)"[..]));
    }

    #[test]
    fn test_value_on_list_is_none() {
        let tree = parse(b"(a)").unwrap();
        assert_eq!(tree.value(0), None);
        assert_eq!(tree.value(tree.first_child(0)).as_deref(), Some(&b"a"[..]));
    }

    #[test]
    fn test_append_child() {
        let mut tree = parse(b"(a b) c").unwrap();
        tree.append_child(0, 3);
        assert_eq!(tree.serialize().as_deref(), Some(&b"(a b c)"[..]));
    }

    #[test]
    fn test_prepend_child() {
        let mut tree = parse(b"(b c) a").unwrap();
        tree.prepend_child(0, 3);
        assert_eq!(tree.serialize().as_deref(), Some(&b"(a b c)"[..]));
    }

    #[test]
    fn test_append_to_empty_list() {
        let mut tree = parse(b"() x").unwrap();
        tree.append_child(0, 1);
        assert_eq!(tree.serialize().as_deref(), Some(&b"(x)"[..]));
    }

    #[test]
    fn test_view_navigation() {
        let tree = parse(b"(add 1 (mul 2 3))").unwrap();
        let root = tree.root().unwrap();
        assert!(root.is_list());
        assert_eq!(root.child_count(), 3);

        let head = root.first_child().unwrap();
        assert!(head.is_atom());
        assert_eq!(head.value().as_deref(), Some(&b"add"[..]));
        assert_eq!(head.parent().unwrap().index(), root.index());

        let inner = root.child_at(2).unwrap();
        assert!(inner.is_list());
        assert_eq!(inner.first_child().unwrap().value().as_deref(), Some(&b"mul"[..]));
    }

    #[test]
    fn test_children_iterator_in_order() {
        let tree = parse(b"(a b c)").unwrap();
        let values: Vec<Vec<u8>> = tree
            .root()
            .unwrap()
            .children()
            .map(|child| child.value().unwrap())
            .collect();
        assert_eq!(values, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn test_tail_iterator_skips_head() {
        let tree = parse(b"(add 1 2)").unwrap();
        let arguments: Vec<Vec<u8>> = tree
            .root()
            .unwrap()
            .tail()
            .map(|child| child.value().unwrap())
            .collect();
        assert_eq!(arguments, vec![b"1".to_vec(), b"2".to_vec()]);
    }

    #[test]
    fn test_tail_of_atom_is_empty() {
        let tree = parse(b"x").unwrap();
        assert_eq!(tree.root().unwrap().tail().count(), 0);
        assert_eq!(tree.root().unwrap().children().count(), 0);
    }

    #[test]
    fn test_view_out_of_bounds_is_none() {
        let tree = parse(b"(a)").unwrap();
        assert!(tree.node(17).is_none());
        assert!(parse(b"").unwrap().root().is_none());
    }
}
