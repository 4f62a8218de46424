//! Iterative two-pass serializer: measure, then write.
//!
//! The first pass walks the subtree with an explicit stack and computes the
//! exact output size (atom lengths, two bytes per list, one separator
//! between adjacent children), so the second pass writes into a buffer
//! allocated once at exactly that capacity. The write pass drives a stack
//! of [`SerializeFrame`]s: a list pushes a close-paren sentinel and then
//! its children in reverse, so frames pop left-to-right with the correct
//! separator flags. No recursion anywhere; deeply nested trees cost heap,
//! never call stack.

use std::fmt;

use crate::intern;
use crate::node::{NodeKind, NULL_INDEX};
use crate::tree::Sexp;

/// One pending emit step: either a node (possibly preceded by a space) or
/// the closing paren of a list already opened.
struct SerializeFrame {
    index: u32,
    needs_close: bool,
    needs_space: bool,
}

/// Measure pass: byte length of the subtree at `root`. `work` is the
/// caller's scratch stack, cleared here.
fn measure_node(tree: &Sexp, root: u32, work: &mut Vec<u32>) -> usize {
    work.clear();
    work.push(root);
    let mut total = 0usize;

    while let Some(index) = work.pop() {
        let node = &tree.nodes[index as usize];
        if node.kind == NodeKind::Atom {
            total += intern::len(node.atom_id).unwrap_or(0);
            continue;
        }

        total += 2;
        let mut child = node.first_child;
        let mut child_count = 0usize;
        while child != NULL_INDEX {
            work.push(child);
            child = tree.nodes[child as usize].next_sibling;
            child_count += 1;
        }
        if child_count > 0 {
            total += child_count - 1;
        }
    }

    total
}

/// Write pass: emits the subtree at `root` into `out`. `stack` and
/// `children` are the caller's scratch buffers; `children` holds one list's
/// child indices while they are pushed in reverse.
fn write_node(
    tree: &Sexp,
    root: u32,
    out: &mut Vec<u8>,
    stack: &mut Vec<SerializeFrame>,
    children: &mut Vec<u32>,
) {
    stack.clear();
    stack.push(SerializeFrame {
        index: root,
        needs_close: false,
        needs_space: false,
    });

    while let Some(frame) = stack.pop() {
        if frame.needs_close {
            out.push(b')');
            continue;
        }
        if frame.needs_space {
            out.push(b' ');
        }

        let node = &tree.nodes[frame.index as usize];
        if node.kind == NodeKind::Atom {
            // An unresolvable id emits nothing, matching its zero measure.
            let _ = intern::with_bytes(node.atom_id, |bytes| out.extend_from_slice(bytes));
            continue;
        }

        out.push(b'(');
        stack.push(SerializeFrame {
            index: 0,
            needs_close: true,
            needs_space: false,
        });

        children.clear();
        let mut child = node.first_child;
        while child != NULL_INDEX {
            children.push(child);
            child = tree.nodes[child as usize].next_sibling;
        }
        // Reverse push so the children pop left-to-right; every child but
        // the leftmost wants a separating space.
        for (position, &child) in children.iter().enumerate().rev() {
            stack.push(SerializeFrame {
                index: child,
                needs_close: false,
                needs_space: position > 0,
            });
        }
    }
}

impl Sexp {
    /// Serializes the whole tree to text.
    ///
    /// Every top-level form (node with no parent) is emitted in array
    /// order, separated by single spaces. Atoms emit their content
    /// verbatim; lists emit `(`, their children separated by single
    /// spaces, then `)`. Returns `None` for an empty tree or when nothing
    /// measurable remains (for example a lone blank detached atom).
    pub fn serialize(&self) -> Option<Vec<u8>> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut work: Vec<u32> = Vec::with_capacity(self.nodes.len());

        let mut total = 0usize;
        let mut root_count = 0usize;
        for index in 0..self.nodes.len() {
            if self.nodes[index].parent != NULL_INDEX {
                continue;
            }
            if root_count > 0 {
                total += 1;
            }
            total += measure_node(self, index as u32, &mut work);
            root_count += 1;
        }
        if root_count == 0 || total == 0 {
            return None;
        }

        let mut out = Vec::with_capacity(total);
        let mut stack: Vec<SerializeFrame> = Vec::with_capacity(2 * self.nodes.len());
        let mut children: Vec<u32> = Vec::with_capacity(self.nodes.len());
        let mut first = true;
        for index in 0..self.nodes.len() {
            if self.nodes[index].parent != NULL_INDEX {
                continue;
            }
            if !first {
                out.push(b' ');
            }
            first = false;
            write_node(self, index as u32, &mut out, &mut stack, &mut children);
        }

        debug_assert_eq!(out.len(), total);
        Some(out)
    }

    /// Serializes only the subtree rooted at `index`.
    ///
    /// Returns `None` when the index is out of bounds or the subtree
    /// measures to zero bytes.
    pub fn serialize_subtree(&self, index: u32) -> Option<Vec<u8>> {
        if !self.in_bounds(index) {
            return None;
        }

        let mut work: Vec<u32> = Vec::with_capacity(self.nodes.len());
        let total = measure_node(self, index, &mut work);
        if total == 0 {
            return None;
        }

        let mut out = Vec::with_capacity(total);
        let mut stack: Vec<SerializeFrame> = Vec::with_capacity(2 * self.nodes.len());
        let mut children: Vec<u32> = Vec::with_capacity(self.nodes.len());
        write_node(self, index, &mut out, &mut stack, &mut children);

        debug_assert_eq!(out.len(), total);
        Some(out)
    }
}

/// Renders the canonical serialization; the empty tree renders as the
/// empty string. Non-UTF-8 atom bytes are shown lossily.
impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.serialize() {
            Some(bytes) => write!(f, "{}", String::from_utf8_lossy(&bytes)),
            None => Ok(()),
        }
    }
}
