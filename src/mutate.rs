//! Structural mutation: moving nodes between lists and removing subtrees.
//!
//! [`Sexp::insert`] is a move: the child is detached from wherever it
//! currently sits and spliced into its new position in one call.
//! [`Sexp::remove`] deletes a whole subtree and then compacts the
//! survivors to the front of the node array, rewriting every link through
//! an old-to-new index remap; this keeps the array dense but invalidates
//! all previously obtained indices.
//!
//! Both operations are iterative; traversal state lives in explicit work
//! buffers sized from the node count.

use crate::node::{NodeKind, NULL_INDEX};
use crate::tree::Sexp;

impl Sexp {
    /// Walks the child list of `parent` for the sibling immediately before
    /// `target`. [`NULL_INDEX`] when `target` is the first child or absent.
    fn previous_sibling(&self, parent: u32, target: u32) -> u32 {
        let mut previous = self.nodes[parent as usize].first_child;
        while previous != NULL_INDEX && self.nodes[previous as usize].next_sibling != target {
            previous = self.nodes[previous as usize].next_sibling;
        }
        previous
    }

    /// Splices `index` out of its parent's child list. The node's own
    /// parent and sibling fields are left for the caller to patch. No-op
    /// for top-level nodes.
    pub(crate) fn unlink_from_parent(&mut self, index: u32) {
        let parent = self.nodes[index as usize].parent;
        if parent == NULL_INDEX {
            return;
        }
        if self.nodes[parent as usize].first_child == index {
            self.nodes[parent as usize].first_child = self.nodes[index as usize].next_sibling;
        } else {
            let previous = self.previous_sibling(parent, index);
            if previous != NULL_INDEX {
                self.nodes[previous as usize].next_sibling =
                    self.nodes[index as usize].next_sibling;
            }
        }
    }

    /// Moves `child` to become a direct child of `parent`.
    ///
    /// With `after == NULL_INDEX` the child becomes the first child;
    /// otherwise it is spliced in immediately following `after`, which must
    /// be a direct child of `parent`. The child is detached from its
    /// current parent first, so this is a safe move within the tree.
    ///
    /// Silent no-op when any precondition fails: `parent` or `child` out of
    /// bounds, `parent` not a list, `child == parent`, or `after` invalid.
    /// Moving a node under one of its own descendants is not guarded and
    /// must not be done: links stay in-bounds, but traversals over the
    /// resulting shape may cycle.
    pub fn insert(&mut self, parent: u32, after: u32, child: u32) {
        if !self.in_bounds(parent) || !self.in_bounds(child) {
            return;
        }
        if self.nodes[parent as usize].kind != NodeKind::List {
            return;
        }
        if child == parent {
            return;
        }
        if after != NULL_INDEX {
            if !self.in_bounds(after) || self.nodes[after as usize].parent != parent {
                return;
            }
            // Splicing a node after itself would close the sibling chain
            // into a loop.
            if after == child {
                return;
            }
        }

        self.unlink_from_parent(child);
        self.nodes[child as usize].parent = parent;

        if after == NULL_INDEX {
            self.nodes[child as usize].next_sibling = self.nodes[parent as usize].first_child;
            self.nodes[parent as usize].first_child = child;
        } else {
            self.nodes[child as usize].next_sibling = self.nodes[after as usize].next_sibling;
            self.nodes[after as usize].next_sibling = child;
        }
    }

    /// BFS over first_child/next_sibling from `root`, flagging each visited
    /// node in `removed` and queueing it. Returns the subtree size.
    fn collect_subtree(&self, root: u32, queue: &mut Vec<u32>, removed: &mut [bool]) -> usize {
        queue.push(root);
        removed[root as usize] = true;
        let mut head = 0;
        while head < queue.len() {
            let current = queue[head];
            head += 1;
            let mut child = self.nodes[current as usize].first_child;
            while child != NULL_INDEX {
                removed[child as usize] = true;
                queue.push(child);
                child = self.nodes[child as usize].next_sibling;
            }
        }
        queue.len()
    }

    /// Removes the node at `index` together with every descendant.
    ///
    /// Surviving nodes are compacted into positions `[0, new_len)` with all
    /// parent, child, and sibling links rewritten consistently. Every index
    /// previously obtained from this tree is invalid afterwards. Out of
    /// bounds is a silent no-op.
    pub fn remove(&mut self, index: u32) {
        if !self.in_bounds(index) {
            return;
        }

        // Sever the subtree root before touching the array layout.
        self.unlink_from_parent(index);

        let count = self.nodes.len();
        let mut queue: Vec<u32> = Vec::with_capacity(count);
        let mut removed = vec![false; count];
        let removed_count = self.collect_subtree(index, &mut queue, &mut removed);

        if removed_count == count {
            // Everything went - reset to empty without compaction.
            self.nodes.clear();
            return;
        }

        // Old-to-new remap: survivors take a dense increasing range,
        // removed nodes map to the null sentinel.
        let mut remap = vec![NULL_INDEX; count];
        let mut next_position = 0u32;
        for (old_index, slot) in remap.iter_mut().enumerate() {
            if !removed[old_index] {
                *slot = next_position;
                next_position += 1;
            }
        }

        // Rewrite links through the remap and slide each survivor into its
        // compacted slot. New positions never exceed old ones, so the move
        // is safe in a single forward pass.
        for old_index in 0..count {
            let new_index = remap[old_index];
            if new_index == NULL_INDEX {
                continue;
            }
            let mut node = self.nodes[old_index];
            if node.parent != NULL_INDEX {
                node.parent = remap[node.parent as usize];
            }
            if node.first_child != NULL_INDEX {
                node.first_child = remap[node.first_child as usize];
            }
            if node.next_sibling != NULL_INDEX {
                node.next_sibling = remap[node.next_sibling as usize];
            }
            self.nodes[new_index as usize] = node;
        }

        self.nodes.truncate(count - removed_count);
    }
}
