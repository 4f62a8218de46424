//! Deep-copying subtrees into independent trees.
//!
//! A clone walks the subtree breadth-first, assigning new dense indices in
//! visit order, so the clone's root is always node 0 and the copy is a
//! single pass over the collected nodes. The new tree shares atom content
//! with the source through the intern pool (ids are pool-wide, so no bytes
//! are copied) and holds its own pool reference.

use crate::node::NULL_INDEX;
use crate::tree::Sexp;

impl Sexp {
    /// BFS over the subtree at `root`, recording original indices in visit
    /// order and mapping each to its position in that order.
    fn subtree_remap(&self, root: u32, queue: &mut Vec<u32>, remap: &mut [u32]) {
        remap[root as usize] = 0;
        queue.push(root);
        let mut head = 0;
        while head < queue.len() {
            let current = queue[head];
            head += 1;
            let mut child = self.nodes[current as usize].first_child;
            while child != NULL_INDEX {
                remap[child as usize] = queue.len() as u32;
                queue.push(child);
                child = self.nodes[child as usize].next_sibling;
            }
        }
    }

    /// Deep-copies the subtree rooted at `index` into a new independent
    /// tree whose root is node 0.
    ///
    /// The source is not modified, and mutating either tree afterwards
    /// never affects the other. Returns `None` when `index` is out of
    /// bounds.
    pub fn clone_subtree(&self, index: u32) -> Option<Sexp> {
        if !self.in_bounds(index) {
            return None;
        }

        let mut queue: Vec<u32> = Vec::with_capacity(self.nodes.len());
        let mut remap = vec![NULL_INDEX; self.nodes.len()];
        self.subtree_remap(index, &mut queue, &mut remap);

        let mut destination = Sexp::with_node_capacity(queue.len());
        for &original in &queue {
            let mut node = self.nodes[original as usize];
            if node.parent != NULL_INDEX {
                node.parent = remap[node.parent as usize];
            }
            if node.first_child != NULL_INDEX {
                node.first_child = remap[node.first_child as usize];
            }
            if node.next_sibling != NULL_INDEX {
                node.next_sibling = remap[node.next_sibling as usize];
            }
            destination.nodes.push(node);
        }
        // The clone root is a top-level node: nothing above or beside it.
        destination.nodes[0].parent = NULL_INDEX;
        destination.nodes[0].next_sibling = NULL_INDEX;

        Some(destination)
    }

    /// Moves the subtree rooted at `index` out into a new tree:
    /// [`clone_subtree`](Sexp::clone_subtree) followed by
    /// [`remove`](Sexp::remove).
    ///
    /// On `None` (out-of-bounds index) the source is unchanged. On success
    /// every index previously obtained from the source is invalidated by
    /// the removal.
    pub fn extract(&mut self, index: u32) -> Option<Sexp> {
        let destination = self.clone_subtree(index)?;
        self.remove(index);
        Some(destination)
    }
}
