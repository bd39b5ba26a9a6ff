use std::cmp::Ordering;

use super::arena::{NodeId, NodeTree};

/// Default sibling ordering:
/// `order` desc, mean leaf order desc, size desc, accumulated size desc,
/// colour asc, label desc, then node id.
///
/// Nodes without a size sort after sized ones; nodes without a colour sort
/// after coloured ones.
pub fn compare_nodes(tree: &NodeTree, a: NodeId, b: NodeId) -> Ordering {
    let na = &tree.get(a).data;
    let nb = &tree.get(b).data;
    let size = |s: Option<f64>| s.unwrap_or(f64::NEG_INFINITY);
    let colour = |c: Option<f64>| c.unwrap_or(f64::INFINITY);

    nb.order
        .total_cmp(&na.order)
        .then_with(|| tree.mean_order(b).total_cmp(&tree.mean_order(a)))
        .then_with(|| size(nb.size).total_cmp(&size(na.size)))
        .then_with(|| tree.accum_size(b).total_cmp(&tree.accum_size(a)))
        .then_with(|| colour(na.colour).total_cmp(&colour(nb.colour)))
        .then_with(|| nb.label.cmp(&na.label))
        .then_with(|| a.cmp(&b))
}

impl NodeTree {
    /// Stable sort of `parent`'s children with a custom comparator.
    /// Sorting does not touch derived fields, so it never dirties the tree.
    pub fn sort_children_by<F>(&mut self, parent: NodeId, mut cmp: F)
    where
        F: FnMut(&NodeTree, NodeId, NodeId) -> Ordering,
    {
        // Comparators may read derived fields; build them while the child list is intact.
        let _ = self.level(parent);
        let mut children = self.take_children(parent);
        children.sort_by(|&a, &b| cmp(self, a, b));
        self.put_children(parent, children);
    }

    pub fn sort_children(&mut self, parent: NodeId) {
        self.sort_children_by(parent, compare_nodes);
    }

    /// Sort every sibling group in the arena with the default comparator.
    pub fn sort_all(&mut self) {
        for i in 0..self.len() {
            let id = NodeId(i as u32);
            if !self.is_leaf(id) {
                self.sort_children(id);
            }
        }
    }

    /// Sort the sibling groups whose members sit at `depth` (their parents are
    /// at `depth - 1`). Depth 0 holds only the root, so it is a no-op.
    pub fn sort_at_depth(&mut self, depth: u16) {
        if depth == 0 {
            return;
        }
        let parents: Vec<NodeId> = (0..self.len())
            .map(|i| NodeId(i as u32))
            .filter(|&id| !self.is_leaf(id) && self.level(id) + 1 == depth)
            .collect();
        for parent in parents {
            self.sort_children(parent);
        }
    }
}
