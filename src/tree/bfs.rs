use std::collections::VecDeque;

use super::arena::{NodeId, NodeTree};

/// Lazy breadth-first walk below a start node. The start node itself is not
/// yielded. Call [`restart`](Bfs::restart) to walk again from the beginning.
pub struct Bfs<'a> {
    tree: &'a NodeTree,
    start: NodeId,
    queue: VecDeque<NodeId>,
}

impl<'a> Bfs<'a> {
    pub fn new(tree: &'a NodeTree, start: NodeId) -> Self {
        let mut bfs = Self {
            tree,
            start,
            queue: VecDeque::new(),
        };
        bfs.restart();
        bfs
    }

    pub fn restart(&mut self) {
        self.queue.clear();
        self.queue.extend(self.tree.children(self.start).iter().copied());
    }
}

impl<'a> Iterator for Bfs<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.queue.pop_front()?;
        self.queue.extend(self.tree.children(id).iter().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::tree::arena::{NodeData, NodeTree};

    #[test]
    fn visits_level_by_level_and_restarts() {
        let mut tree = NodeTree::new("root");
        let a = tree.add_child(tree.root, NodeData::new("a"));
        let b = tree.add_child(tree.root, NodeData::new("b"));
        let a1 = tree.add_child(a, NodeData::new("a1"));
        let b1 = tree.add_child(b, NodeData::new("b1"));
        let a1x = tree.add_child(a1, NodeData::new("a1x"));

        let mut walk = tree.bfs(tree.root);
        assert_eq!(walk.next(), Some(a));
        assert_eq!(walk.next(), Some(b));
        walk.restart();
        let all: Vec<_> = walk.collect();
        assert_eq!(all, vec![a, b, a1, b1, a1x]);

        assert_eq!(tree.bfs(a).collect::<Vec<_>>(), vec![a1, a1x]);
        assert_eq!(tree.bfs(b1).count(), 0);
    }
}
