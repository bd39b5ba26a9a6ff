use crate::geometry::Rect;
use crate::tree::arena::{NodeId, NodeTree};

use super::Layout;

/// Gap (layout units) below which two sibling rectangles still count as touching.
pub const ADJACENCY_TOLERANCE: f64 = 1e-6;

/// Every adjacent pair in one sibling group, `(earlier, later)` in input order.
/// Quadratic in the group size, which is the branching factor.
pub fn adjacent_pairs(group: &[(NodeId, Rect)]) -> Vec<(NodeId, NodeId)> {
    let mut pairs = Vec::new();
    for (i, (a, ra)) in group.iter().enumerate() {
        for (b, rb) in &group[i + 1..] {
            if a != b && ra.is_adjacent(rb, ADJACENCY_TOLERANCE) {
                pairs.push((*a, *b));
            }
        }
    }
    pairs
}

/// Fill in the neighbour lists of every node that got a rectangle.
pub(crate) fn build_neighbours(tree: &NodeTree, layout: &mut Layout) {
    let parents: Vec<NodeId> = std::iter::once(layout.root)
        .chain(tree.bfs(layout.root))
        .filter(|&id| !tree.is_leaf(id))
        .collect();

    let mut group: Vec<(NodeId, Rect)> = Vec::new();
    for parent in parents {
        group.clear();
        group.extend(
            tree.children(parent)
                .iter()
                .filter_map(|&c| layout.rect(c).map(|r| (c, r))),
        );
        for (a, b) in adjacent_pairs(&group) {
            layout.neighbours.entry(a).or_default().push(b);
            layout.neighbours.entry(b).or_default().push(a);
        }
    }

    tracing::debug!(
        "Adjacency: {} nodes have at least one neighbour",
        layout.neighbours.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compute_layout, LayoutConfig, LayoutKind};
    use crate::tree::arena::NodeData;

    #[test]
    fn pairs_include_edges_and_corners_only() {
        let group = [
            (NodeId(1), Rect::new(0.0, 0.0, 10.0, 10.0)),
            (NodeId(2), Rect::new(10.0, 0.0, 10.0, 10.0)),
            (NodeId(3), Rect::new(20.0, 10.0, 5.0, 5.0)),
            (NodeId(4), Rect::new(0.0, 30.0, 5.0, 5.0)),
        ];
        assert_eq!(
            adjacent_pairs(&group),
            vec![(NodeId(1), NodeId(2)), (NodeId(2), NodeId(3))]
        );
    }

    #[test]
    fn neighbour_lists_are_symmetric() {
        let mut tree = NodeTree::new("root");
        let branch = tree.add_child(tree.root, NodeData::new("branch"));
        for (i, size) in [4.0, 3.0, 2.0, 2.0, 1.0].into_iter().enumerate() {
            tree.add_child(branch, NodeData::new(&format!("leaf{i}")).with_size(size));
        }
        tree.add_child(tree.root, NodeData::new("other").with_size(5.0));

        let config = LayoutConfig::new(200.0, 100.0).with_layout(LayoutKind::Squarified);
        let layout = compute_layout(&tree, tree.root, &config);

        let mut total = 0;
        for id in tree.bfs(tree.root) {
            for &n in layout.neighbours(id).unwrap_or_default() {
                total += 1;
                assert_eq!(tree.parent(n), tree.parent(id));
                assert!(layout.neighbours(n).unwrap_or_default().contains(&id));
            }
        }
        assert!(total > 0);
        assert_eq!(layout.neighbours(tree.root), None);
    }
}
