use std::sync::OnceLock;

use compact_str::CompactString;

use crate::error::{Result, TopologyError};
use crate::geometry::Point;

use super::bfs::Bfs;

/// Index into the arena `Vec<Node>`. Uses u32 to save memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Values supplied by whoever populates the tree. The layout engine never
/// changes these.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    /// Identifier, opaque to layout.
    pub label: CompactString,
    /// Primary sibling sort key (descending).
    pub order: f64,
    /// Raw weight. `None` derives the weight from children; negative marks a dummy.
    pub size: Option<f64>,
    /// Optional colour value, only used as a sort key.
    pub colour: Option<f64>,
    /// Optional geographic location (`y` grows northwards).
    pub location: Option<Point>,
}

impl NodeData {
    pub fn new(label: &str) -> Self {
        Self {
            label: CompactString::new(label),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = order;
        self
    }

    pub fn with_colour(mut self, colour: f64) -> Self {
        self.colour = Some(colour);
        self
    }

    pub fn with_location(mut self, x: f64, y: f64) -> Self {
        self.location = Some(Point::new(x, y));
        self
    }

    /// Dummy nodes occupy area but are left out of statistics.
    pub fn is_dummy(&self) -> bool {
        matches!(self.size, Some(s) if s < 0.0)
    }
}

/// A single node in the tree, stored in a flat arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Fields derived from topology and weights, rebuilt in one depth-first pass.
#[derive(Debug, Clone)]
struct Derived {
    level: Vec<u16>,
    max_depth: Vec<u16>,
    accum_size: Vec<f64>,
    num_leaves: Vec<u32>,
    mean_order: Vec<f64>,
    location: Vec<Option<Point>>,
}

/// The node tree stored as a flat arena.
///
/// Structural mutations drop the derived-field cache; the next read of a
/// derived field (level, accumulated size, ...) rebuilds it. The cache belongs
/// to this instance, so separate trees never share consistency state.
#[derive(Debug)]
pub struct NodeTree {
    nodes: Vec<Node>,
    /// Root node index
    pub root: NodeId,
    use_accum_size: bool,
    derived: OnceLock<Derived>,
}

impl Clone for NodeTree {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            use_accum_size: self.use_accum_size,
            derived: OnceLock::new(),
        }
    }
}

impl NodeTree {
    /// Create a tree holding only a root node.
    pub fn new(root_label: &str) -> Self {
        Self::with_root(NodeData::new(root_label))
    }

    pub fn with_root(data: NodeData) -> Self {
        NodeTree {
            nodes: vec![Node {
                data,
                parent: None,
                children: Vec::new(),
            }],
            root: NodeId(0),
            use_accum_size: true,
            derived: OnceLock::new(),
        }
    }

    /// When false, a branch carrying an explicit size keeps that literal value
    /// instead of the sum of its children.
    pub fn set_use_accum_size(&mut self, use_accum_size: bool) {
        self.use_accum_size = use_accum_size;
        self.invalidate();
    }

    pub fn use_accum_size(&self) -> bool {
        self.use_accum_size
    }

    /// Append a new node under `parent`. Returns the new node's ID.
    ///
    /// Panics if `parent` does not belong to this tree.
    pub fn add_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let new_id = NodeId(self.nodes.len() as u32);
        self.nodes[parent.index()].children.push(new_id);
        self.nodes.push(Node {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.invalidate();
        new_id
    }

    /// Move an existing node (and its subtree) to the end of `parent`'s children.
    /// Rejects moves that would make a node its own ancestor.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check(parent)?;
        self.check(child)?;
        if child == self.root {
            return Err(TopologyError::RootMove(child).into());
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(TopologyError::Cycle { parent, child }.into());
        }
        self.detach(child);
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
        self.invalidate();
        Ok(())
    }

    /// Same as [`attach`](Self::attach) with the arguments in move order.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) -> Result<()> {
        self.attach(new_parent, child)
    }

    /// Detach `child` from `parent`. The subtree stays in the arena and can be
    /// attached again later.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check(parent)?;
        self.check(child)?;
        if self.nodes[child.index()].parent != Some(parent) {
            return Err(TopologyError::NotAChild { parent, child }.into());
        }
        self.detach(child);
        self.invalidate();
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(old) = self.nodes[child.index()].parent.take() {
            self.nodes[old.index()].children.retain(|&c| c != child);
        }
    }

    pub(super) fn take_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        std::mem::take(&mut self.nodes[parent.index()].children)
    }

    pub(super) fn put_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        self.nodes[parent.index()].children = children;
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(TopologyError::UnknownNode(id).into())
        }
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Mutable access to a node's supplied values. Drops derived fields since
    /// weights and locations feed into them.
    pub fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        self.invalidate();
        &mut self.nodes[id.index()].data
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Total number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn children(&self, parent: NodeId) -> &[NodeId] {
        &self.nodes[parent.index()].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.nodes[id.index()].children.is_empty()
    }

    /// Iterate from `id`'s parent up to the top of its tree.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            current: self.nodes[id.index()].parent,
        }
    }

    /// True when `ancestor` lies strictly above `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Breadth-first walk over everything below `start` (excluding `start`).
    pub fn bfs(&self, start: NodeId) -> Bfs<'_> {
        Bfs::new(self, start)
    }

    /// Leaf descendants of `id` in breadth-first order, or `id` itself for a leaf.
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        if self.is_leaf(id) {
            return vec![id];
        }
        self.bfs(id).filter(|&n| self.is_leaf(n)).collect()
    }

    pub fn level(&self, id: NodeId) -> u16 {
        self.derived().level[id.index()]
    }

    /// Deepest level reachable from `id`.
    pub fn max_depth(&self, id: NodeId) -> u16 {
        self.derived().max_depth[id.index()]
    }

    pub fn accum_size(&self, id: NodeId) -> f64 {
        self.derived().accum_size[id.index()]
    }

    pub fn num_leaves(&self, id: NodeId) -> u32 {
        self.derived().num_leaves[id.index()]
    }

    /// Average `order` over the node's leaves.
    pub fn mean_order(&self, id: NodeId) -> f64 {
        self.derived().mean_order[id.index()]
    }

    /// The node's own location, or the centroid of its children's locations.
    pub fn location(&self, id: NodeId) -> Option<Point> {
        self.derived().location[id.index()]
    }

    /// Whether derived fields must be rebuilt before the next read.
    pub fn is_dirty(&self) -> bool {
        self.derived.get().is_none()
    }

    /// Force an immediate rebuild of derived fields.
    pub fn rebuild(&mut self) {
        self.invalidate();
        self.derived();
    }

    fn invalidate(&mut self) {
        self.derived.take();
    }

    fn derived(&self) -> &Derived {
        self.derived.get_or_init(|| self.compute_derived())
    }

    fn leaf_weight(&self, data: &NodeData) -> f64 {
        match data.size {
            Some(s) if s.is_finite() => s.abs(),
            Some(_) => 0.0,
            None => 1.0,
        }
    }

    fn compute_derived(&self) -> Derived {
        let n = self.nodes.len();
        let mut d = Derived {
            level: vec![0; n],
            max_depth: vec![0; n],
            accum_size: vec![0.0; n],
            num_leaves: vec![0; n],
            mean_order: vec![0.0; n],
            location: vec![None; n],
        };

        let mut visit = Vec::with_capacity(n);
        let mut stack = Vec::new();
        for top in (0..n).filter(|&i| self.nodes[i].parent.is_none()) {
            // Pre-order walk assigns levels; its reverse visits children before parents.
            visit.clear();
            stack.push(top);
            while let Some(i) = stack.pop() {
                visit.push(i);
                for &c in &self.nodes[i].children {
                    d.level[c.index()] = d.level[i].saturating_add(1);
                    stack.push(c.index());
                }
            }

            for &i in visit.iter().rev() {
                let node = &self.nodes[i];
                if node.children.is_empty() {
                    d.accum_size[i] = self.leaf_weight(&node.data);
                    d.num_leaves[i] = 1;
                    d.max_depth[i] = d.level[i];
                    d.mean_order[i] = node.data.order;
                    d.location[i] = node.data.location;
                    continue;
                }

                let mut total = 0.0;
                let mut leaves = 0u32;
                let mut deepest = d.level[i];
                let mut order_sum = 0.0;
                let mut located = 0usize;
                let (mut sx, mut sy) = (0.0, 0.0);
                for &c in &node.children {
                    let c = c.index();
                    total += d.accum_size[c];
                    leaves += d.num_leaves[c];
                    deepest = deepest.max(d.max_depth[c]);
                    order_sum += d.mean_order[c] * d.num_leaves[c] as f64;
                    if let Some(p) = d.location[c] {
                        sx += p.x;
                        sy += p.y;
                        located += 1;
                    }
                }

                d.accum_size[i] = match node.data.size {
                    Some(s) if !self.use_accum_size && s.is_finite() => s.abs(),
                    _ => total,
                };
                d.num_leaves[i] = leaves;
                d.max_depth[i] = deepest;
                d.mean_order[i] = if leaves > 0 {
                    order_sum / leaves as f64
                } else {
                    node.data.order
                };
                d.location[i] = node.data.location.or_else(|| {
                    (located > 0).then(|| Point::new(sx / located as f64, sy / located as f64))
                });
            }
        }

        tracing::debug!("Rebuilt derived fields for {} nodes", n);
        d
    }
}

/// Iterator over the ancestors of a node, nearest first.
pub struct Ancestors<'a> {
    tree: &'a NodeTree,
    current: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.tree.nodes[id.index()].parent;
        Some(id)
    }
}
