pub mod adjacency;
pub mod config;
pub mod morton;
pub mod ordered;
pub mod pivot;
pub mod slice;
pub mod squarify;
pub mod strip;

use std::borrow::Cow;
use std::collections::HashMap;

use crate::geometry::morton::MortonList;
use crate::geometry::{Point, Rect, AREA_EPSILON};
use crate::tree::arena::{NodeId, NodeTree};

pub use self::config::{Alignment, LayoutConfig, LayoutKind, LevelConfig, MAX_DEPTH};

/// One sibling handed to a layout algorithm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutItem {
    /// Target area in layout units².
    pub area: f64,
    /// Geographic location, used by the spatial layouts.
    pub location: Option<Point>,
    /// Position in the sibling ordering (0 = first).
    pub rank: usize,
}

impl LayoutItem {
    pub fn new(area: f64, rank: usize) -> Self {
        Self {
            area,
            location: None,
            rank,
        }
    }

    pub fn located(area: f64, rank: usize, location: Point) -> Self {
        Self {
            area,
            location: Some(location),
            rank,
        }
    }
}

/// Where and how one sibling group is laid out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutContext {
    pub bounds: Rect,
    pub alignment: Alignment,
    pub aspect_ratio: f64,
}

impl LayoutContext {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            alignment: Alignment::Free,
            aspect_ratio: 1.0,
        }
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// A ratio that is not finite and positive is replaced by 1.0.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        self.aspect_ratio = if is_valid_aspect_ratio(aspect_ratio) {
            aspect_ratio
        } else {
            tracing::warn!("Aspect ratio {} is not usable; using 1.0", aspect_ratio);
            1.0
        };
        self
    }
}

fn is_valid_aspect_ratio(aspect_ratio: f64) -> bool {
    aspect_ratio.is_finite() && aspect_ratio > 0.0
}

/// Turns a list of sibling areas into rectangles tiling `ctx.bounds`.
///
/// The result is aligned with `items`. Items with no positive area get `None`;
/// the rest are non-overlapping and together cover the bounds.
pub trait LayoutAlgorithm {
    fn layout(&self, items: &[LayoutItem], ctx: &LayoutContext) -> Vec<Option<Rect>>;
}

impl LayoutAlgorithm for LayoutKind {
    fn layout(&self, items: &[LayoutItem], ctx: &LayoutContext) -> Vec<Option<Rect>> {
        use self::ordered::{Placement, RowMetric};
        use self::pivot::PivotRule;

        match self {
            LayoutKind::SliceAndDice => slice::slice_and_dice(items, ctx),
            LayoutKind::Squarified => squarify::squarify(items, ctx),
            LayoutKind::OrderedSquarified => {
                ordered::ordered_squarify(items, ctx, Placement::Rank, RowMetric::Worst)
            }
            LayoutKind::Spatial => {
                ordered::ordered_squarify(items, ctx, Placement::Spatial, RowMetric::Worst)
            }
            LayoutKind::SpatialAv => {
                ordered::ordered_squarify(items, ctx, Placement::Spatial, RowMetric::Mean)
            }
            LayoutKind::Strip => strip::strip(items, ctx),
            LayoutKind::PivotMiddle => pivot::pivot(items, ctx, PivotRule::Middle),
            LayoutKind::PivotSize => pivot::pivot(items, ctx, PivotRule::Size),
            LayoutKind::PivotSplitSize => pivot::pivot(items, ctx, PivotRule::SplitSize),
            LayoutKind::PivotSpace => pivot::pivot(items, ctx, PivotRule::Space),
            LayoutKind::Morton => morton::morton(items, ctx),
        }
    }
}

/// Which way successive strips, rows or partitions advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Advance along x: strips are columns, cuts are vertical lines.
    Horizontal,
    /// Advance along y: strips are rows, cuts are horizontal lines.
    Vertical,
}

impl Direction {
    /// `Free` picks horizontal when the rectangle is at least as wide as it is
    /// tall, so a square always advances left to right.
    pub fn for_rect(rect: Rect, alignment: Alignment) -> Self {
        match alignment {
            Alignment::Horizontal => Direction::Horizontal,
            Alignment::Vertical => Direction::Vertical,
            Alignment::Free if rect.w >= rect.h => Direction::Horizontal,
            Alignment::Free => Direction::Vertical,
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }

    /// Length of the side a strip spans.
    pub fn strip_side(self, rect: Rect) -> f64 {
        match self {
            Direction::Horizontal => rect.h,
            Direction::Vertical => rect.w,
        }
    }

    /// Extent available for strip thickness.
    pub fn depth(self, rect: Rect) -> f64 {
        match self {
            Direction::Horizontal => rect.w,
            Direction::Vertical => rect.h,
        }
    }

    /// Target ratio for the row formulas, which measure ratios with the strip's
    /// side as the width.
    pub fn row_target(self, aspect_ratio: f64) -> f64 {
        match self {
            Direction::Horizontal => 1.0 / aspect_ratio,
            Direction::Vertical => aspect_ratio,
        }
    }

    /// Coordinate along the strip's side (used to keep rows in spatial order).
    pub fn along(self, p: Point) -> f64 {
        match self {
            Direction::Horizontal => p.y,
            Direction::Vertical => p.x,
        }
    }
}

/// Scale item areas so the positive ones sum to the bounds' area. Non-positive
/// and non-finite areas become 0.
pub(crate) fn normalised_areas(items: &[LayoutItem], bounds: Rect) -> Vec<f64> {
    let clean: Vec<f64> = items
        .iter()
        .map(|it| {
            if it.area.is_finite() && it.area > AREA_EPSILON {
                it.area
            } else {
                0.0
            }
        })
        .collect();
    let total: f64 = clean.iter().sum();
    let target = bounds.area();
    if total <= 0.0 || !target.is_finite() || target <= 0.0 {
        return vec![0.0; items.len()];
    }
    let scale = target / total;
    clean.into_iter().map(|a| a * scale).collect()
}

pub(crate) fn positive_indices(areas: &[f64]) -> Vec<usize> {
    (0..areas.len()).filter(|&i| areas[i] > 0.0).collect()
}

/// Lay `row` out as one strip along the leading edge of `rect` (left column
/// for horizontal advance, top row for vertical) and return the rectangle left
/// over. With `fill` the strip takes the whole of `rect`, so the final strip
/// never leaves a rounding sliver behind.
pub(crate) fn place_strip(
    row: &[usize],
    areas: &[f64],
    rect: Rect,
    direction: Direction,
    fill: bool,
    out: &mut [Option<Rect>],
) -> Rect {
    let sum: f64 = row.iter().map(|&i| areas[i]).sum();
    let side = direction.strip_side(rect);
    if row.is_empty() || sum <= 0.0 || rect.is_degenerate() {
        return rect;
    }

    let depth = direction.depth(rect);
    let thickness = if fill { depth } else { (sum / side).min(depth) };
    if !thickness.is_finite() || thickness <= 0.0 {
        tracing::warn!(
            "Strip: invalid thickness {} (sum={}, side={}), skipping {} items",
            thickness,
            sum,
            side,
            row.len()
        );
        return rect;
    }

    let mut offset = 0.0;
    for (k, &i) in row.iter().enumerate() {
        let length = if k + 1 == row.len() {
            side - offset
        } else {
            areas[i] / sum * side
        };
        out[i] = Some(match direction {
            Direction::Horizontal => Rect::new(rect.x, rect.y + offset, thickness, length),
            Direction::Vertical => Rect::new(rect.x + offset, rect.y, length, thickness),
        });
        offset += length;
    }

    match direction {
        Direction::Horizontal => rect.split_x(thickness).1,
        Direction::Vertical => rect.split_y(thickness).1,
    }
}

/// Cut `rect` across `direction` so the leading part holds `fraction` of it.
pub(crate) fn split_along(rect: Rect, direction: Direction, fraction: f64) -> (Rect, Rect) {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    match direction {
        Direction::Horizontal => rect.split_x(rect.w * fraction),
        Direction::Vertical => rect.split_y(rect.h * fraction),
    }
}

/// A positioned rectangle in the treemap layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutRect {
    pub node: NodeId,
    pub rect: Rect,
    /// Depth below the layout root (root = 0).
    pub depth: u16,
}

/// The full layout result, keyed by node identity.
#[derive(Debug, Clone)]
pub struct Layout {
    pub root: NodeId,
    /// All visible rectangles, parents before children.
    pub rects: Vec<LayoutRect>,
    /// node → index into `rects`
    pub node_to_rect: HashMap<NodeId, usize>,
    areas: Vec<f64>,
    inner: HashMap<NodeId, Rect>,
    neighbours: HashMap<NodeId, Vec<NodeId>>,
}

impl Layout {
    fn empty(root: NodeId, node_count: usize) -> Self {
        Self {
            root,
            rects: Vec::new(),
            node_to_rect: HashMap::new(),
            areas: vec![0.0; node_count],
            inner: HashMap::new(),
            neighbours: HashMap::new(),
        }
    }

    fn push(&mut self, node: NodeId, rect: Rect, depth: u16) {
        self.node_to_rect.insert(node, self.rects.len());
        self.rects.push(LayoutRect { node, rect, depth });
    }

    /// Rectangle assigned to `node`, `None` if it was too small or never reached.
    pub fn rect(&self, node: NodeId) -> Option<Rect> {
        self.node_to_rect.get(&node).map(|&i| self.rects[i].rect)
    }

    /// Area (layout units²) assigned to `node`; always >= 0.
    pub fn area(&self, node: NodeId) -> f64 {
        self.areas.get(node.index()).copied().unwrap_or(0.0)
    }

    /// The border-inset rectangle `node`'s children were laid out in.
    pub fn inner_rect(&self, node: NodeId) -> Option<Rect> {
        self.inner.get(&node).copied()
    }

    /// Adjacent siblings of `node`, `None` when it has none.
    pub fn neighbours(&self, node: NodeId) -> Option<&[NodeId]> {
        self.neighbours.get(&node).map(Vec::as_slice)
    }

    /// Bounding box of the explicit locations of `node` and its descendants,
    /// or the node's own rectangle when none of them is located.
    pub fn geo_bounds(&self, tree: &NodeTree, node: NodeId) -> Option<Rect> {
        let located = std::iter::once(node)
            .chain(tree.bfs(node))
            .filter_map(|id| tree.get(id).data.location);
        Rect::bounding(located).or_else(|| self.rect(node))
    }
}

/// Largest border <= `border` that fits inside `rect`: the border shrinks in
/// unit steps while `2·border` reaches either side, and never goes below 0.
pub fn fit_border(rect: Rect, border: f64) -> f64 {
    let mut b = if border.is_finite() { border.max(0.0) } else { 0.0 };
    while b > 0.0 && (rect.w <= 2.0 * b || rect.h <= 2.0 * b) {
        b -= 1.0;
    }
    b.max(0.0)
}

/// Pass 1: give every node below `root` an area proportional to its
/// accumulated size within its parent.
fn propagate_areas(tree: &NodeTree, root: NodeId, areas: &mut [f64]) {
    let mut queue = std::collections::VecDeque::from([root]);
    while let Some(parent) = queue.pop_front() {
        let parent_size = tree.accum_size(parent);
        let parent_area = areas[parent.index()];
        for &child in tree.children(parent) {
            areas[child.index()] = if parent_size > 0.0 {
                parent_area * tree.accum_size(child) / parent_size
            } else {
                0.0
            };
            queue.push_back(child);
        }
    }
}

/// Compute layout for any subtree (`root` can be any node for drill-down).
pub fn compute_layout(tree: &NodeTree, root: NodeId, config: &LayoutConfig) -> Layout {
    let mut layout = Layout::empty(root, tree.len());
    let canvas = Rect::new(0.0, 0.0, config.width, config.height);
    if canvas.is_degenerate() {
        tracing::warn!(
            "Canvas {}x{} has no area; nothing laid out",
            config.width,
            config.height
        );
        return layout;
    }

    let config = if is_valid_aspect_ratio(config.aspect_ratio) {
        Cow::Borrowed(config)
    } else {
        tracing::warn!(
            "Aspect ratio {} is not usable; laying out with 1.0",
            config.aspect_ratio
        );
        Cow::Owned(LayoutConfig {
            aspect_ratio: 1.0,
            ..config.clone()
        })
    };

    layout.areas[root.index()] = canvas.area();
    propagate_areas(tree, root, &mut layout.areas);
    layout.push(root, canvas, 0);

    tracing::info!(
        "Laying out {} nodes below '{}' (accum size={:.2}) in {:.0}x{:.0} area",
        tree.bfs(root).count(),
        tree.get(root).data.label,
        tree.accum_size(root),
        canvas.w,
        canvas.h
    );

    layout_children(tree, root, canvas, 0, &config, &mut layout);
    adjacency::build_neighbours(tree, &mut layout);
    layout
}

/// Pass 2: inset the parent's rectangle, rescale the children's areas to the
/// inset and hand them to the level's algorithm, then recurse.
fn layout_children(
    tree: &NodeTree,
    parent: NodeId,
    rect: Rect,
    depth: u16,
    config: &LayoutConfig,
    layout: &mut Layout,
) {
    let children = tree.children(parent);
    if children.is_empty() || depth >= config.max_depth {
        return;
    }

    let level = config.level(depth as usize);
    let inner = if depth == 0 {
        rect
    } else {
        let border = fit_border(rect, level.border);
        if border < level.border {
            tracing::debug!(
                "Border for '{}' reduced from {} to {} to fit {:.1}x{:.1}",
                tree.get(parent).data.label,
                level.border,
                border,
                rect.w,
                rect.h
            );
        }
        rect.inset(border)
    };

    if inner.is_degenerate() {
        tracing::debug!(
            "No room for the {} children of '{}' at depth {}",
            children.len(),
            tree.get(parent).data.label,
            depth
        );
        return;
    }

    let total: f64 = children.iter().map(|&c| layout.areas[c.index()]).sum();
    if total <= 0.0 {
        tracing::debug!(
            "Skipping layout for '{}' with zero child area at depth {}",
            tree.get(parent).data.label,
            depth
        );
        return;
    }
    let scale = inner.area() / total;
    for &c in children {
        layout.areas[c.index()] *= scale;
    }
    layout.inner.insert(parent, inner);

    let order = arrange(tree, children, level.layout);
    let items: Vec<LayoutItem> = order
        .iter()
        .map(|&(id, rank)| LayoutItem {
            area: layout.areas[id.index()],
            location: tree.location(id),
            rank,
        })
        .collect();
    let ctx = LayoutContext::new(inner)
        .with_alignment(level.alignment)
        .with_aspect_ratio(config.aspect_ratio);
    let placed = level.layout.layout(&items, &ctx);

    let child_depth = depth + 1;
    for (&(id, _), placed) in order.iter().zip(placed) {
        match placed {
            Some(r) if !r.is_degenerate() => {
                layout.push(id, r, child_depth);
                if !tree.is_leaf(id) {
                    layout_children(tree, id, r, child_depth, config, layout);
                }
            }
            _ => {
                tracing::debug!(
                    "'{}' gets no rectangle (area={:.3})",
                    tree.get(id).data.label,
                    layout.areas[id.index()]
                );
            }
        }
    }
}

/// Children in the order the algorithm expects, paired with their sibling rank.
/// Morton layouts walk located siblings in curve order.
fn arrange(tree: &NodeTree, children: &[NodeId], kind: LayoutKind) -> Vec<(NodeId, usize)> {
    let ranked: Vec<(NodeId, usize)> = children.iter().copied().zip(0..).collect();
    if kind != LayoutKind::Morton {
        return ranked;
    }

    let mut curve = MortonList::new();
    for &(id, rank) in &ranked {
        match tree.location(id) {
            Some(p) if p.is_finite() => curve.push(p, (id, rank)),
            _ => return ranked,
        }
    }
    curve.into_sorted().into_iter().map(|(_, entry)| entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::arena::NodeData;

    #[test]
    fn free_alignment_tie_breaks_horizontal() {
        let square = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(Direction::for_rect(square, Alignment::Free), Direction::Horizontal);
        let tall = Rect::new(0.0, 0.0, 5.0, 10.0);
        assert_eq!(Direction::for_rect(tall, Alignment::Free), Direction::Vertical);
        assert_eq!(Direction::for_rect(tall, Alignment::Horizontal), Direction::Horizontal);
    }

    #[test]
    fn border_shrinks_in_unit_steps() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(fit_border(r, 6.0), 4.0);
        assert_eq!(fit_border(r, 3.0), 3.0);
        assert_eq!(fit_border(Rect::new(0.0, 0.0, 1.0, 1.0), 2.5), 0.0);
        assert_eq!(fit_border(r, -2.0), 0.0);
        assert_eq!(fit_border(r, f64::NAN), 0.0);
    }

    #[test]
    fn normalised_areas_fill_bounds_and_drop_non_positive() {
        let items = [
            LayoutItem::new(1.0, 0),
            LayoutItem::new(0.0, 1),
            LayoutItem::new(-4.0, 2),
            LayoutItem::new(3.0, 3),
            LayoutItem::new(f64::NAN, 4),
        ];
        let areas = normalised_areas(&items, Rect::new(0.0, 0.0, 20.0, 10.0));
        assert_eq!(areas, vec![50.0, 0.0, 0.0, 150.0, 0.0]);
        assert_eq!(positive_indices(&areas), vec![0, 3]);
    }

    #[test]
    fn place_strip_fills_side_exactly() {
        let mut out = vec![None; 3];
        let areas = [10.0, 20.0, 30.0];
        let bounds = Rect::new(0.0, 0.0, 20.0, 10.0);
        let rest = place_strip(&[0, 1, 2], &areas, bounds, Direction::Horizontal, false, &mut out);
        assert_eq!(rest, Rect::new(6.0, 0.0, 14.0, 10.0));
        let heights: Vec<f64> = out.iter().map(|r| r.map(|r| r.h).unwrap_or(0.0)).collect();
        assert!((heights.iter().sum::<f64>() - 10.0).abs() < 1e-12);
        assert!(out.iter().all(|r| r.map(|r| (r.w - 6.0).abs() < 1e-12).unwrap_or(false)));
    }

    #[test]
    fn layout_exposes_areas_and_geo_bounds() {
        let mut tree = NodeTree::new("root");
        let a = NodeData::new("a").with_size(3.0).with_location(1.0, 1.0);
        let a = tree.add_child(tree.root, a);
        let b = NodeData::new("b").with_size(1.0).with_location(3.0, 4.0);
        let b = tree.add_child(tree.root, b);
        let config = LayoutConfig::new(40.0, 10.0).with_layout(LayoutKind::SliceAndDice);
        let layout = compute_layout(&tree, tree.root, &config);
        assert_eq!(layout.area(a), 300.0);
        assert_eq!(layout.area(b), 100.0);
        assert_eq!(layout.rect(a), Some(Rect::new(0.0, 0.0, 30.0, 10.0)));
        assert_eq!(layout.geo_bounds(&tree, tree.root), Some(Rect::new(1.0, 1.0, 2.0, 3.0)));

        let plain = NodeTree::new("lonely");
        let layout = compute_layout(&plain, plain.root, &config);
        assert_eq!(layout.geo_bounds(&plain, plain.root), Some(Rect::new(0.0, 0.0, 40.0, 10.0)));
    }

    #[test]
    fn unusable_aspect_ratio_lays_out_with_square_target() {
        let mut tree = NodeTree::new("root");
        let leaves: Vec<NodeId> = (0..9)
            .map(|i| tree.add_child(tree.root, NodeData::new(&format!("n{i}")).with_size(1.0)))
            .collect();

        let mut config = LayoutConfig::new(300.0, 300.0).with_layout(LayoutKind::Squarified);
        for bad in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            config.aspect_ratio = bad;
            let layout = compute_layout(&tree, tree.root, &config);
            for &leaf in &leaves {
                let r = layout.rect(leaf).expect("leaf laid out");
                assert!((r.w - 100.0).abs() < 1e-6 && (r.h - 100.0).abs() < 1e-6, "{bad}: {r:?}");
            }
        }

        let bounds = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(LayoutContext::new(bounds).with_aspect_ratio(-2.0).aspect_ratio, 1.0);
        assert_eq!(LayoutContext::new(bounds).with_aspect_ratio(1.5).aspect_ratio, 1.5);
    }

    #[test]
    fn degenerate_canvas_lays_out_nothing() {
        let mut tree = NodeTree::new("root");
        tree.add_child(tree.root, NodeData::new("a").with_size(1.0));
        let config = LayoutConfig::new(0.0, 100.0);
        let layout = compute_layout(&tree, tree.root, &config);
        assert!(layout.rects.is_empty());
    }
}
