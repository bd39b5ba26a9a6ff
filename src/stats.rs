//! Read-only diagnostics over a finished layout: quality statistics and
//! structural validation. Nothing here feeds back into layout.

use std::f64::consts::SQRT_2;
use std::fmt;

use crate::geometry::{Point, Rect, AREA_EPSILON};
use crate::layout::{Layout, LayoutConfig};
use crate::tree::arena::{NodeId, NodeTree};

/// Turns sharper than this (radians, about 5.7°) make a reading path unreadable.
pub const TURN_THRESHOLD: f64 = 0.1;

/// Summary statistics of one layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutStats {
    /// Nodes that count: laid out, not dummies, not the root, at least 1x1.
    pub nodes: usize,
    pub leaves: usize,
    /// Mean of `max(w/h, h/w)`.
    pub mean_aspect: f64,
    /// 1.0 when sibling leaves read along a straight path in sibling order.
    pub readability: f64,
    /// Mean distance between a node's relative position in its parent and its
    /// relative geographic position, normalised to 0..1. Spatial levels only.
    pub displacement: Option<f64>,
    /// Mean angle (radians) between layout and geographic vectors of sibling
    /// pairs. Spatial levels only.
    pub angular_deviation: Option<f64>,
    /// Weighted mean r² between sibling rank and distance from the parent's
    /// corner. Non-spatial levels only.
    pub order_r2: Option<f64>,
}

impl fmt::Display for LayoutStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn opt(v: Option<f64>) -> String {
            v.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string())
        }
        write!(
            f,
            "nodes={} leaves={} aspect={:.3} readability={:.3} \
             displacement={} angle={} order_r2={}",
            self.nodes,
            self.leaves,
            self.mean_aspect,
            self.readability,
            opt(self.displacement),
            opt(self.angular_deviation),
            opt(self.order_r2)
        )
    }
}

fn eligible(tree: &NodeTree, layout: &Layout, id: NodeId) -> Option<Rect> {
    if id == layout.root || tree.get(id).data.is_dummy() {
        return None;
    }
    layout.rect(id).filter(|r| r.w >= 1.0 && r.h >= 1.0)
}

/// Gather statistics for every sibling group below `layout.root`. `config`
/// tells which levels were laid out spatially.
pub fn compute_stats(tree: &NodeTree, layout: &Layout, config: &LayoutConfig) -> LayoutStats {
    let mut stats = LayoutStats::default();
    let mut aspect_sum = 0.0;
    let (mut turns, mut turn_checks) = (0usize, 0usize);
    let (mut displacement_sum, mut displacement_n) = (0.0, 0usize);
    let (mut angle_sum, mut angle_n) = (0.0, 0usize);
    let (mut r2_sum, mut r2_weight) = (0.0, 0.0);

    let parents = std::iter::once(layout.root)
        .chain(tree.bfs(layout.root))
        .filter(|&id| !tree.is_leaf(id));
    for parent in parents {
        let group: Vec<(usize, NodeId, Rect)> = tree
            .children(parent)
            .iter()
            .enumerate()
            .filter_map(|(rank, &c)| eligible(tree, layout, c).map(|r| (rank, c, r)))
            .collect();
        if group.is_empty() {
            continue;
        }

        for &(_, c, r) in &group {
            stats.nodes += 1;
            aspect_sum += r.aspect_ratio();
            if tree.is_leaf(c) {
                stats.leaves += 1;
            }
        }

        let leaf_path: Vec<Point> = group
            .iter()
            .filter(|(_, c, _)| tree.is_leaf(*c))
            .map(|(_, _, r)| r.center())
            .collect();
        let (t, checks) = count_turns(&leaf_path);
        turns += t;
        turn_checks += checks;

        let Some(inner) = layout.inner_rect(parent) else {
            continue;
        };
        let depth = tree.level(parent).saturating_sub(tree.level(layout.root));
        if config.level(depth as usize).layout.is_spatial() {
            let located: Vec<(Point, Point)> = group
                .iter()
                .filter_map(|&(_, c, r)| tree.location(c).map(|geo| (r.center(), geo)))
                .collect();
            if located.len() >= 2 {
                for d in displacements(&located, inner) {
                    displacement_sum += d;
                    displacement_n += 1;
                }
                for a in pair_angles(&located) {
                    angle_sum += a;
                    angle_n += 1;
                }
            }
        } else if group.len() >= 3 {
            let origin = inner.origin();
            let ranks: Vec<f64> = group.iter().map(|&(rank, _, _)| rank as f64).collect();
            let distances: Vec<f64> = group
                .iter()
                .map(|(_, _, r)| r.center().distance(origin))
                .collect();
            if let Some(r) = pearson(&ranks, &distances) {
                let weight = group.len() as f64;
                r2_sum += r * r * weight;
                r2_weight += weight;
            }
        }
    }

    if stats.nodes > 0 {
        stats.mean_aspect = aspect_sum / stats.nodes as f64;
    }
    stats.readability = if turn_checks > 0 {
        1.0 - turns as f64 / turn_checks as f64
    } else {
        1.0
    };
    stats.displacement = (displacement_n > 0).then(|| displacement_sum / displacement_n as f64);
    stats.angular_deviation = (angle_n > 0).then(|| angle_sum / angle_n as f64);
    stats.order_r2 = (r2_weight > 0.0).then(|| r2_sum / r2_weight);
    stats
}

/// Number of direction changes sharper than [`TURN_THRESHOLD`] along `path`,
/// and the number of changes checked.
fn count_turns(path: &[Point]) -> (usize, usize) {
    let mut turns = 0;
    let mut checks = 0;
    let mut previous: Option<f64> = None;
    for w in path.windows(2) {
        let (dx, dy) = (w[1].x - w[0].x, w[1].y - w[0].y);
        if dx == 0.0 && dy == 0.0 {
            continue;
        }
        let heading = dy.atan2(dx);
        if let Some(prev) = previous {
            checks += 1;
            if angle_between(prev, heading) > TURN_THRESHOLD {
                turns += 1;
            }
        }
        previous = Some(heading);
    }
    (turns, checks)
}

fn angle_between(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(std::f64::consts::TAU);
    d.min(std::f64::consts::TAU - d)
}

/// Normalised distance between each centroid's place in `inner` and its
/// location's place in the group's geographic bounds (north up).
fn displacements(located: &[(Point, Point)], inner: Rect) -> Vec<f64> {
    let Some(geo) = Rect::bounding(located.iter().map(|&(_, g)| g)) else {
        return Vec::new();
    };
    let fraction = |v: f64, lo: f64, span: f64| if span > 0.0 { (v - lo) / span } else { 0.5 };
    located
        .iter()
        .map(|&(centre, g)| {
            let laid = Point::new(
                fraction(centre.x, inner.x, inner.w),
                fraction(centre.y, inner.y, inner.h),
            );
            let wanted = Point::new(fraction(g.x, geo.x, geo.w), 1.0 - fraction(g.y, geo.y, geo.h));
            laid.distance(wanted) / SQRT_2
        })
        .collect()
}

/// Angle between the layout vector and the geographic vector of every pair.
fn pair_angles(located: &[(Point, Point)]) -> Vec<f64> {
    let mut angles = Vec::new();
    for (i, &(ca, ga)) in located.iter().enumerate() {
        for &(cb, gb) in &located[i + 1..] {
            let (lx, ly) = (cb.x - ca.x, cb.y - ca.y);
            // Geographic y grows north, layout y grows down.
            let (gx, gy) = (gb.x - ga.x, ga.y - gb.y);
            if (lx == 0.0 && ly == 0.0) || (gx == 0.0 && gy == 0.0) {
                continue;
            }
            angles.push(angle_between(ly.atan2(lx), gy.atan2(gx)));
        }
    }
    angles
}

/// Pearson correlation, `None` when either series is constant.
fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mean = |v: &[f64]| v[..n].iter().sum::<f64>() / n as f64;
    let (mx, my) = (mean(xs), mean(ys));
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
        syy += (y - my) * (y - my);
    }
    (sxx > 0.0 && syy > 0.0).then(|| sxy / (sxx * syy).sqrt())
}

/// A structural problem found by [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutIssue {
    Overlap { a: NodeId, b: NodeId, area: f64 },
    Escapes { node: NodeId, parent: NodeId },
    AreaMismatch { parent: NodeId, expected: f64, actual: f64 },
}

impl fmt::Display for LayoutIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutIssue::Overlap { a, b, area } => {
                write!(f, "nodes {} and {} overlap by {area:.6}", a.0, b.0)
            }
            LayoutIssue::Escapes { node, parent } => {
                write!(f, "node {} leaves the rectangle of its parent {}", node.0, parent.0)
            }
            LayoutIssue::AreaMismatch { parent, expected, actual } => write!(
                f,
                "children of node {} cover {actual:.6} instead of {expected:.6}",
                parent.0
            ),
        }
    }
}

/// Check sibling overlap, containment in the parent's inset rectangle and
/// area conservation. `tolerance` is relative to the parent's inset area.
pub fn validate(tree: &NodeTree, layout: &Layout, tolerance: f64) -> Vec<LayoutIssue> {
    let mut issues = Vec::new();
    let parents = std::iter::once(layout.root)
        .chain(tree.bfs(layout.root))
        .filter(|&id| !tree.is_leaf(id));

    for parent in parents {
        let Some(inner) = layout.inner_rect(parent) else {
            continue;
        };
        let slack = tolerance * inner.area().max(1.0);
        let edge_slack = tolerance * inner.w.max(inner.h).max(1.0);
        let children = tree.children(parent);
        let placed: Vec<(NodeId, Rect)> = children
            .iter()
            .filter_map(|&c| layout.rect(c).map(|r| (c, r)))
            .collect();

        for (i, &(a, ra)) in placed.iter().enumerate() {
            if !inner.contains_rect(&ra, edge_slack) {
                issues.push(LayoutIssue::Escapes { node: a, parent });
            }
            for &(b, rb) in &placed[i + 1..] {
                let area = ra.intersection_area(&rb);
                if area > slack {
                    issues.push(LayoutIssue::Overlap { a, b, area });
                }
            }
        }

        // Conservation only holds once every child that asked for area got it.
        let complete = children
            .iter()
            .all(|&c| layout.area(c) <= AREA_EPSILON || layout.rect(c).is_some());
        if complete && !placed.is_empty() {
            let actual: f64 = placed.iter().map(|(_, r)| r.area()).sum();
            if (actual - inner.area()).abs() > slack {
                issues.push(LayoutIssue::AreaMismatch {
                    parent,
                    expected: inner.area(),
                    actual,
                });
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compute_layout, LayoutKind};
    use crate::tree::arena::NodeData;

    #[test]
    fn straight_path_is_fully_readable() {
        let path: Vec<Point> = (0..5).map(|i| Point::new(i as f64 * 10.0, 5.0)).collect();
        assert_eq!(count_turns(&path), (0, 3));
        let zigzag = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
        ];
        assert_eq!(count_turns(&zigzag), (2, 2));
    }

    #[test]
    fn pearson_detects_linear_relations() {
        let r = pearson(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).expect("defined");
        assert!((r - 1.0).abs() < 1e-12);
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[0.0, 1.0, 2.0]), None);
    }

    #[test]
    fn slice_layout_is_readable_and_ordered() {
        let mut tree = NodeTree::new("root");
        for i in 0..6 {
            tree.add_child(tree.root, NodeData::new(&format!("n{i}")).with_size(1.0));
        }
        tree.add_child(tree.root, NodeData::new("dummy").with_size(-1.0));
        let config = LayoutConfig::new(700.0, 100.0).with_layout(LayoutKind::SliceAndDice);
        let layout = compute_layout(&tree, tree.root, &config);

        let stats = compute_stats(&tree, &layout, &config);
        assert_eq!(stats.nodes, 6);
        assert_eq!(stats.leaves, 6);
        assert_eq!(stats.readability, 1.0);
        // Distance from the corner grows with rank, nearly linearly.
        assert!(stats.order_r2.expect("non-spatial") > 0.99);
        assert_eq!(stats.displacement, None);
        assert!(validate(&tree, &layout, 1e-9).is_empty());
    }

    #[test]
    fn spatial_layout_reports_geographic_fit() {
        let mut tree = NodeTree::new("root");
        for (x, y) in [(0.0, 1.0), (1.0, 1.0), (0.0, 0.0), (1.0, 0.0)] {
            tree.add_child(tree.root, NodeData::new("cell").with_size(1.0).with_location(x, y));
        }
        let config = LayoutConfig::new(100.0, 100.0).with_layout(LayoutKind::Spatial);
        let layout = compute_layout(&tree, tree.root, &config);
        let stats = compute_stats(&tree, &layout, &config);
        assert!(stats.order_r2.is_none());
        assert!(stats.angular_deviation.expect("spatial") < 1e-9);
        // Each centre sits a quarter in from the corner its location maps to.
        assert!((stats.displacement.expect("spatial") - 0.25).abs() < 1e-9);
    }

    #[test]
    fn validate_reports_overlap_and_escape() {
        let mut tree = NodeTree::new("root");
        let a = tree.add_child(tree.root, NodeData::new("a").with_size(1.0));
        let b = tree.add_child(tree.root, NodeData::new("b").with_size(1.0));
        let config = LayoutConfig::new(20.0, 10.0).with_layout(LayoutKind::SliceAndDice);
        let mut layout = compute_layout(&tree, tree.root, &config);
        assert!(validate(&tree, &layout, 1e-9).is_empty());

        let index = layout.node_to_rect[&b];
        layout.rects[index].rect = Rect::new(5.0, 0.0, 20.0, 10.0);
        let issues = validate(&tree, &layout, 1e-9);
        assert!(issues.contains(&LayoutIssue::Overlap { a, b, area: 50.0 }));
        assert!(issues.contains(&LayoutIssue::Escapes { node: b, parent: tree.root }));
        assert!(issues
            .iter()
            .any(|i| matches!(i, LayoutIssue::AreaMismatch { actual, .. } if *actual == 300.0)));
    }
}
