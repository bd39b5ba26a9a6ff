//! Pivot layouts (Shneiderman & Wattenberg, ordered treemaps).
//!
//! A pivot item splits the list into three: the items before it go into a
//! leading region, the pivot and a greedy run of its successors share the
//! middle region, and the rest fill the trailing region. Each region is
//! handled the same way until four or fewer items are left.

use std::cmp::Ordering;

use crate::geometry::{aspect_deviation, Rect};

use super::ordered::{ordered_into, Placement, RowMetric};
use super::squarify::squarify_into;
use super::{normalised_areas, positive_indices, split_along, Direction, LayoutContext, LayoutItem};

/// How the pivot is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotRule {
    /// Middle index.
    Middle,
    /// Largest item.
    Size,
    /// The item that best balances the areas on either side of it.
    SplitSize,
    /// Median after sorting by location, west to east or north to south.
    Space,
}

const BASE_CASE: usize = 4;

pub fn pivot(items: &[LayoutItem], ctx: &LayoutContext, rule: PivotRule) -> Vec<Option<Rect>> {
    let areas = normalised_areas(items, ctx.bounds);
    let order = positive_indices(&areas);
    let mut out = vec![None; items.len()];
    pivot_into(&order, &areas, items, ctx.bounds, ctx, rule, &mut out);
    out
}

fn pivot_into(
    list: &[usize],
    areas: &[f64],
    items: &[LayoutItem],
    rect: Rect,
    ctx: &LayoutContext,
    rule: PivotRule,
    out: &mut [Option<Rect>],
) {
    if list.is_empty() {
        return;
    }
    if rect.is_degenerate() {
        tracing::debug!("Pivot: no room for {} items", list.len());
        return;
    }

    if list.len() <= BASE_CASE {
        if rule == PivotRule::Space {
            let mut ranked = list.to_vec();
            ranked.sort_by_key(|&i| items[i].rank);
            let (placement, metric) = (Placement::Spatial, RowMetric::Worst);
            ordered_into(&ranked, areas, items, rect, ctx, placement, metric, out);
        } else {
            squarify_into(list, areas, rect, ctx, out);
        }
        return;
    }

    let direction = Direction::for_rect(rect, ctx.alignment);
    let mut list = list.to_vec();
    if rule == PivotRule::Space {
        sort_by_location(&mut list, items, direction);
    }
    let p = choose_pivot(&list, areas, rule);

    let total: f64 = list.iter().map(|&i| areas[i]).sum();
    if total <= 0.0 {
        return;
    }
    let s1: f64 = list[..p].iter().map(|&i| areas[i]).sum();
    let (r1, rest) = split_along(rect, direction, s1 / total);
    let rest_total = total - s1;

    // Grow the pivot's region while that makes the pivot itself squarer.
    let pivot_area = areas[list[p]];
    let deviation = |s2: f64| {
        let fraction = if rest_total > 0.0 { s2 / rest_total } else { 1.0 };
        let thickness = direction.depth(rest) * fraction;
        let length = direction.strip_side(rest) * pivot_area / s2;
        let ratio = match direction {
            Direction::Horizontal => thickness / length,
            Direction::Vertical => length / thickness,
        };
        aspect_deviation(ratio, ctx.aspect_ratio)
    };
    let mut end = p + 1;
    let mut s2 = pivot_area;
    let mut best = deviation(s2);
    while end < list.len() {
        let grown = s2 + areas[list[end]];
        let next = deviation(grown);
        if next >= best {
            break;
        }
        best = next;
        s2 = grown;
        end += 1;
    }

    let fraction = if rest_total > 0.0 { s2 / rest_total } else { 1.0 };
    let (r2, r3) = split_along(rest, direction, fraction);
    let (pivot_rect, r2_rest) = split_along(r2, direction.flip(), pivot_area / s2);
    if !pivot_rect.is_degenerate() {
        out[list[p]] = Some(pivot_rect);
    }

    pivot_into(&list[..p], areas, items, r1, ctx, rule, out);
    pivot_into(&list[p + 1..end], areas, items, r2_rest, ctx, rule, out);
    pivot_into(&list[end..], areas, items, r3, ctx, rule, out);
}

fn choose_pivot(list: &[usize], areas: &[f64], rule: PivotRule) -> usize {
    match rule {
        PivotRule::Middle | PivotRule::Space => list.len() / 2,
        PivotRule::Size => {
            let mut best = 0;
            for (k, &i) in list.iter().enumerate() {
                if areas[i] > areas[list[best]] {
                    best = k;
                }
            }
            best
        }
        PivotRule::SplitSize => {
            let total: f64 = list.iter().map(|&i| areas[i]).sum();
            let mut before = 0.0;
            let mut best = (0, f64::INFINITY);
            for (k, &i) in list.iter().enumerate() {
                let after = total - before - areas[i];
                let imbalance = (before - after).abs();
                if imbalance < best.1 {
                    best = (k, imbalance);
                }
                before += areas[i];
            }
            best.0
        }
    }
}

/// West to east for horizontal advance, north to south for vertical.
/// Unlocated items go last, keeping their relative order.
fn sort_by_location(list: &mut [usize], items: &[LayoutItem], direction: Direction) {
    list.sort_by(|&a, &b| match (items[a].location, items[b].location) {
        (Some(pa), Some(pb)) => match direction {
            Direction::Horizontal => pa.x.total_cmp(&pb.x),
            Direction::Vertical => pb.y.total_cmp(&pa.y),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
