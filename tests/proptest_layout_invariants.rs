//! Property-based invariant tests for the layout algorithms.
//!
//! For any weights, canvas and alignment, every algorithm must:
//!
//! 1. Give no rectangle to items without positive area.
//! 2. Keep every rectangle inside the bounds.
//! 3. Never overlap two rectangles.
//! 4. Cover the bounds exactly (areas sum to the bounds' area).
//! 5. Give each item an area proportional to its weight.
//!
//! Whole trees must additionally validate cleanly with borders applied.

use proptest::prelude::*;
use silvamap::geometry::{Point, Rect};
use silvamap::layout::{
    compute_layout, Alignment, LayoutAlgorithm, LayoutConfig, LayoutContext, LayoutItem, LayoutKind,
};
use silvamap::stats::validate;
use silvamap::{NodeData, NodeTree};

// ── Helpers ─────────────────────────────────────────────────────────────

fn kind_strategy() -> impl Strategy<Value = LayoutKind> {
    prop::sample::select(LayoutKind::ALL.to_vec())
}

fn alignment_strategy() -> impl Strategy<Value = Alignment> {
    prop::sample::select(vec![Alignment::Free, Alignment::Horizontal, Alignment::Vertical])
}

fn bounds_strategy() -> impl Strategy<Value = Rect> {
    (-500.0f64..500.0, -500.0f64..500.0, 1.0f64..2000.0, 1.0f64..2000.0)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

/// Weights with the occasional zero, plus an optional location each.
fn items_strategy() -> impl Strategy<Value = Vec<LayoutItem>> {
    prop::collection::vec(
        (
            prop_oneof![4 => 0.5f64..100.0, 1 => Just(0.0)],
            prop::option::of((-180.0f64..180.0, -90.0f64..90.0)),
        ),
        1..40,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(rank, (area, location))| LayoutItem {
                area,
                location: location.map(|(x, y)| Point::new(x, y)),
                rank,
            })
            .collect()
    })
}

// ═════════════════════════════════════════════════════════════════════════
// 1-5. Single sibling group
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn algorithms_tile_their_bounds(
        kind in kind_strategy(),
        alignment in alignment_strategy(),
        bounds in bounds_strategy(),
        aspect_ratio in prop_oneof![Just(1.0f64), 0.25f64..4.0],
        items in items_strategy(),
    ) {
        let ctx = LayoutContext::new(bounds)
            .with_alignment(alignment)
            .with_aspect_ratio(aspect_ratio);
        let rects = kind.layout(&items, &ctx);
        prop_assert_eq!(rects.len(), items.len());

        let total_weight: f64 = items.iter().map(|it| it.area).sum();
        if total_weight <= 0.0 {
            prop_assert!(rects.iter().all(Option::is_none));
            return Ok(());
        }
        let scale = bounds.area() / total_weight;
        let edge = 1e-9 * bounds.w.max(bounds.h).max(1.0);
        let slack = 1e-9 * bounds.area();

        let mut covered = 0.0;
        for (i, (item, rect)) in items.iter().zip(&rects).enumerate() {
            match rect {
                None => prop_assert!(
                    item.area <= 0.0 || item.area * scale < 1e-6,
                    "{} dropped item {} with weight {}", kind, i, item.area
                ),
                Some(r) => {
                    prop_assert!(item.area > 0.0, "{} placed a zero item", kind);
                    prop_assert!(
                        bounds.contains_rect(r, edge),
                        "{}: {:?} escapes {:?}", kind, r, bounds
                    );
                    let wanted = item.area * scale;
                    prop_assert!(
                        (r.area() - wanted).abs() <= 1e-6 * bounds.area().max(1.0),
                        "{}: item {} got {} instead of {}", kind, i, r.area(), wanted
                    );
                    covered += r.area();
                }
            }
        }
        prop_assert!(
            (covered - bounds.area()).abs() <= 1e-6 * bounds.area(),
            "{}: covered {}", kind, covered
        );

        let placed: Vec<Rect> = rects.iter().flatten().copied().collect();
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                prop_assert!(a.intersection_area(b) <= slack, "{}: {:?} overlaps {:?}", kind, a, b);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Whole trees with borders
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn trees_validate_with_borders(
        kind in kind_strategy(),
        border in 0.0f64..4.0,
        groups in prop::collection::vec(prop::collection::vec(0.0f64..50.0, 1..8), 1..8),
    ) {
        let mut tree = NodeTree::new("root");
        for (g, weights) in groups.iter().enumerate() {
            let branch = tree.add_child(tree.root, NodeData::new(&format!("g{g}")));
            for (l, &w) in weights.iter().enumerate() {
                let leaf = NodeData::new(&format!("g{g}/{l}"))
                    .with_size(w)
                    .with_location(l as f64, g as f64);
                tree.add_child(branch, leaf);
            }
        }

        let config = LayoutConfig::new(800.0, 600.0).with_layout(kind).with_border(border);
        let layout = compute_layout(&tree, tree.root, &config);
        let issues = validate(&tree, &layout, 1e-6);
        prop_assert!(issues.is_empty(), "{}: {:?}", kind, issues);
    }
}
