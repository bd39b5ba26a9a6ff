use crate::geometry::{worst_aspect_ratio, Rect};

use super::{normalised_areas, place_strip, positive_indices, Direction, LayoutContext, LayoutItem};

/// Squarified layout (Bruls, Huizing & van Wijk).
///
/// Items are taken in input order. Each row grows while its worst aspect ratio
/// does not get worse, is laid along the shorter side of the remaining space,
/// and the next row starts in what is left.
pub fn squarify(items: &[LayoutItem], ctx: &LayoutContext) -> Vec<Option<Rect>> {
    let areas = normalised_areas(items, ctx.bounds);
    let order = positive_indices(&areas);
    let mut out = vec![None; items.len()];
    squarify_into(&order, &areas, ctx.bounds, ctx, &mut out);
    out
}

/// Squarify the items `order` points at into `bounds`. `areas` must already be
/// scaled so the listed items fill `bounds`.
pub(crate) fn squarify_into(
    order: &[usize],
    areas: &[f64],
    bounds: Rect,
    ctx: &LayoutContext,
    out: &mut [Option<Rect>],
) {
    let mut rect = bounds;
    let mut start = 0;
    let mut row: Vec<f64> = Vec::with_capacity(order.len());

    while start < order.len() {
        // Guard against degenerate cases
        if rect.is_degenerate() {
            tracing::debug!(
                "Squarify: space exhausted with {} items left",
                order.len() - start
            );
            break;
        }

        let direction = Direction::for_rect(rect, ctx.alignment);
        let side = direction.strip_side(rect);
        let target = direction.row_target(ctx.aspect_ratio);

        row.clear();
        row.push(areas[order[start]]);
        let mut worst = worst_aspect_ratio(&row, side, target);
        let mut end = start + 1;
        while end < order.len() {
            row.push(areas[order[end]]);
            let next = worst_aspect_ratio(&row, side, target);
            if next > worst {
                break;
            }
            worst = next;
            end += 1;
        }

        rect = place_strip(&order[start..end], areas, rect, direction, end == order.len(), out);
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Alignment;

    fn items(areas: &[f64]) -> Vec<LayoutItem> {
        areas.iter().enumerate().map(|(i, &a)| LayoutItem::new(a, i)).collect()
    }

    #[test]
    fn single_item_fills_viewport_without_axis_swap() {
        let ctx = LayoutContext::new(Rect::new(0.0, 0.0, 1920.0, 1080.0));
        let rects = squarify(&items(&[1920.0 * 1080.0]), &ctx);
        assert_eq!(rects.len(), 1);
        let r = rects[0].expect("laid out");
        assert!((r.w - 1920.0).abs() < 1e-6);
        assert!((r.h - 1080.0).abs() < 1e-6);
    }

    #[test]
    fn layout_preserves_area_for_simple_case() {
        let ctx = LayoutContext::new(Rect::new(0.0, 0.0, 50.0, 20.0));
        let rects = squarify(&items(&[400.0, 300.0, 200.0, 100.0]), &ctx);
        let total_out: f64 = rects.iter().flatten().map(|r| r.area()).sum();
        assert!((1000.0 - total_out).abs() < 1e-6);
    }

    #[test]
    fn three_to_one_split_of_400_by_300() {
        let ctx = LayoutContext::new(Rect::new(0.0, 0.0, 400.0, 300.0));
        let rects = squarify(&items(&[3.0, 1.0]), &ctx);
        let a = rects[0].expect("first");
        let b = rects[1].expect("second");
        assert!((a.area() - 90_000.0).abs() < 1e-6);
        assert!((b.area() - 30_000.0).abs() < 1e-6);
        assert!((a.w - 300.0).abs() < 1e-9 && (a.h - 300.0).abs() < 1e-9);
        assert_eq!(b, Rect::new(300.0, 0.0, 100.0, 300.0));
        assert_eq!(a.intersection_area(&b), 0.0);
    }

    #[test]
    fn classic_paper_example_rows() {
        // Bruls et al. example: 6x4 with areas 6,6,4,3,2,2,1.
        let ctx = LayoutContext::new(Rect::new(0.0, 0.0, 6.0, 4.0));
        let rects = squarify(&items(&[6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0]), &ctx);
        // First row: the two 6s stacked in a 3-wide column.
        assert_eq!(rects[0], Some(Rect::new(0.0, 0.0, 3.0, 2.0)));
        assert_eq!(rects[1], Some(Rect::new(0.0, 2.0, 3.0, 2.0)));
        let total: f64 = rects.iter().flatten().map(|r| r.area()).sum();
        assert!((total - 24.0).abs() < 1e-9);
    }

    #[test]
    fn forced_vertical_alignment_builds_rows() {
        let bounds = Rect::new(0.0, 0.0, 10.0, 10.0);

        // Free: a square advances left to right, so the lone third item is a column.
        let free = squarify(&items(&[1.0, 1.0, 1.0]), &LayoutContext::new(bounds));
        let third = free[2].expect("third");
        assert!((third.h - 10.0).abs() < 1e-9);

        // Vertical: the first two share a top row and the third is a full-width row.
        let ctx = LayoutContext::new(bounds).with_alignment(Alignment::Vertical);
        let rows = squarify(&items(&[1.0, 1.0, 1.0]), &ctx);
        let (a, b, c) = (rows[0].expect("a"), rows[1].expect("b"), rows[2].expect("c"));
        assert_eq!(a.y, 0.0);
        assert_eq!(b.y, 0.0);
        assert!((c.w - 10.0).abs() < 1e-9);
        assert!((c.y - 20.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn zero_area_items_are_skipped() {
        let ctx = LayoutContext::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let rects = squarify(&items(&[0.0, 5.0, -1.0, 5.0]), &ctx);
        assert_eq!(rects[0], None);
        assert_eq!(rects[2], None);
        let total: f64 = rects.iter().flatten().map(|r| r.area()).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }
}
