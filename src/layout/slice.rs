use crate::geometry::Rect;

use super::{normalised_areas, place_strip, positive_indices, Direction, LayoutContext, LayoutItem};

/// Slice-and-dice: every item becomes a parallel strip, in input order.
/// Horizontal direction places the strips left to right, vertical top to bottom.
pub fn slice_and_dice(items: &[LayoutItem], ctx: &LayoutContext) -> Vec<Option<Rect>> {
    let areas = normalised_areas(items, ctx.bounds);
    let order = positive_indices(&areas);
    let mut out = vec![None; items.len()];
    if ctx.bounds.is_degenerate() {
        return out;
    }

    // A single strip across the perpendicular direction that takes the whole
    // rectangle is exactly a slice of it.
    let direction = Direction::for_rect(ctx.bounds, ctx.alignment);
    place_strip(&order, &areas, ctx.bounds, direction.flip(), true, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Alignment;

    fn items(areas: &[f64]) -> Vec<LayoutItem> {
        areas.iter().enumerate().map(|(i, &a)| LayoutItem::new(a, i)).collect()
    }

    #[test]
    fn equal_items_in_square_become_vertical_strips() {
        let ctx = LayoutContext::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let rects = slice_and_dice(&items(&[1.0, 1.0, 1.0, 1.0]), &ctx);
        for (i, r) in rects.iter().enumerate() {
            let r = r.expect("laid out");
            assert!((r.x - 25.0 * i as f64).abs() < 1e-9);
            assert!((r.w - 25.0).abs() < 1e-9);
            assert_eq!(r.y, 0.0);
            assert_eq!(r.h, 100.0);
        }
    }

    #[test]
    fn vertical_alignment_stacks_top_to_bottom() {
        let ctx = LayoutContext::new(Rect::new(0.0, 0.0, 100.0, 50.0))
            .with_alignment(Alignment::Vertical);
        let rects = slice_and_dice(&items(&[3.0, 1.0]), &ctx);
        assert_eq!(rects[0], Some(Rect::new(0.0, 0.0, 100.0, 37.5)));
        assert_eq!(rects[1], Some(Rect::new(0.0, 37.5, 100.0, 12.5)));
    }

    #[test]
    fn zero_area_item_gets_nothing_and_rest_still_tiles() {
        let ctx = LayoutContext::new(Rect::new(0.0, 0.0, 60.0, 10.0));
        let rects = slice_and_dice(&items(&[1.0, 0.0, 2.0]), &ctx);
        assert_eq!(rects[1], None);
        assert_eq!(rects[0], Some(Rect::new(0.0, 0.0, 20.0, 10.0)));
        assert_eq!(rects[2], Some(Rect::new(20.0, 0.0, 40.0, 10.0)));
    }
}
