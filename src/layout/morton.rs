use crate::geometry::Rect;

use super::{
    normalised_areas, positive_indices, split_along, Alignment, Direction, LayoutContext,
    LayoutItem,
};

/// Morton layout: items arrive in curve order and the rectangle is cut
/// recursively where the running area reaches half, alternating the cut axis
/// the way bit interleaving alternates x and y.
///
/// With a fixed alignment the first cut follows it (vertical alignment gives
/// the Z walk, horizontal the mirrored N walk); with `Free` every cut goes
/// across the longer side.
pub fn morton(items: &[LayoutItem], ctx: &LayoutContext) -> Vec<Option<Rect>> {
    let areas = normalised_areas(items, ctx.bounds);
    let order = positive_indices(&areas);
    let mut out = vec![None; items.len()];
    let first = Direction::for_rect(ctx.bounds, ctx.alignment);
    split(&order, &areas, ctx.bounds, first, ctx.alignment, &mut out);
    out
}

fn split(
    order: &[usize],
    areas: &[f64],
    rect: Rect,
    direction: Direction,
    alignment: Alignment,
    out: &mut [Option<Rect>],
) {
    match order {
        [] => return,
        [only] => {
            if !rect.is_degenerate() {
                out[*only] = Some(rect);
            }
            return;
        }
        _ => {}
    }
    if rect.is_degenerate() {
        tracing::debug!("Morton: no room for {} items", order.len());
        return;
    }

    let total: f64 = order.iter().map(|&i| areas[i]).sum();
    let half = total * 0.5;
    let mut cut = 1;
    let mut before = areas[order[0]];
    let mut best = (before - half).abs();
    for k in 1..order.len() - 1 {
        let next = before + areas[order[k]];
        if (next - half).abs() >= best {
            break;
        }
        best = (next - half).abs();
        before = next;
        cut = k + 1;
    }

    let (lead, trail) = split_along(rect, direction, before / total);
    let next = match alignment {
        Alignment::Free => None,
        _ => Some(direction.flip()),
    };
    let dir_for = |r: Rect| next.unwrap_or_else(|| Direction::for_rect(r, Alignment::Free));
    split(&order[..cut], areas, lead, dir_for(lead), alignment, out);
    split(&order[cut..], areas, trail, dir_for(trail), alignment, out);
}
