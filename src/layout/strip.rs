use crate::geometry::{mean_aspect_ratio, Rect};

use super::{normalised_areas, place_strip, positive_indices, Direction, LayoutContext, LayoutItem};

/// Strip layout (Bederson, Shneiderman & Wattenberg).
///
/// All strips run the same way, so input order reads straight through the
/// layout. A strip grows while its mean aspect ratio does not get worse; before
/// it is placed, it is merged with the following greedy strip if one combined
/// strip scores better than the two apart.
pub fn strip(items: &[LayoutItem], ctx: &LayoutContext) -> Vec<Option<Rect>> {
    let areas = normalised_areas(items, ctx.bounds);
    let order = positive_indices(&areas);
    let mut out = vec![None; items.len()];
    if ctx.bounds.is_degenerate() || order.is_empty() {
        return out;
    }

    let direction = Direction::for_rect(ctx.bounds, ctx.alignment);
    let side = direction.strip_side(ctx.bounds);
    let target = direction.row_target(ctx.aspect_ratio);
    let row: Vec<f64> = order.iter().map(|&i| areas[i]).collect();
    let score = |from: usize, to: usize| mean_aspect_ratio(&row[from..to], side, target);

    let greedy_end = |start: usize| {
        let mut end = start + 1;
        let mut best = score(start, end);
        while end < row.len() {
            let next = score(start, end + 1);
            if next > best {
                break;
            }
            best = next;
            end += 1;
        }
        end
    };

    let mut rect = ctx.bounds;
    let mut start = 0;
    while start < order.len() {
        let mut end = greedy_end(start);
        if end < order.len() {
            let next_end = greedy_end(end);
            let (pending, following) = ((end - start) as f64, (next_end - end) as f64);
            let apart = (score(start, end) * pending + score(end, next_end) * following)
                / (pending + following);
            if score(start, next_end) < apart {
                tracing::trace!("Strip: merging items {}..{} into one strip", start, next_end);
                end = next_end;
            }
        }

        let last = end == order.len();
        rect = place_strip(&order[start..end], &areas, rect, direction, last, &mut out);
        start = end;
    }
    out
}
