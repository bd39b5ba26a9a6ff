//! Z-order (Morton) codes over a 16-bit coordinate grid.
//!
//! `x` occupies the even bits and `y` the odd bits, so the most significant
//! split of the curve is top/bottom, then left/right: the familiar "Z" walk
//! of top-left, top-right, bottom-left, bottom-right.

use super::location::LocationList;
use super::Point;

/// Largest grid coordinate on either axis.
pub const GRID_MAX: u16 = u16::MAX;

fn spread(v: u16) -> u32 {
    let mut x = v as u32;
    x = (x | (x << 8)) & 0x00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333;
    x = (x | (x << 1)) & 0x5555_5555;
    x
}

fn compact(v: u32) -> u16 {
    let mut x = v & 0x5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333;
    x = (x | (x >> 2)) & 0x0F0F_0F0F;
    x = (x | (x >> 4)) & 0x00FF_00FF;
    x = (x | (x >> 8)) & 0x0000_FFFF;
    x as u16
}

/// Interleaves grid coordinates into a Morton code.
pub fn encode(x: u16, y: u16) -> u32 {
    spread(x) | (spread(y) << 1)
}

pub fn decode_x(code: u32) -> u16 {
    compact(code)
}

pub fn decode_y(code: u32) -> u16 {
    compact(code >> 1)
}

/// Items ordered along the Z curve of their locations.
///
/// Locations are scaled into the grid using the bounding box of all pushed
/// points; north (larger `y`) maps to the top of the grid.
#[derive(Debug, Clone)]
pub struct MortonList<T> {
    located: LocationList<T>,
}

impl<T> Default for MortonList<T> {
    fn default() -> Self {
        Self {
            located: LocationList::new(),
        }
    }
}

impl<T> MortonList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, location: Point, item: T) {
        self.located.push(location, item);
    }

    pub fn len(&self) -> usize {
        self.located.len()
    }

    pub fn is_empty(&self) -> bool {
        self.located.is_empty()
    }

    /// Consumes the list, returning `(code, item)` pairs in curve order.
    /// Equal codes keep insertion order.
    pub fn into_sorted(self) -> Vec<(u32, T)> {
        let Some(bounds) = self.located.bounds() else {
            return Vec::new();
        };
        let scale = |v: f64, min: f64, span: f64| -> u16 {
            if span <= 0.0 || !v.is_finite() {
                return GRID_MAX / 2;
            }
            let t = ((v - min) / span).clamp(0.0, 1.0);
            (t * GRID_MAX as f64).round() as u16
        };
        let mut coded: Vec<(u32, T)> = self
            .located
            .into_entries()
            .into_iter()
            .map(|e| {
                let gx = scale(e.location.x, bounds.x, bounds.w);
                let gy = GRID_MAX - scale(e.location.y, bounds.y, bounds.h);
                (encode(gx, gy), e.item)
            })
            .collect();
        coded.sort_by_key(|(code, _)| *code);
        coded
    }
}
