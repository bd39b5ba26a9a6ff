pub mod location;
pub mod morton;

use serde::{Deserialize, Serialize};

/// Areas at or below this are treated as empty.
pub const AREA_EPSILON: f64 = 1e-9;

/// A 2D point. Used both for screen positions and for geographic locations
/// (where `y` grows northwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Point) -> f64 {
        self.distance_sq(other).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle in layout space (y grows downwards).
/// Rectangles are plain values: layout code replaces them, never mutates shared ones.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// True when the rectangle has no usable area or carries NaN/infinite values.
    pub fn is_degenerate(&self) -> bool {
        !(self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite())
            || self.w <= 0.0
            || self.h <= 0.0
            || self.area() <= AREA_EPSILON
    }

    /// Longer side over shorter side (1.0 for a square).
    pub fn aspect_ratio(&self) -> f64 {
        if self.w <= 0.0 || self.h <= 0.0 {
            return f64::INFINITY;
        }
        (self.w / self.h).max(self.h / self.w)
    }

    /// Shrinks the rectangle by `by` on every side. Dimensions never go negative.
    pub fn inset(&self, by: f64) -> Rect {
        Rect::new(
            self.x + by,
            self.y + by,
            (self.w - 2.0 * by).max(0.0),
            (self.h - 2.0 * by).max(0.0),
        )
    }

    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }

    /// Adjacent means not strictly separated on either axis: rectangles that
    /// overlap, share an edge or touch at a corner are all adjacent.
    pub fn is_adjacent(&self, other: &Rect, tolerance: f64) -> bool {
        !(self.right() < other.x - tolerance
            || other.right() < self.x - tolerance
            || self.bottom() < other.y - tolerance
            || other.bottom() < self.y - tolerance)
    }

    pub fn contains_rect(&self, other: &Rect, tolerance: f64) -> bool {
        other.x >= self.x - tolerance
            && other.y >= self.y - tolerance
            && other.right() <= self.right() + tolerance
            && other.bottom() <= self.bottom() + tolerance
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Bounding box of a set of points, `None` when the set is empty.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Splits off a left part of the given width (clamped to the rectangle).
    pub fn split_x(&self, width: f64) -> (Rect, Rect) {
        let width = width.clamp(0.0, self.w.max(0.0));
        (
            Rect::new(self.x, self.y, width, self.h),
            Rect::new(self.x + width, self.y, self.w - width, self.h),
        )
    }

    /// Splits off a top part of the given height (clamped to the rectangle).
    pub fn split_y(&self, height: f64) -> (Rect, Rect) {
        let height = height.clamp(0.0, self.h.max(0.0));
        (
            Rect::new(self.x, self.y, self.w, height),
            Rect::new(self.x, self.y + height, self.w, self.h - height),
        )
    }
}

/// How far `ratio` (width / height) is from `target`, as a factor >= 1.
pub fn aspect_deviation(ratio: f64, target: f64) -> f64 {
    if !(ratio > 0.0) || !(target > 0.0) || !ratio.is_finite() {
        return f64::MAX;
    }
    (ratio / target).max(target / ratio)
}

/// Worst aspect deviation of a row of areas laid side by side along a side of
/// length `side`: `max(L²·aMax/(S²·R), S²·R/(L²·aMin))`.
///
/// `target` is the desired width:height ratio measured with the row's side as
/// the width; callers laying a row along a vertical side pass its reciprocal.
pub fn worst_aspect_ratio(row: &[f64], side: f64, target: f64) -> f64 {
    let sum: f64 = row.iter().sum();
    if row.is_empty() || sum <= 0.0 || side <= 0.0 || target <= 0.0 {
        return f64::MAX;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    let max_r = row.iter().copied().fold(0.0, f64::max);
    let min_r = row.iter().copied().fold(f64::INFINITY, f64::min);
    if min_r <= 0.0 {
        return f64::MAX;
    }
    let a = (side_sq * max_r) / (sum_sq * target);
    let b = (sum_sq * target) / (side_sq * min_r);
    a.max(b)
}

/// Mean aspect deviation of the same row (used by strip and spatial-average layouts).
pub fn mean_aspect_ratio(row: &[f64], side: f64, target: f64) -> f64 {
    let sum: f64 = row.iter().sum();
    if row.is_empty() || sum <= 0.0 || side <= 0.0 || target <= 0.0 {
        return f64::MAX;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    let mut total = 0.0;
    for &a in row {
        if a <= 0.0 {
            return f64::MAX;
        }
        let r = (side_sq * a) / (sum_sq * target);
        total += r.max(1.0 / r);
    }
    total / row.len() as f64
}
