use super::{Point, Rect};

/// An item tagged with a position.
#[derive(Debug, Clone, PartialEq)]
pub struct Located<T> {
    pub location: Point,
    pub item: T,
}

/// Small nearest-point search structure: a list of located items that can be
/// sorted by distance from a reference point or queried for the nearest one.
///
/// Lists here hold one sibling group at a time, so linear scans are cheaper
/// than maintaining a spatial index. Ties on distance resolve to the entry
/// that was pushed first.
#[derive(Debug, Clone)]
pub struct LocationList<T> {
    entries: Vec<Located<T>>,
}

impl<T> Default for LocationList<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> LocationList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, location: Point, item: T) {
        self.entries.push(Located { location, item });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Located<T>> {
        self.entries.get(index)
    }

    /// Removes the entry at `index`, keeping the relative order of the rest.
    pub fn remove(&mut self, index: usize) -> Option<Located<T>> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Bounding box of every location in the list.
    pub fn bounds(&self) -> Option<Rect> {
        Rect::bounding(self.entries.iter().map(|e| e.location))
    }

    /// Stable sort by ascending distance from `origin`.
    pub fn sort_by_distance(&mut self, origin: Point) {
        self.entries.sort_by(|a, b| {
            a.location
                .distance_sq(origin)
                .total_cmp(&b.location.distance_sq(origin))
        });
    }

    /// Index of the entry nearest to `target`.
    pub fn nearest_index(&self, target: Point) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            let d = entry.location.distance_sq(target);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((i, d)),
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn into_entries(self) -> Vec<Located<T>> {
        self.entries
    }

    pub fn into_items(self) -> impl Iterator<Item = T> {
        self.entries.into_iter().map(|e| e.item)
    }
}
