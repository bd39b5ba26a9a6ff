//! Deterministic sample trees for the diagnostic binaries and tests.

use super::arena::{NodeData, NodeTree};

/// FNV-1a of a label mapped into [0, 1).
fn hash01(s: &str) -> f64 {
    let mut h: u32 = 2166136261;
    for &b in s.as_bytes() {
        h ^= b as u32;
        h = h.wrapping_mul(16777619);
    }
    ((h >> 8) as f64) / (((u32::MAX >> 8) as f64) + 1.0)
}

/// A two-level tree of `regions` branches laid out on a geographic grid, each
/// holding between 1 and `max_leaves` located leaves with pseudo-random
/// weights. Roughly one leaf in eleven is a dummy (negative size).
/// Siblings are sorted with the default comparator.
pub fn sample_tree(regions: usize, max_leaves: usize) -> NodeTree {
    let mut tree = NodeTree::new("sample");
    let cols = ((regions as f64).sqrt().ceil() as usize).max(1);
    let max_leaves = max_leaves.max(1);

    for r in 0..regions {
        let name = format!("region-{r}");
        let (gx, gy) = ((r % cols) as f64 * 10.0, (r / cols) as f64 * 10.0);
        let region = tree.add_child(tree.root, NodeData::new(&name));
        let leaves = 1 + (hash01(&name) * max_leaves as f64) as usize % max_leaves;

        for l in 0..leaves {
            let label = format!("{name}/leaf-{l}");
            let weight = 1.0 + hash01(&label) * 99.0;
            let size = if (r + l) % 11 == 10 { -weight } else { weight };
            let x = gx + hash01(&format!("{label}#x")) * 8.0;
            let y = gy + hash01(&format!("{label}#y")) * 8.0;
            tree.add_child(
                region,
                NodeData::new(&label)
                    .with_size(size)
                    .with_location(x, y)
                    .with_colour(hash01(&format!("{label}#c"))),
            );
        }
    }

    tree.sort_all();
    tree
}
