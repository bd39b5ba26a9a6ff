pub mod arena;
pub mod bfs;
pub mod sample;
pub mod sort;

use std::collections::HashMap;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use self::arena::{NodeData, NodeId, NodeTree};
use crate::geometry::Point;

/// Flat record handed over by an external reader, before tree construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    /// Slash-separated path below the root (`"europe/france/paris"`).
    /// An empty path addresses the root itself.
    pub path: String,
    #[serde(default)]
    pub order: f64,
    #[serde(default)]
    pub size: Option<f64>,
    #[serde(default)]
    pub colour: Option<f64>,
    #[serde(default)]
    pub location: Option<Point>,
}

impl TreeRecord {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = order;
        self
    }

    pub fn with_location(mut self, x: f64, y: f64) -> Self {
        self.location = Some(Point::new(x, y));
        self
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').map(str::trim).filter(|s| !s.is_empty())
}

/// Build a tree from flat records.
///
/// Missing intermediate branches are created on demand. A record whose path
/// already exists (for instance a branch created implicitly earlier)
/// overwrites that node's values, so branch records may come before or after
/// their children.
pub fn build_tree(root_label: &str, records: &[TreeRecord]) -> NodeTree {
    let mut tree = NodeTree::new(root_label);
    if records.is_empty() {
        return tree;
    }

    tracing::info!("Building tree from {} records", records.len());

    // Map from normalised path → NodeId for parent lookups
    let mut path_map: HashMap<String, NodeId> = HashMap::new();
    path_map.insert(String::new(), tree.root);

    for record in records {
        let id = ensure_node(&mut tree, &mut path_map, &record.path);
        let data = tree.data_mut(id);
        data.order = record.order;
        data.size = record.size;
        data.colour = record.colour;
        data.location = record.location;
    }

    tracing::info!(
        "Tree built: {} total nodes, {} direct children of root",
        tree.len(),
        tree.children(tree.root).len()
    );

    tree
}

/// Ensure a node exists at the given path, creating intermediate branches as needed.
fn ensure_node(tree: &mut NodeTree, path_map: &mut HashMap<String, NodeId>, path: &str) -> NodeId {
    let mut key = String::new();
    let mut current = tree.root;

    for segment in segments(path) {
        if !key.is_empty() {
            key.push('/');
        }
        key.push_str(segment);

        current = match path_map.get(&key) {
            Some(&id) => id,
            None => {
                let id = tree.add_child(
                    current,
                    NodeData {
                        label: CompactString::new(segment),
                        ..NodeData::default()
                    },
                );
                path_map.insert(key.clone(), id);
                id
            }
        };
    }

    current
}
