// Public library interface for silvamap
// Tree model, layout engine and layout diagnostics; the binaries in src/bin use these.

pub mod error;
pub mod geometry;
pub mod layout;
pub mod stats;
pub mod tree;

pub use error::{ConfigError, Error, Result, TopologyError};
pub use geometry::{Point, Rect};
pub use layout::{compute_layout, Alignment, Layout, LayoutAlgorithm, LayoutConfig, LayoutKind};
pub use stats::{compute_stats, validate, LayoutIssue, LayoutStats};
pub use tree::arena::{NodeData, NodeId, NodeTree};
pub use tree::{build_tree, TreeRecord};
