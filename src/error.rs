use crate::tree::arena::NodeId;

/// Structural errors raised by tree mutations. The tree is left unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    #[error("node {child:?} cannot go under {parent:?}: it is that node or one of its ancestors")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("the root node {0:?} cannot be detached or reparented")]
    RootMove(NodeId),
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
}

/// Configuration errors. Setters that return one of these have already stored
/// the documented fallback value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown layout '{0}'")]
    UnknownLayout(String),
    #[error("unknown alignment '{0}'")]
    UnknownAlignment(String),
    #[error("level {level} is out of range (max {max})")]
    LevelOutOfRange { level: usize, max: usize },
    #[error("border {border} at level {level} is negative or not finite")]
    InvalidBorder { level: usize, border: f64 },
    #[error("canvas {width}x{height} must have positive finite dimensions")]
    InvalidCanvas { width: f64, height: f64 },
    #[error("aspect ratio {0} must be positive and finite")]
    InvalidAspectRatio(f64),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid topology: {0}")]
    InvalidTopology(#[from] TopologyError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
