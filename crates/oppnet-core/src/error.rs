//! Error types for oppnet core

use thiserror::Error;

use crate::types::{NodeId, Tick};

/// Errors raised while building core values from external data
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Node {id} outside of network with {node_count} nodes")]
    NodeOutOfRange { id: NodeId, node_count: usize },

    #[error("Invalid trace bounds: start {start} is after end {end}")]
    InvalidTraceBounds { start: Tick, end: Tick },
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
