//! Simulation error types

use thiserror::Error;

use oppnet_core::{CoreError, NodeId, Tick};
use oppnet_dtn::NodeError;

/// Errors raised while loading traces or setting up a run
#[derive(Debug, Error)]
pub enum SimError {
    /// Trace file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Trace or config is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Identifier or bounds rejected by the core
    #[error("Invalid trace: {0}")]
    Core(#[from] CoreError),

    /// A node could not be built
    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    /// A contact pairs a node with itself
    #[error("Contact {index} pairs {node} with itself")]
    SelfContact { index: usize, node: NodeId },

    /// A contact starts outside the trace bounds
    #[error("Contact {index} starts at {start}, outside [{trace_start}, {trace_end}]")]
    ContactOutOfBounds {
        index: usize,
        start: Tick,
        trace_start: Tick,
        trace_end: Tick,
    },

    /// The trace has no nodes
    #[error("Trace has no nodes")]
    EmptyNetwork,
}

/// Result type for simulation setup
pub type SimResult<T> = Result<T, SimError>;
