//! Node construction errors
//!
//! Contact and delivery operations are total and never fail; only building
//! a node can be rejected.

use thiserror::Error;

use oppnet_core::NodeId;

use crate::ConfigWarning;

/// Errors raised while building a node
#[derive(Debug, Error)]
pub enum NodeError {
    /// Node id does not fit the network
    #[error("Node {id} outside of network with {node_count} nodes")]
    IdOutOfRange { id: NodeId, node_count: usize },

    /// Social network row has the wrong length
    #[error("Social network row has {actual} entries, expected {expected}")]
    SocialNetworkSize { expected: usize, actual: usize },

    /// Configuration violates a hard invariant
    #[error("Invalid node configuration: {0}")]
    InvalidConfig(ConfigWarning),
}

/// Result type for node construction
pub type NodeResult<T> = Result<T, NodeError>;
