//! Identifier types and the simulated time unit

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Simulated time. One tick is one second of trace time.
pub type Tick = u64;

/// Index of a node in the simulated network (`0..node_count`)
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display("n{_0}")]
pub struct NodeId(pub u32);

impl NodeId {
    /// Index into per-node vectors
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// All ids of a network with `count` nodes
    pub fn all(count: usize) -> impl Iterator<Item = NodeId> {
        (0..count as u32).map(NodeId)
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Globally unique message identifier, assigned by [`crate::SimContext`]
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display("m{_0}")]
pub struct MessageId(pub u64);
