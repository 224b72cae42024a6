//! Community detection
//!
//! Every node keeps an estimate of its local community: the peers it is
//! frequently co-located with. Policies query it through
//! [`CommunityDetection::in_local_community`]. The strategy is pluggable;
//! [`KClique`] is the default.

mod kclique;

pub use kclique::{KClique, KCliqueConfig};

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use oppnet_core::{NodeId, Tick};

use crate::contact::ContactInfo;

/// Contact records of a node, keyed by peer
pub type ContactMap = HashMap<NodeId, ContactInfo>;

/// A community detection strategy
///
/// Strategies of different types may meet in mixed experiments; a strategy
/// that cannot interpret the peer's view must treat the contact as a no-op.
pub trait CommunityDetection: Send + fmt::Debug {
    /// Members of the local community, including the node itself
    fn local_community(&self) -> Vec<NodeId>;

    /// Check whether `id` belongs to the local community
    fn in_local_community(&self, id: NodeId) -> bool;

    /// Refresh what the node knows about `peer` from its own contact records
    fn on_update(&mut self, peer: NodeId, contacts: &ContactMap);

    /// Merge the peer's community view during a contact
    fn on_contact(
        &mut self,
        peer: NodeId,
        peer_view: &dyn CommunityDetection,
        tick: Tick,
        sample_time: Tick,
    );

    /// Boxed copy, used to snapshot a view before a symmetric update
    fn clone_box(&self) -> Box<dyn CommunityDetection>;

    fn as_any(&self) -> &dyn Any;

    /// Strategy name for logs
    fn name(&self) -> &'static str;
}

impl Clone for Box<dyn CommunityDetection> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl fmt::Display for dyn CommunityDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.name(), self.local_community())
    }
}
