//! Messages and their per-node delivery bookkeeping
//!
//! A [`Message`] is created once by its source node and then shared by
//! reference ([`MessageRef`]) between every node whose memory holds it.
//! The identity fields are immutable. Everything that changes as the message
//! travels (copy counts, hop counts, deliveries) lives in [`MessageStats`],
//! keyed by node id, behind a lock owned by the message. One node's update
//! is visible to every other holder, which is what the statistics expect.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::sim_context::SimContext;
use crate::types::{MessageId, NodeId, Tick};

/// Shared handle to a message
pub type MessageRef = Arc<Message>;

/// Where a message is headed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    /// Point-to-point delivery to a single node
    Node(NodeId),
    /// Publish/subscribe delivery to every node sharing a tag
    Dissemination,
}

impl Destination {
    pub fn is_dissemination(&self) -> bool {
        matches!(self, Destination::Dissemination)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Node(id) => write!(f, "{}", id),
            Destination::Dissemination => write!(f, "*"),
        }
    }
}

/// Message body
///
/// Trust and consensus style policies attach a relay path and an opaque
/// annotation (a vote, a signature) instead of wrapping the message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    /// Opaque application data
    Plain(Bytes),
    /// Data carried together with the path it travelled
    Annotated { path: Vec<NodeId>, annotation: Bytes },
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Plain(Bytes::new())
    }
}

impl Payload {
    pub fn plain(data: impl Into<Bytes>) -> Self {
        Payload::Plain(data.into())
    }

    /// Relay path, empty for plain payloads
    pub fn path(&self) -> &[NodeId] {
        match self {
            Payload::Plain(_) => &[],
            Payload::Annotated { path, .. } => path,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Payload::Plain(data) => data.len(),
            Payload::Annotated { annotation, .. } => annotation.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-node-id bookkeeping of a message
///
/// Copy and hop counters are independent. A node's latency is recorded the
/// first time the message is marked delivered to it and never changes after.
#[derive(Debug, Clone, Default)]
pub struct MessageStats {
    copies: HashMap<NodeId, u32>,
    hops: HashMap<NodeId, u32>,
    /// Delivery latency per node, present iff delivered
    delivered: HashMap<NodeId, Tick>,
}

impl MessageStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outstanding copies at `id`, 0 for unknown nodes
    pub fn copies(&self, id: NodeId) -> u32 {
        self.copies.get(&id).copied().unwrap_or(0)
    }

    pub fn set_copies(&mut self, id: NodeId, copies: u32) {
        self.copies.insert(id, copies);
    }

    /// Overwrite the copy count of `to` with the copy count of `from`
    pub fn copy(&mut self, from: NodeId, to: NodeId) {
        let copies = self.copies(from);
        self.copies.insert(to, copies);
    }

    /// Zero the copy count of `id` (the entry is kept)
    pub fn delete_copies(&mut self, id: NodeId) {
        self.copies.insert(id, 0);
    }

    pub fn hops(&self, id: NodeId) -> u32 {
        self.hops.get(&id).copied().unwrap_or(0)
    }

    pub fn increase_hop_count(&mut self, id: NodeId) {
        *self.hops.entry(id).or_insert(0) += 1;
    }

    /// Mark the message delivered to `id` at `tick`
    ///
    /// The hop count of `id` is incremented on every call; latency is only
    /// written by the first one.
    pub fn mark_as_delivered(&mut self, id: NodeId, tick: Tick, timestamp: Tick) {
        self.delivered
            .entry(id)
            .or_insert_with(|| tick.saturating_sub(timestamp));
        self.increase_hop_count(id);
    }

    pub fn is_delivered(&self, id: NodeId) -> bool {
        self.delivered.contains_key(&id)
    }

    /// Delivery latency at `id`, `None` until delivered
    pub fn latency(&self, id: NodeId) -> Option<Tick> {
        self.delivered.get(&id).copied()
    }

    /// Number of distinct nodes the message was delivered to
    pub fn delivered_count(&self) -> usize {
        self.delivered.len()
    }

    /// Iterate over `(node, latency)` for every delivery
    pub fn deliveries(&self) -> impl Iterator<Item = (NodeId, Tick)> + '_ {
        self.delivered.iter().map(|(id, latency)| (*id, *latency))
    }
}

/// A message travelling through the network
pub struct Message {
    id: MessageId,
    source: NodeId,
    destination: Destination,
    timestamp: Tick,
    payload: Payload,
    tags: Context,
    /// Sort key for policies, not interpreted by the engine
    utility: Mutex<f64>,
    stats: RwLock<MessageStats>,
}

impl Message {
    /// Create a message with a fresh id drawn from `ctx`
    pub fn new(
        ctx: &SimContext,
        source: NodeId,
        destination: Destination,
        timestamp: Tick,
        payload: Payload,
        tags: Context,
    ) -> MessageRef {
        Arc::new(Self {
            id: ctx.next_message_id(),
            source,
            destination,
            timestamp,
            payload,
            tags,
            utility: Mutex::new(0.0),
            stats: RwLock::new(MessageStats::new()),
        })
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// Creation tick
    pub fn timestamp(&self) -> Tick {
        self.timestamp
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn tags(&self) -> &Context {
        &self.tags
    }

    pub fn is_dissemination(&self) -> bool {
        self.destination.is_dissemination()
    }

    /// Check if `id` is the routing destination
    pub fn is_destined_for(&self, id: NodeId) -> bool {
        self.destination == Destination::Node(id)
    }

    pub fn utility(&self) -> f64 {
        *self.utility.lock()
    }

    pub fn set_utility(&self, utility: f64) {
        *self.utility.lock() = utility;
    }

    pub fn copies(&self, id: NodeId) -> u32 {
        self.stats.read().copies(id)
    }

    pub fn set_copies(&self, id: NodeId, copies: u32) {
        self.stats.write().set_copies(id, copies);
    }

    pub fn copy(&self, from: NodeId, to: NodeId) {
        self.stats.write().copy(from, to);
    }

    pub fn delete_copies(&self, id: NodeId) {
        self.stats.write().delete_copies(id);
    }

    pub fn hops(&self, id: NodeId) -> u32 {
        self.stats.read().hops(id)
    }

    pub fn increase_hop_count(&self, id: NodeId) {
        self.stats.write().increase_hop_count(id);
    }

    /// Increase the hop count of every node in `ids`
    pub fn increase_hop_counts(&self, ids: impl IntoIterator<Item = NodeId>) {
        let mut stats = self.stats.write();
        for id in ids {
            stats.increase_hop_count(id);
        }
    }

    pub fn mark_as_delivered(&self, id: NodeId, tick: Tick) {
        self.stats.write().mark_as_delivered(id, tick, self.timestamp);
    }

    pub fn is_delivered(&self, id: NodeId) -> bool {
        self.stats.read().is_delivered(id)
    }

    pub fn latency(&self, id: NodeId) -> Option<Tick> {
        self.stats.read().latency(id)
    }

    /// Snapshot of the bookkeeping
    pub fn stats(&self) -> MessageStats {
        self.stats.read().clone()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("timestamp", &self.timestamp)
            .field("utility", &self.utility())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}->{}", self.id, self.source, self.destination)
    }
}

/// Sort messages by utility, highest first
///
/// The sort is stable, so equal utilities keep their relative order.
pub fn sort_by_utility(messages: &mut [MessageRef]) {
    messages.sort_by(|a, b| {
        b.utility()
            .partial_cmp(&a.utility())
            .unwrap_or(Ordering::Equal)
    });
}
