//! Provenance records of message transfers
//!
//! Every transfer leaves an [`ExchangeHistory`] on both sides: the sender
//! logs it as sent, the receiver as received. Trust-style policies read
//! these logs as evidence, and nodes gossip them on every contact.

use std::fmt;

use oppnet_core::{MessageRef, NodeId, Tick};

/// A single message transfer as seen by `owner`
#[derive(Clone)]
pub struct ExchangeHistory {
    time: Tick,
    message: MessageRef,
    peer_seen: NodeId,
    owner: NodeId,
    peer_battery: f64,
}

impl ExchangeHistory {
    pub fn new(
        time: Tick,
        message: MessageRef,
        peer_seen: NodeId,
        owner: NodeId,
        peer_battery: f64,
    ) -> Self {
        Self {
            time,
            message,
            peer_seen,
            owner,
            peer_battery,
        }
    }

    pub fn time(&self) -> Tick {
        self.time
    }

    pub fn message(&self) -> &MessageRef {
        &self.message
    }

    /// The other side of the transfer
    pub fn peer_seen(&self) -> NodeId {
        self.peer_seen
    }

    /// The node that logged the transfer
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// Peer battery fraction (0..=1) at the time of the transfer
    pub fn peer_battery(&self) -> f64 {
        self.peer_battery
    }

    fn same_transfer(&self, other: &ExchangeHistory) -> bool {
        self.time == other.time
            && self.message.id() == other.message.id()
            && self.peer_seen == other.peer_seen
            && self.owner == other.owner
    }
}

impl fmt::Debug for ExchangeHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeHistory")
            .field("time", &self.time)
            .field("message", &self.message.id())
            .field("peer_seen", &self.peer_seen)
            .field("owner", &self.owner)
            .field("peer_battery", &self.peer_battery)
            .finish()
    }
}

/// Bounded log of transfers, newest first
#[derive(Debug, Clone)]
pub struct ExchangeLog {
    capacity: usize,
    entries: Vec<ExchangeHistory>,
}

impl ExchangeLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::new(),
        }
    }

    /// Record a transfer, dropping the oldest entries past capacity
    pub fn push(&mut self, entry: ExchangeHistory) {
        // Insert after every entry at least as recent to keep ties in arrival order
        let pos = self.entries.partition_point(|e| e.time >= entry.time);
        self.entries.insert(pos, entry);
        self.entries.truncate(self.capacity);
    }

    /// Merge another log into this one
    ///
    /// Transfers already present are skipped. The result is re-sorted by
    /// time, newest first, and pruned to capacity.
    pub fn merge(&mut self, other: &ExchangeLog) {
        for entry in &other.entries {
            if !self.entries.iter().any(|e| e.same_transfer(entry)) {
                self.entries.push(entry.clone());
            }
        }
        self.entries.sort_by(|a, b| b.time.cmp(&a.time));
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> &[ExchangeHistory] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExchangeHistory> {
        self.entries.iter()
    }

    /// Entries about `message`
    pub fn for_message(&self, message: oppnet_core::MessageId) -> Vec<&ExchangeHistory> {
        self.entries
            .iter()
            .filter(|e| e.message.id() == message)
            .collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
