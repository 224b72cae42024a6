//! K-Clique community detection
//!
//! Distributed k-clique detection: a peer becomes familiar once the
//! cumulative contact time with it passes `contact_threshold`, familiarity
//! is gossiped on every contact as a node-by-node matrix, and a peer joins
//! the local community when it is familiar with at least `k - 1` current
//! members. Nothing is ever removed from the community.

use std::any::Any;

use serde::{Deserialize, Serialize};
use tracing::trace;

use oppnet_core::{NodeId, Tick};

use super::{CommunityDetection, ContactMap};

/// K-Clique configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KCliqueConfig {
    /// Cumulative contact ticks after which a peer becomes familiar
    pub contact_threshold: Tick,
    /// Clique size `k`
    pub community_threshold: usize,
}

impl Default for KCliqueConfig {
    fn default() -> Self {
        Self {
            contact_threshold: 1_200, // 20 minutes
            community_threshold: 4,
        }
    }
}

/// K-Clique state of one node
#[derive(Debug, Clone)]
pub struct KClique {
    id: NodeId,
    node_count: usize,
    config: KCliqueConfig,
    familiar: Vec<bool>,
    local: Vec<bool>,
    /// Row `i` is what this node believes node `i`'s familiar set to be
    global: Vec<bool>,
}

impl KClique {
    pub fn new(id: NodeId, node_count: usize, config: KCliqueConfig) -> Self {
        let mut local = vec![false; node_count];
        if let Some(own) = local.get_mut(id.index()) {
            *own = true;
        }
        Self {
            id,
            node_count,
            config,
            familiar: vec![false; node_count],
            local,
            global: vec![false; node_count * node_count],
        }
    }

    fn contains(&self, id: NodeId) -> bool {
        id.index() < self.node_count
    }

    fn cell(&self, row: usize, col: usize) -> bool {
        self.global[row * self.node_count + col]
    }

    fn set_cell(&mut self, row: usize, col: usize) {
        self.global[row * self.node_count + col] = true;
    }

    pub fn is_familiar(&self, id: NodeId) -> bool {
        self.contains(id) && self.familiar[id.index()]
    }

    pub fn familiar_set(&self) -> Vec<NodeId> {
        members(&self.familiar)
    }

    /// Whether this node believes `a` is familiar with `b`
    pub fn knows_familiar(&self, a: NodeId, b: NodeId) -> bool {
        self.contains(a) && self.contains(b) && self.cell(a.index(), b.index())
    }

    /// Local community members that `candidate` is familiar with
    fn familiar_members(&self, candidate: usize) -> usize {
        (0..self.node_count)
            .filter(|&m| m != candidate && self.local[m] && self.cell(candidate, m))
            .count()
    }

    fn passes_threshold(&self, candidate: usize) -> bool {
        let required = self.config.community_threshold.saturating_sub(1);
        self.familiar_members(candidate) >= required
    }

    fn admit(&mut self, candidate: usize) {
        if !self.local[candidate] {
            self.local[candidate] = true;
            trace!(node = %self.id, member = candidate, "admitted to local community");
        }
    }
}

impl CommunityDetection for KClique {
    fn local_community(&self) -> Vec<NodeId> {
        members(&self.local)
    }

    fn in_local_community(&self, id: NodeId) -> bool {
        self.contains(id) && self.local[id.index()]
    }

    fn on_update(&mut self, peer: NodeId, contacts: &ContactMap) {
        if peer == self.id || !self.contains(peer) || self.familiar[peer.index()] {
            return;
        }
        let duration = contacts.get(&peer).map(|c| c.duration()).unwrap_or(0);
        if duration > self.config.contact_threshold {
            let p = peer.index();
            let own = self.id.index();
            self.familiar[p] = true;
            self.set_cell(own, p);
            self.admit(p);
            trace!(node = %self.id, %peer, duration, "peer became familiar");
        }
    }

    fn on_contact(
        &mut self,
        peer: NodeId,
        peer_view: &dyn CommunityDetection,
        _tick: Tick,
        _sample_time: Tick,
    ) {
        let Some(other) = peer_view.as_any().downcast_ref::<KClique>() else {
            return;
        };
        if other.node_count != self.node_count || !self.contains(peer) || peer == self.id {
            return;
        }
        let p = peer.index();
        let n = self.node_count;

        // familiarity spreads network-wide
        for (mine, theirs) in self.global.iter_mut().zip(&other.global) {
            *mine |= *theirs;
        }

        if !self.familiar[p] {
            for j in 0..n {
                if other.familiar[j] {
                    self.set_cell(p, j);
                }
            }
        }

        if !self.local[p] {
            if self.passes_threshold(p) {
                self.admit(p);
            }
        } else {
            for q in 0..n {
                if other.local[q] && !self.local[q] && self.passes_threshold(q) {
                    self.admit(q);
                }
            }
        }
    }

    fn clone_box(&self) -> Box<dyn CommunityDetection> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &'static str {
        "k-clique"
    }
}

fn members(flags: &[bool]) -> Vec<NodeId> {
    flags
        .iter()
        .enumerate()
        .filter(|(_, set)| **set)
        .map(|(i, _)| NodeId(i as u32))
        .collect()
}
