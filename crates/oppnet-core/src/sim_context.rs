//! Process-wide simulation state
//!
//! A single [`SimContext`] is created before the first node and shared by
//! every node through an `Arc`. Its fields are either fixed at construction
//! (trace bounds, seed) or only ever grow (message ids, centrality maxima),
//! so readers need no coordination beyond the `Arc` itself.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{MessageId, NodeId, Tick};

/// First and last tick of the contact trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceBounds {
    pub start: Tick,
    pub end: Tick,
}

impl TraceBounds {
    pub fn new(start: Tick, end: Tick) -> CoreResult<Self> {
        if start > end {
            return Err(CoreError::InvalidTraceBounds { start, end });
        }
        Ok(Self { start, end })
    }

    /// Ticks elapsed since the trace started
    pub fn elapsed(&self, tick: Tick) -> Tick {
        tick.saturating_sub(self.start)
    }

    pub fn duration(&self) -> Tick {
        self.end - self.start
    }
}

/// Running maxima of the three centrality registers
///
/// Values are non-negative, and the IEEE-754 bit patterns of non-negative
/// doubles order the same way as the numbers, so `fetch_max` on the raw
/// bits is a monotonic float maximum.
#[derive(Debug, Default)]
pub struct CentralityMaxima {
    current: AtomicU64,
    previous: AtomicU64,
    cumulated: AtomicU64,
}

impl CentralityMaxima {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a node's register values into the maxima
    pub fn observe(&self, current: f64, previous: f64, cumulated: f64) {
        Self::raise(&self.current, current);
        Self::raise(&self.previous, previous);
        Self::raise(&self.cumulated, cumulated);
    }

    fn raise(slot: &AtomicU64, value: f64) {
        if value.is_finite() && value > 0.0 {
            slot.fetch_max(value.to_bits(), Ordering::Relaxed);
        }
    }

    pub fn max_current(&self) -> f64 {
        f64::from_bits(self.current.load(Ordering::Relaxed))
    }

    pub fn max_previous(&self) -> f64 {
        f64::from_bits(self.previous.load(Ordering::Relaxed))
    }

    pub fn max_cumulated(&self) -> f64 {
        f64::from_bits(self.cumulated.load(Ordering::Relaxed))
    }
}

/// Shared state of one simulation run
#[derive(Debug)]
pub struct SimContext {
    bounds: TraceBounds,
    seed: u64,
    next_message: AtomicU64,
    global_centrality: CentralityMaxima,
    local_centrality: CentralityMaxima,
}

impl SimContext {
    /// Create the context for a trace spanning `start..=end`
    ///
    /// An `end` before `start` is clamped to `start`; use
    /// [`SimContext::with_bounds`] to reject it instead.
    pub fn new(start: Tick, end: Tick, seed: u64) -> Self {
        Self::from_parts(
            TraceBounds {
                start,
                end: end.max(start),
            },
            seed,
        )
    }

    /// Create the context from validated bounds
    pub fn with_bounds(bounds: TraceBounds, seed: u64) -> Self {
        Self::from_parts(bounds, seed)
    }

    fn from_parts(bounds: TraceBounds, seed: u64) -> Self {
        Self {
            bounds,
            seed,
            next_message: AtomicU64::new(0),
            global_centrality: CentralityMaxima::new(),
            local_centrality: CentralityMaxima::new(),
        }
    }

    pub fn bounds(&self) -> TraceBounds {
        self.bounds
    }

    pub fn trace_start(&self) -> Tick {
        self.bounds.start
    }

    pub fn trace_end(&self) -> Tick {
        self.bounds.end
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Seed for a node's private RNG, derived from the run seed
    pub fn node_seed(&self, id: NodeId) -> u64 {
        self.seed ^ (u64::from(id.0) + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    /// Allocate the next message id; ids are never reused
    pub fn next_message_id(&self) -> MessageId {
        MessageId(self.next_message.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of messages created so far
    pub fn messages_created(&self) -> u64 {
        self.next_message.load(Ordering::Relaxed)
    }

    /// Normalization maxima for global (`local == false`) or
    /// community-scoped centrality
    pub fn centrality_maxima(&self, local: bool) -> &CentralityMaxima {
        if local {
            &self.local_centrality
        } else {
            &self.global_centrality
        }
    }
}
