//! Contact traces
//!
//! A trace lists pairwise contacts between the nodes of a network. Traces
//! are read from JSON or generated synthetically; either way contacts are
//! kept sorted by start tick, stable for equal starts, so they can be
//! replayed in order.

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use oppnet_core::{CoreError, NodeId, Tick, TraceBounds};

use crate::error::{SimError, SimResult};

/// A time-bounded encounter between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub a: NodeId,
    pub b: NodeId,
    pub start: Tick,
    pub duration: Tick,
}

impl Contact {
    /// Contact between nodes with raw indices `a` and `b`
    pub fn new(a: u32, b: u32, start: Tick, duration: Tick) -> Self {
        Self {
            a: NodeId(a),
            b: NodeId(b),
            start,
            duration,
        }
    }

    pub fn end(&self) -> Tick {
        self.start.saturating_add(self.duration)
    }
}

/// Validated, time-ordered contact trace
#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    node_count: usize,
    #[serde(flatten)]
    bounds: TraceBounds,
    contacts: Vec<Contact>,
}

/// Wire form of a trace, validated by [`Trace::new`]
#[derive(Deserialize)]
struct RawTrace {
    node_count: usize,
    start: Option<Tick>,
    end: Option<Tick>,
    contacts: Vec<Contact>,
}

impl Trace {
    /// Build a trace, checking every contact against the network
    pub fn new(
        node_count: usize,
        start: Tick,
        end: Tick,
        mut contacts: Vec<Contact>,
    ) -> SimResult<Self> {
        if node_count == 0 {
            return Err(SimError::EmptyNetwork);
        }
        let bounds = TraceBounds::new(start, end)?;

        for (index, contact) in contacts.iter().enumerate() {
            for id in [contact.a, contact.b] {
                if id.index() >= node_count {
                    return Err(CoreError::NodeOutOfRange { id, node_count }.into());
                }
            }
            if contact.a == contact.b {
                return Err(SimError::SelfContact {
                    index,
                    node: contact.a,
                });
            }
            if contact.start < start || contact.start > end {
                return Err(SimError::ContactOutOfBounds {
                    index,
                    start: contact.start,
                    trace_start: start,
                    trace_end: end,
                });
            }
        }

        contacts.sort_by_key(|c| c.start);
        Ok(Self {
            node_count,
            bounds,
            contacts,
        })
    }

    /// Parse a JSON trace
    ///
    /// `start` and `end` are optional and default to the span of the
    /// contacts.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let raw: RawTrace = serde_json::from_str(json)?;
        let start = raw
            .start
            .unwrap_or_else(|| raw.contacts.iter().map(|c| c.start).min().unwrap_or(0));
        let end = raw.end.unwrap_or_else(|| {
            raw.contacts
                .iter()
                .map(Contact::end)
                .max()
                .unwrap_or(start)
                .max(start)
        });
        Self::new(raw.node_count, start, end, raw.contacts)
    }

    /// Load a JSON trace from disk
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let trace = Self::from_json(&fs::read_to_string(path)?)?;
        debug!(
            path = %path.display(),
            nodes = trace.node_count,
            contacts = trace.contacts.len(),
            "loaded trace"
        );
        Ok(trace)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Generate a seeded trace with community structure
    ///
    /// Nodes are split into groups of `group_size`. Each contact picks a
    /// random node and, four times out of five, a partner from its own
    /// group. Contacts last between one and fifteen minutes.
    pub fn synthetic(
        node_count: usize,
        group_size: usize,
        contacts: usize,
        end: Tick,
        seed: u64,
    ) -> SimResult<Self> {
        if node_count < 2 {
            return Err(SimError::EmptyNetwork);
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let group_size = group_size.clamp(2, node_count);
        let end = end.max(1);

        let mut generated = Vec::with_capacity(contacts);
        while generated.len() < contacts {
            let a = rng.random_range(0..node_count);
            let b = if rng.random::<f64>() < 0.8 {
                let group = a / group_size * group_size;
                let upper = (group + group_size).min(node_count);
                rng.random_range(group..upper)
            } else {
                rng.random_range(0..node_count)
            };
            if a == b {
                continue;
            }
            generated.push(Contact::new(
                a as u32,
                b as u32,
                rng.random_range(0..end),
                rng.random_range(60..=900),
            ));
        }

        Self::new(node_count, 0, end, generated)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn start(&self) -> Tick {
        self.bounds.start
    }

    pub fn end(&self) -> Tick {
        self.bounds.end
    }

    pub fn bounds(&self) -> TraceBounds {
        self.bounds
    }

    /// Contacts in replay order
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
