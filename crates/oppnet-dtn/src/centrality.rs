//! Windowed centrality estimator
//!
//! Centrality counts the distinct peers a node meets per time window and
//! smooths that count across windows:
//!
//! - `current` grows by one for every peer first seen in the window
//! - on rollover, `previous` takes `current` (first rollover) or the mean of
//!   `current` and `previous` (later ones), and `current` restarts at zero
//! - `cumulated` follows `current` during the first window and `previous`
//!   afterwards
//!
//! The window counter advances by exactly one per rollover check, even when
//! several windows passed since the last update.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use oppnet_core::{CentralityMaxima, NodeId, Tick};

/// Centrality configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentralityConfig {
    /// Window length in ticks
    pub time_window: Tick,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            time_window: 21_600, // six hours
        }
    }
}

/// The three registers of a centrality estimate
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CentralityValues {
    pub current: f64,
    pub previous: f64,
    pub cumulated: f64,
}

/// Centrality state of one node
#[derive(Debug, Clone)]
pub struct Centrality {
    time_window: Tick,
    values: CentralityValues,
    /// Completed windows seen so far
    last_threshold: u64,
    /// Peers already counted in the current window
    seen: HashSet<NodeId>,
}

impl Centrality {
    pub fn new(config: &CentralityConfig) -> Self {
        Self {
            time_window: config.time_window.max(1),
            values: CentralityValues::default(),
            last_threshold: 0,
            seen: HashSet::new(),
        }
    }

    /// Apply a pending window rollover for `time_delta` ticks into the trace
    ///
    /// Returns true if a rollover happened.
    pub fn update(&mut self, time_delta: Tick) -> bool {
        let rolled = time_delta / self.time_window > self.last_threshold;
        if rolled {
            let values = &mut self.values;
            values.previous = if self.last_threshold > 0 {
                0.5 * values.current + 0.5 * values.previous
            } else {
                values.current
            };
            values.current = 0.0;
            self.last_threshold += 1;
            self.seen.clear();
        }
        self.refresh_cumulated();
        rolled
    }

    /// Count an encounter with `peer` at `time_delta`
    pub fn record_encounter(&mut self, peer: NodeId, time_delta: Tick) {
        self.update(time_delta);
        if self.seen.insert(peer) {
            self.values.current += 1.0;
        }
        self.refresh_cumulated();
    }

    fn refresh_cumulated(&mut self) {
        self.values.cumulated = if self.last_threshold == 0 {
            self.values.current
        } else {
            self.values.previous
        };
    }

    /// Fold this node's registers into the process-wide maxima
    pub fn publish(&self, maxima: &CentralityMaxima) {
        maxima.observe(
            self.values.current,
            self.values.previous,
            self.values.cumulated,
        );
    }

    pub fn values(&self) -> CentralityValues {
        self.values
    }

    pub fn current(&self) -> f64 {
        self.values.current
    }

    pub fn previous(&self) -> f64 {
        self.values.previous
    }

    pub fn cumulated(&self) -> f64 {
        self.values.cumulated
    }

    /// Registers scaled to `[0, 1]` by the process-wide maxima
    pub fn normalized(&self, maxima: &CentralityMaxima) -> CentralityValues {
        CentralityValues {
            current: ratio(self.values.current, maxima.max_current()),
            previous: ratio(self.values.previous, maxima.max_previous()),
            cumulated: ratio(self.values.cumulated, maxima.max_cumulated()),
        }
    }

    /// Completed window count
    pub fn windows(&self) -> u64 {
        self.last_threshold
    }
}

fn ratio(value: f64, max: f64) -> f64 {
    if max > 0.0 { (value / max).min(1.0) } else { 0.0 }
}
