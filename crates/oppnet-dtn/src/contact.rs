//! Per-peer relationship counters

use serde::{Deserialize, Serialize};

use oppnet_core::Tick;

/// What a node knows about its encounters with one peer
///
/// Created on the first encounter. Durations and counts only grow, except
/// through [`ContactInfo::merge`] which aggregates two records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    duration: Tick,
    contacts: u32,
    last_encounter: Tick,
}

impl ContactInfo {
    /// Record for a peer first met at `tick`
    pub fn new(tick: Tick) -> Self {
        Self {
            duration: 0,
            contacts: 0,
            last_encounter: tick,
        }
    }

    /// Record a discrete contact of `duration` ticks starting at `tick`
    pub fn record_contact(&mut self, duration: Tick, tick: Tick) {
        self.duration = self.duration.saturating_add(duration);
        self.contacts = self.contacts.saturating_add(1);
        self.last_encounter = self.last_encounter.max(tick);
    }

    /// Extend the cumulative duration without counting a new contact
    pub fn increase_duration(&mut self, duration: Tick) {
        self.duration = self.duration.saturating_add(duration);
    }

    /// Fold another record for the same peer into this one
    pub fn merge(&mut self, other: &ContactInfo) {
        self.duration = self.duration.saturating_add(other.duration);
        self.contacts = self.contacts.saturating_add(other.contacts);
        self.last_encounter = self.last_encounter.max(other.last_encounter);
    }

    /// Cumulative contact duration in ticks
    pub fn duration(&self) -> Tick {
        self.duration
    }

    /// Number of discrete contacts
    pub fn contacts(&self) -> u32 {
        self.contacts
    }

    pub fn last_encounter(&self) -> Tick {
        self.last_encounter
    }
}
