//! Epidemic flooding
//!
//! On every contact a node first takes what is meant for it, then copies
//! every other message the peer carries, as far as the quota allows.

use tracing::trace;

use oppnet_core::{Destination, Tick};

use crate::node::{Delivery, NodeState};
use crate::policy::{ExchangePolicy, PolicyKind};

#[derive(Debug, Clone, Default)]
pub struct Epidemic {
    dissemination: bool,
    altruism: bool,
}

impl Epidemic {
    pub const KIND: PolicyKind = PolicyKind("epidemic");

    pub fn new(dissemination: bool, altruism: bool) -> Self {
        Self {
            dissemination,
            altruism,
        }
    }

    /// Point-to-point flooding, altruism disabled
    pub fn routing() -> Self {
        Self::new(false, false)
    }

    /// Publish/subscribe flooding, altruism disabled
    pub fn dissemination() -> Self {
        Self::new(true, false)
    }

    pub fn with_altruism(mut self, altruism: bool) -> Self {
        self.altruism = altruism;
        self
    }
}

impl ExchangePolicy for Epidemic {
    fn kind(&self) -> PolicyKind {
        Self::KIND
    }

    fn on_exchange(&mut self, node: &mut NodeState, peer: &mut NodeState, duration: Tick, tick: Tick) {
        let quota = match node.deliver_direct_messages(
            peer,
            self.altruism,
            duration,
            tick,
            self.dissemination,
        ) {
            Delivery::Remaining(quota) => quota,
            Delivery::Incompatible => return,
        };

        let mut copied = 0;
        for message in peer.carried_messages() {
            if !quota.allows(copied) {
                break;
            }
            if !self.dissemination {
                match message.destination() {
                    // refused by the altruism gate, or consumed already
                    Destination::Node(dest) if dest == node.id() => continue,
                    Destination::Node(dest) if message.is_delivered(dest) => continue,
                    _ => {}
                }
            }
            if node.insert_message(&message, peer, tick, self.altruism, self.dissemination) {
                copied += 1;
            }
        }

        if copied > 0 {
            trace!(node = %node.id(), peer = %peer.id(), copied, "epidemic replication");
        }
    }
}
