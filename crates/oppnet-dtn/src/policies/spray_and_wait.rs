//! Binary spray and wait
//!
//! A generated message starts with a copy budget. A carrier holding more
//! than one copy hands half of them to every peer that lacks the message;
//! with a single copy left it only delivers directly.

use tracing::trace;

use oppnet_core::{MessageRef, Tick};

use crate::node::{Delivery, NodeState};
use crate::policy::{ExchangePolicy, PolicyKind};

#[derive(Debug, Clone)]
pub struct SprayAndWait {
    initial_copies: u32,
    altruism: bool,
}

impl SprayAndWait {
    pub const KIND: PolicyKind = PolicyKind("spray-and-wait");

    pub fn new(initial_copies: u32) -> Self {
        Self {
            initial_copies: initial_copies.max(1),
            altruism: false,
        }
    }

    pub fn with_altruism(mut self, altruism: bool) -> Self {
        self.altruism = altruism;
        self
    }

    pub fn initial_copies(&self) -> u32 {
        self.initial_copies
    }
}

impl Default for SprayAndWait {
    fn default() -> Self {
        Self::new(4)
    }
}

impl ExchangePolicy for SprayAndWait {
    fn kind(&self) -> PolicyKind {
        Self::KIND
    }

    fn generate_message(&mut self, node: &mut NodeState, message: MessageRef) -> Option<MessageRef> {
        if node.holds(message.id()) {
            return None;
        }
        message.set_copies(node.id(), self.initial_copies);
        node.store_own_message(message)
    }

    fn on_exchange(&mut self, node: &mut NodeState, peer: &mut NodeState, duration: Tick, tick: Tick) {
        let quota = match node.deliver_direct_messages(peer, self.altruism, duration, tick, false) {
            Delivery::Remaining(quota) => quota,
            Delivery::Incompatible => return,
        };

        let mut sprayed = 0;
        for message in peer.carried_messages() {
            if !quota.allows(sprayed) {
                break;
            }
            let copies = message.copies(peer.id());
            if copies <= 1 || message.is_destined_for(node.id()) || node.holds(message.id()) {
                continue;
            }

            let handed = copies / 2;
            message.set_copies(peer.id(), handed);
            if node.insert_message(&message, peer, tick, self.altruism, false) {
                message.set_copies(peer.id(), copies - handed);
                sprayed += 1;
                trace!(
                    node = %node.id(),
                    peer = %peer.id(),
                    message = %message.id(),
                    handed,
                    "sprayed copies"
                );
            } else {
                message.set_copies(peer.id(), copies);
            }
        }
    }
}
