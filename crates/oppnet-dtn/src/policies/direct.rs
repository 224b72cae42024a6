//! Direct delivery
//!
//! Messages are never replicated: a carrier only hands them over when it
//! meets their destination (or, when disseminating, an interested node).

use oppnet_core::Tick;

use crate::node::NodeState;
use crate::policy::{ExchangePolicy, PolicyKind};

#[derive(Debug, Clone, Default)]
pub struct DirectDelivery {
    dissemination: bool,
    altruism: bool,
}

impl DirectDelivery {
    pub const KIND: PolicyKind = PolicyKind("direct-delivery");

    pub fn new(dissemination: bool, altruism: bool) -> Self {
        Self {
            dissemination,
            altruism,
        }
    }

    pub fn routing() -> Self {
        Self::new(false, false)
    }

    pub fn dissemination() -> Self {
        Self::new(true, false)
    }
}

impl ExchangePolicy for DirectDelivery {
    fn kind(&self) -> PolicyKind {
        Self::KIND
    }

    fn on_exchange(&mut self, node: &mut NodeState, peer: &mut NodeState, duration: Tick, tick: Tick) {
        node.deliver_direct_messages(peer, self.altruism, duration, tick, self.dissemination);
    }
}
