//! Forwarding policy interface
//!
//! The engine owns all policy-independent node state and drives the contact
//! protocol. What actually crosses a contact is decided by an
//! [`ExchangePolicy`], called symmetrically on both sides of every contact
//! with mutable access to both node states.

use std::fmt;

use oppnet_core::{MessageRef, Tick};

use crate::node::NodeState;

/// Name tag of a policy
///
/// Direct delivery only happens between nodes running the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolicyKind(pub &'static str);

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A forwarding or dissemination strategy
pub trait ExchangePolicy: Send + fmt::Debug {
    fn kind(&self) -> PolicyKind;

    /// Exchange data with `peer` during a contact
    ///
    /// Called once for each side of the contact, with `node` being the side
    /// that owns this policy.
    fn on_exchange(&mut self, node: &mut NodeState, peer: &mut NodeState, duration: Tick, tick: Tick);

    /// Runs once per contact before either side's `on_exchange`
    ///
    /// Called on the initiating side only: the node whose
    /// `exchange_data` was invoked. The peer's policy hook does not run.
    fn pre_exchange(
        &mut self,
        _node: &mut NodeState,
        _peer: &mut NodeState,
        _duration: Tick,
        _tick: Tick,
    ) {
    }

    /// Store a message generated by `node`
    ///
    /// Returns `None` if the node already holds it.
    fn generate_message(&mut self, node: &mut NodeState, message: MessageRef) -> Option<MessageRef> {
        node.store_own_message(message)
    }

    /// Per-tick bookkeeping
    fn on_tick(&mut self, _node: &mut NodeState, _tick: Tick, _sample_time: Tick) {}
}
