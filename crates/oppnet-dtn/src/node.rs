//! Per-node contact-exchange engine
//!
//! A [`Node`] pairs the policy-independent [`NodeState`] with a boxed
//! [`ExchangePolicy`]. The scheduler calls [`Node::exchange_data`] once per
//! contact. Within that single call both sides' relationship state,
//! community view, exchange history and centrality are brought up to date
//! before the policy runs on each side.
//!
//! [`NodeState`] exposes the primitives every policy is built from:
//! [`NodeState::deliver_direct_messages`] and [`NodeState::insert_message`].
//! Both are total: unavailable peers, full memories and exhausted quotas
//! are ordinary outcomes, reported through return values.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, trace};

use oppnet_core::{
    Context, Destination, MessageId, MessageRef, NodeId, SimContext, Tick,
};

use crate::altruism::{Altruism, SocialView};
use crate::battery::Battery;
use crate::centrality::{Centrality, CentralityValues};
use crate::community::{CommunityDetection, ContactMap, KClique};
use crate::contact::ContactInfo;
use crate::error::{NodeError, NodeResult};
use crate::history::{ExchangeHistory, ExchangeLog};
use crate::memory::DataMemory;
use crate::network::{Network, Quota};
use crate::policy::{ExchangePolicy, PolicyKind};
use crate::{ConfigWarning, NodeConfig};

/// Outcome of [`NodeState::deliver_direct_messages`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Quota left for the rest of the contact; `Limited(0)` means stop
    Remaining(Quota),
    /// The peer runs a different policy kind
    Incompatible,
}

impl Delivery {
    /// Remaining quota, `None` for incompatible peers
    pub fn remaining(&self) -> Option<Quota> {
        match self {
            Delivery::Remaining(quota) => Some(*quota),
            Delivery::Incompatible => None,
        }
    }
}

/// Outcome of [`Node::exchange_data`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Same contact is still in progress, or the peer is the node itself
    Suppressed,
    /// Met, but at least one battery is too low to exchange data
    BatteryDepleted,
    /// Both policies ran
    Exchanged,
}

/// Last processed contact with a peer, for the cool-down guard
#[derive(Debug, Clone, Copy)]
struct ExchangeWindow {
    time: Tick,
    duration: Tick,
}

impl ExchangeWindow {
    fn covers(&self, tick: Tick) -> bool {
        tick < self.time.saturating_add(self.duration.max(1))
    }
}

/// Policy-independent state of a node
#[derive(Debug)]
pub struct NodeState {
    id: NodeId,
    node_count: usize,
    kind: PolicyKind,
    ctx: Arc<SimContext>,
    sample_time: Tick,
    social_network: Vec<bool>,
    context: Context,
    data_memory: DataMemory,
    own_messages: Vec<MessageRef>,
    own_index: HashSet<MessageId>,
    contacts: ContactMap,
    encounters: HashMap<NodeId, u32>,
    exchange_windows: HashMap<NodeId, ExchangeWindow>,
    sent: ExchangeLog,
    received: ExchangeLog,
    centrality: Centrality,
    local_centrality: Centrality,
    community: Box<dyn CommunityDetection>,
    battery: Battery,
    network: Network,
    altruism: Altruism,
    messages_exchanged: u64,
}

impl NodeState {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Policy kind this node runs
    pub fn kind(&self) -> PolicyKind {
        self.kind
    }

    pub fn sim_context(&self) -> &Arc<SimContext> {
        &self.ctx
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn social_network(&self) -> &[bool] {
        &self.social_network
    }

    pub fn in_social_network(&self, id: NodeId) -> bool {
        self.social_network.get(id.index()).copied().unwrap_or(false)
    }

    pub fn in_local_community(&self, id: NodeId) -> bool {
        self.community.in_local_community(id)
    }

    pub fn community(&self) -> &dyn CommunityDetection {
        self.community.as_ref()
    }

    /// Ids set in both nodes' social network rows
    pub fn common_neighbors(&self, other: &NodeState) -> usize {
        self.social_network
            .iter()
            .zip(&other.social_network)
            .filter(|(a, b)| **a && **b)
            .count()
    }

    /// Cumulated centrality, global or community-scoped
    pub fn centrality(&self, local: bool) -> f64 {
        self.centrality_values(local).cumulated
    }

    pub fn centrality_values(&self, local: bool) -> CentralityValues {
        if local {
            self.local_centrality.values()
        } else {
            self.centrality.values()
        }
    }

    /// Centrality registers scaled by the process-wide maxima
    pub fn normalized_centrality(&self, local: bool) -> CentralityValues {
        let maxima = self.ctx.centrality_maxima(local);
        if local {
            self.local_centrality.normalized(maxima)
        } else {
            self.centrality.normalized(maxima)
        }
    }

    /// Apply any pending centrality window rollover at `tick`
    pub fn update_centrality(&mut self, tick: Tick) {
        let delta = self.ctx.bounds().elapsed(tick);
        self.centrality.update(delta);
        self.local_centrality.update(delta);
        self.publish_centrality();
    }

    fn record_centrality(&mut self, peer: NodeId, tick: Tick) {
        let delta = self.ctx.bounds().elapsed(tick);
        self.centrality.record_encounter(peer, delta);
        if self.community.in_local_community(peer) {
            self.local_centrality.record_encounter(peer, delta);
        } else {
            self.local_centrality.update(delta);
        }
        self.publish_centrality();
    }

    fn publish_centrality(&self) {
        self.centrality.publish(self.ctx.centrality_maxima(false));
        self.local_centrality
            .publish(self.ctx.centrality_maxima(true));
    }

    /// Number of discrete contacts with `id`
    pub fn contacts_number(&self, id: NodeId) -> u32 {
        self.contacts.get(&id).map(|c| c.contacts()).unwrap_or(0)
    }

    pub fn contact_info(&self, id: NodeId) -> Option<&ContactInfo> {
        self.contacts.get(&id)
    }

    pub fn contacts(&self) -> &ContactMap {
        &self.contacts
    }

    /// Contacts with `id` in which data was actually exchanged
    pub fn encounters(&self, id: NodeId) -> u32 {
        self.encounters.get(&id).copied().unwrap_or(0)
    }

    /// Messages this node sent or received
    pub fn messages_exchanged(&self) -> u64 {
        self.messages_exchanged
    }

    pub fn data_memory(&self) -> &DataMemory {
        &self.data_memory
    }

    /// Messages currently in the bounded memory
    pub fn data_memory_size(&self) -> usize {
        self.data_memory.len()
    }

    /// Messages evicted from the bounded memory so far
    pub fn data_memory_overflow(&self) -> u64 {
        self.data_memory.overflow()
    }

    pub fn own_messages(&self) -> &[MessageRef] {
        &self.own_messages
    }

    /// Check whether the message is in memory or among own messages
    pub fn holds(&self, id: MessageId) -> bool {
        self.data_memory.contains(id) || self.own_index.contains(&id)
    }

    /// Everything the node carries: memory first, then own messages
    pub fn carried_messages(&self) -> Vec<MessageRef> {
        self.data_memory
            .iter()
            .chain(self.own_messages.iter())
            .cloned()
            .collect()
    }

    pub fn sent_history(&self) -> &ExchangeLog {
        &self.sent
    }

    pub fn received_history(&self) -> &ExchangeLog {
        &self.received
    }

    pub fn battery(&self) -> &Battery {
        &self.battery
    }

    pub fn battery_mut(&mut self) -> &mut Battery {
        &mut self.battery
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn altruism(&self) -> &Altruism {
        &self.altruism
    }

    pub fn altruism_mut(&mut self) -> &mut Altruism {
        &mut self.altruism
    }

    /// Add a message generated by this node
    ///
    /// Returns `None` if the message is already held.
    pub fn store_own_message(&mut self, message: MessageRef) -> Option<MessageRef> {
        if self.holds(message.id()) {
            return None;
        }
        trace!(node = %self.id, message = %message.id(), "generated message");
        self.own_index.insert(message.id());
        self.own_messages.push(message.clone());
        Some(message)
    }

    fn is_selfish(&mut self, message: &MessageRef, tick: Tick, dissemination: bool) -> bool {
        let view = SocialView {
            social_network: &self.social_network,
            context: &self.context,
        };
        self.altruism.is_selfish(view, message, tick, dissemination)
    }

    fn wants(&self, message: &MessageRef, tick: Tick, dissemination: bool) -> bool {
        if message.is_delivered(self.id) {
            return false;
        }
        if dissemination {
            message.is_dissemination()
                && message.source() != self.id
                && self.context.has_common_topics(message.tags(), tick)
        } else {
            message.is_destined_for(self.id)
        }
    }

    /// Log one transfer from `sender` to `self` on both sides
    fn record_transfer(&mut self, sender: &mut NodeState, message: &MessageRef, tick: Tick) {
        self.received.push(ExchangeHistory::new(
            tick,
            message.clone(),
            sender.id,
            self.id,
            sender.battery.fraction(),
        ));
        sender.sent.push(ExchangeHistory::new(
            tick,
            message.clone(),
            self.id,
            sender.id,
            self.battery.fraction(),
        ));
        self.messages_exchanged += 1;
        sender.messages_exchanged += 1;
    }

    /// Pull from `peer` the messages meant for this node
    ///
    /// In routing mode those are the messages addressed to this node; they
    /// are consumed from the peer. In dissemination mode they are the
    /// messages whose tags share an active topic with this node's context;
    /// they stay with the peer for other subscribers.
    ///
    /// At most `compute_max_messages(duration)` messages are taken, peer
    /// memory first, then the peer's own messages. Messages refused by the
    /// altruism gate do not count against the quota.
    pub fn deliver_direct_messages(
        &mut self,
        peer: &mut NodeState,
        use_altruism: bool,
        duration: Tick,
        tick: Tick,
        dissemination: bool,
    ) -> Delivery {
        if peer.kind != self.kind {
            trace!(node = %self.id, peer = %peer.id, "incompatible peer");
            return Delivery::Incompatible;
        }

        let quota = self.network.compute_max_messages(duration);
        let candidates: Vec<MessageRef> = peer
            .carried_messages()
            .into_iter()
            .filter(|m| self.wants(m, tick, dissemination))
            .collect();

        let mut delivered = 0;
        for message in candidates {
            if !quota.allows(delivered) {
                break;
            }
            if use_altruism && self.is_selfish(&message, tick, dissemination) {
                trace!(node = %self.id, message = %message.id(), "refused delivery");
                continue;
            }

            self.record_transfer(peer, &message, tick);
            message.mark_as_delivered(self.id, tick);

            if !dissemination {
                let id = message.id();
                peer.data_memory.remove(id);
                if peer.own_index.remove(&id) {
                    peer.own_messages.retain(|m| m.id() != id);
                }
                message.delete_copies(peer.id);
            }

            debug!(
                node = %self.id,
                peer = %peer.id,
                message = %message.id(),
                latency = message.latency(self.id).unwrap_or(0),
                "message delivered"
            );
            delivered += 1;
        }

        Delivery::Remaining(quota.remaining_after(delivered))
    }

    /// Store `message` received from `from`
    ///
    /// Fails without side effects if the message is already held or the
    /// altruism gate refuses it. A full memory evicts its oldest message,
    /// whose copy count at this node drops to zero. The copy count at `from`
    /// is copied to this node unchanged.
    pub fn insert_message(
        &mut self,
        message: &MessageRef,
        from: &mut NodeState,
        tick: Tick,
        use_altruism: bool,
        dissemination: bool,
    ) -> bool {
        if self.holds(message.id()) {
            return false;
        }
        if use_altruism && self.is_selfish(message, tick, dissemination) {
            trace!(node = %self.id, message = %message.id(), "refused message");
            return false;
        }

        self.record_transfer(from, message, tick);

        message.copy(from.id, self.id);
        if let Some(evicted) = self.data_memory.push(message.clone()) {
            evicted.delete_copies(self.id);
            debug!(
                node = %self.id,
                evicted = %evicted.id(),
                overflow = self.data_memory.overflow(),
                "memory full, evicted oldest message"
            );
        }

        match message.destination() {
            Destination::Dissemination => message.increase_hop_counts(NodeId::all(self.node_count)),
            Destination::Node(destination) => message.increase_hop_count(destination),
        }

        trace!(node = %self.id, from = %from.id, message = %message.id(), "stored message");
        true
    }

    /// Record a contact with `peer` and refresh familiarity
    fn record_contact(&mut self, peer: NodeId, duration: Tick, tick: Tick) {
        self.contacts
            .entry(peer)
            .or_insert_with(|| ContactInfo::new(tick))
            .record_contact(duration, tick);
        self.community.on_update(peer, &self.contacts);
    }

    /// Cool-down check and registration, `false` if the contact is in progress
    fn open_window(&mut self, peer: NodeId, duration: Tick, tick: Tick) -> bool {
        if self
            .exchange_windows
            .get(&peer)
            .is_some_and(|w| w.covers(tick))
        {
            return false;
        }
        self.exchange_windows
            .insert(peer, ExchangeWindow { time: tick, duration });
        true
    }
}

/// A simulated node: engine state plus forwarding policy
#[derive(Debug)]
pub struct Node {
    state: NodeState,
    policy: Box<dyn ExchangePolicy>,
}

impl Node {
    /// Start building node `id` of a network with `node_count` nodes
    pub fn builder(id: NodeId, node_count: usize) -> NodeBuilder {
        NodeBuilder::new(id, node_count)
    }

    pub fn id(&self) -> NodeId {
        self.state.id
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut NodeState {
        &mut self.state
    }

    pub fn policy(&self) -> &dyn ExchangePolicy {
        self.policy.as_ref()
    }

    /// Process a contact with `peer` lasting `duration` ticks from `tick`
    ///
    /// Repeated calls for the same pair while the contact lasts are
    /// suppressed on both sides.
    pub fn exchange_data(&mut self, peer: &mut Node, duration: Tick, tick: Tick) -> ContactOutcome {
        let (a, b) = (self.state.id, peer.state.id);
        if a == b {
            return ContactOutcome::Suppressed;
        }

        let open_a = self.state.open_window(b, duration, tick);
        let open_b = peer.state.open_window(a, duration, tick);
        if !(open_a && open_b) {
            trace!(node = %a, peer = %b, tick, "contact already in progress");
            return ContactOutcome::Suppressed;
        }

        self.state.record_contact(b, duration, tick);
        peer.state.record_contact(a, duration, tick);

        // each side merges the other's view as it was before the contact
        let view_a = self.state.community.clone_box();
        let view_b = peer.state.community.clone_box();
        let sample_time = self.state.sample_time;
        self.state
            .community
            .on_contact(b, view_b.as_ref(), tick, sample_time);
        peer.state
            .community
            .on_contact(a, view_a.as_ref(), tick, peer.state.sample_time);

        if !(self.state.battery.can_participate() && peer.state.battery.can_participate()) {
            debug!(node = %a, peer = %b, tick, "battery too low, skipping exchange");
            return ContactOutcome::BatteryDepleted;
        }

        let (sent_a, received_a) = (self.state.sent.clone(), self.state.received.clone());
        self.state.sent.merge(&peer.state.sent);
        self.state.received.merge(&peer.state.received);
        peer.state.sent.merge(&sent_a);
        peer.state.received.merge(&received_a);

        self.state.record_centrality(b, tick);
        peer.state.record_centrality(a, tick);

        *self.state.encounters.entry(b).or_insert(0) += 1;
        *peer.state.encounters.entry(a).or_insert(0) += 1;

        debug!(node = %a, peer = %b, tick, duration, "exchanging data");

        self.policy
            .pre_exchange(&mut self.state, &mut peer.state, duration, tick);
        self.policy
            .on_exchange(&mut self.state, &mut peer.state, duration, tick);
        peer.policy
            .on_exchange(&mut peer.state, &mut self.state, duration, tick);

        ContactOutcome::Exchanged
    }

    /// Per-tick hook: battery drain, then policy bookkeeping
    pub fn on_tick(&mut self, tick: Tick, sample_time: Tick) {
        self.state.battery.update_battery_level();
        self.state.battery.reset_decrease_rate();
        self.policy.on_tick(&mut self.state, tick, sample_time);
    }

    /// Hand a freshly created message to the node's policy
    pub fn generate_message(&mut self, message: MessageRef) -> Option<MessageRef> {
        self.policy.generate_message(&mut self.state, message)
    }
}

/// Builder for [`Node`]
pub struct NodeBuilder {
    id: NodeId,
    node_count: usize,
    social_network: Option<Vec<bool>>,
    context: Context,
    config: NodeConfig,
    community: Option<Box<dyn CommunityDetection>>,
}

impl NodeBuilder {
    pub fn new(id: NodeId, node_count: usize) -> Self {
        Self {
            id,
            node_count,
            social_network: None,
            context: Context::new(),
            config: NodeConfig::default(),
            community: None,
        }
    }

    /// Initial social graph row, one flag per node
    pub fn with_social_network(mut self, row: Vec<bool>) -> Self {
        self.social_network = Some(row);
        self
    }

    /// Initial interests
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn with_config(mut self, config: NodeConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default K-Clique strategy
    pub fn with_community(mut self, community: Box<dyn CommunityDetection>) -> Self {
        self.community = Some(community);
        self
    }

    /// Build the node
    ///
    /// Fails only on construction invariants: id outside the network, a
    /// social row of the wrong length, or a zero-capacity memory.
    pub fn build(self, ctx: Arc<SimContext>, policy: Box<dyn ExchangePolicy>) -> NodeResult<Node> {
        let Self {
            id,
            node_count,
            social_network,
            context,
            config,
            community,
        } = self;

        if id.index() >= node_count {
            return Err(NodeError::IdOutOfRange { id, node_count });
        }
        if config.data_memory_size == 0 {
            return Err(NodeError::InvalidConfig(ConfigWarning::ZeroDataMemory));
        }
        let social_network = social_network.unwrap_or_else(|| vec![false; node_count]);
        if social_network.len() != node_count {
            return Err(NodeError::SocialNetworkSize {
                expected: node_count,
                actual: social_network.len(),
            });
        }

        let community = community.unwrap_or_else(|| {
            Box::new(KClique::new(id, node_count, config.community.clone()))
        });
        let altruism = Altruism::new(config.altruism.clone(), ctx.node_seed(id));

        let state = NodeState {
            id,
            node_count,
            kind: policy.kind(),
            sample_time: config.sample_time.max(1),
            social_network,
            context,
            data_memory: DataMemory::new(config.data_memory_size),
            own_messages: Vec::new(),
            own_index: HashSet::new(),
            contacts: ContactMap::new(),
            encounters: HashMap::new(),
            exchange_windows: HashMap::new(),
            sent: ExchangeLog::new(config.exchange_history_size),
            received: ExchangeLog::new(config.exchange_history_size),
            centrality: Centrality::new(&config.centrality),
            local_centrality: Centrality::new(&config.centrality),
            community,
            battery: Battery::new(config.battery.clone()),
            network: Network::new(config.network.clone()),
            altruism,
            messages_exchanged: 0,
            ctx,
        };

        debug!(node = %id, policy = %state.kind, "node created");
        Ok(Node { state, policy })
    }
}
