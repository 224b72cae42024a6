//! Simulation engine for oppnet
//!
//! Replays a contact trace against a network of nodes:
//! - Nodes are built from one `SimConfig`, with a seeded social graph and
//!   seeded interests
//! - Messages are generated on a fixed schedule
//! - Contacts are replayed in start order, both sides borrowed mutably
//! - Every node gets an `on_tick` call once per sample step

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use oppnet_core::{
    Context, Destination, Message, MessageRef, NodeId, Payload, SimContext, Tick, Topic,
};
use oppnet_dtn::{ContactOutcome, Node, NodeConfig, PolicyChoice};

use crate::error::SimResult;
use crate::trace::{Contact, Trace};

/// Configuration for the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Ticks between `on_tick` rounds; battery levels count these rounds
    pub sample_time: Tick,
    /// Publish/subscribe delivery instead of point-to-point routing
    pub dissemination: bool,
    /// Let policies consult the altruism gate
    pub altruism: bool,
    /// Forwarding policy run by every node
    pub policy: PolicyChoice,
    /// Seed for the social graph, interests, messages and node RNGs
    pub seed: u64,
    /// Ticks between message generation rounds
    pub message_interval: Tick,
    /// Probability that a node generates a message in a round
    pub message_probability: f64,
    /// Number of distinct topics when disseminating
    pub topics: u32,
    /// Topics each node subscribes to when disseminating
    pub interests_per_node: usize,
    /// Probability of a social tie between two nodes
    pub social_density: f64,
    /// Configuration shared by all nodes
    pub node: NodeConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            sample_time: 60,
            dissemination: false,
            altruism: false,
            policy: PolicyChoice::Epidemic,
            seed: 0,
            message_interval: 3_600,
            message_probability: 0.5,
            topics: 5,
            interests_per_node: 2,
            social_density: 0.2,
            node: NodeConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Simulation statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimStats {
    pub messages_generated: u64,
    /// One per routed message, one per interested node when disseminating
    pub deliveries_expected: u64,
    pub deliveries: u64,
    pub delivery_ratio: f64,
    /// Mean ticks from generation to delivery
    pub mean_latency: f64,
    /// Mean hop count recorded at the receiver
    pub mean_hops: f64,
    /// Message transfers between nodes
    pub transfers: u64,
    /// Evictions from bounded memories
    pub memory_overflow: u64,
    pub contacts_exchanged: u64,
    pub contacts_suppressed: u64,
    pub contacts_battery_depleted: u64,
}

/// The simulation state
#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    trace: Trace,
    ctx: Arc<SimContext>,
    nodes: Vec<Node>,
    messages: Vec<MessageRef>,
    rng: StdRng,
    /// Start of the next sample step
    tick: Tick,
    next_contact: usize,
    next_generation: Tick,
    stats: SimStats,
}

impl Simulation {
    /// Build every node of `trace` from `config`
    pub fn new(trace: Trace, config: SimConfig) -> SimResult<Self> {
        for warning in config.node.validate() {
            warn!(%warning, "node config warning");
        }

        let ctx = Arc::new(SimContext::with_bounds(trace.bounds(), config.seed));
        let mut rng = StdRng::seed_from_u64(config.seed);
        let n = trace.node_count();

        let mut social = vec![vec![false; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                if rng.random::<f64>() < config.social_density {
                    social[i][j] = true;
                    social[j][i] = true;
                }
            }
        }

        let node_config = NodeConfig {
            sample_time: config.sample_time.max(1),
            ..config.node.clone()
        };
        let mut nodes = Vec::with_capacity(n);
        for (i, row) in social.into_iter().enumerate() {
            let mut interests = Context::new();
            if config.dissemination && config.topics > 0 {
                for _ in 0..config.interests_per_node {
                    interests.add_topic(Topic(rng.random_range(0..config.topics)), trace.start());
                }
            }
            let node = Node::builder(NodeId(i as u32), n)
                .with_social_network(row)
                .with_context(interests)
                .with_config(node_config.clone())
                .build(
                    ctx.clone(),
                    config.policy.build(config.dissemination, config.altruism),
                )?;
            nodes.push(node);
        }

        info!(
            nodes = n,
            contacts = trace.len(),
            policy = ?config.policy,
            dissemination = config.dissemination,
            "simulation initialized"
        );

        Ok(Self {
            tick: trace.start(),
            next_generation: trace.start(),
            config,
            trace,
            ctx,
            nodes,
            messages: Vec::new(),
            rng,
            next_contact: 0,
            stats: SimStats::default(),
        })
    }

    /// Run one sample step
    ///
    /// Generation rounds and contacts starting inside the step are processed
    /// in time order (generation first on ties), then every node ticks.
    /// Returns false once the trace end has been passed.
    pub fn step(&mut self) -> bool {
        if self.tick > self.trace.end() {
            return false;
        }
        let sample_time = self.config.sample_time.max(1);
        let step_end = self.tick.saturating_add(sample_time);
        trace!(tick = self.tick, "sample step");

        loop {
            let contact = self.trace.contacts().get(self.next_contact).copied();
            let generation_due = self.config.message_interval > 0
                && self.next_generation < step_end
                && self.next_generation <= self.trace.end();

            match contact {
                Some(c) if c.start < step_end && !(generation_due && self.next_generation <= c.start) => {
                    self.replay(c);
                    self.next_contact += 1;
                }
                _ if generation_due => {
                    let at = self.next_generation;
                    self.generate_messages(at);
                    self.next_generation = at.saturating_add(self.config.message_interval);
                }
                _ => break,
            }
        }

        for node in &mut self.nodes {
            node.on_tick(self.tick, sample_time);
        }
        self.tick = step_end;
        true
    }

    /// Run until the end of the trace
    pub fn run(&mut self) -> SimStats {
        while self.step() {}

        let stats = self.stats();
        info!(
            tick = self.tick,
            generated = stats.messages_generated,
            delivered = stats.deliveries,
            ratio = stats.delivery_ratio,
            "simulation complete"
        );
        stats
    }

    /// Run for a specific number of sample steps
    pub fn run_steps(&mut self, steps: u64) {
        for _ in 0..steps {
            if !self.step() {
                break;
            }
        }
    }

    fn replay(&mut self, contact: Contact) {
        let Some((a, b)) = pair_mut(&mut self.nodes, contact.a.index(), contact.b.index()) else {
            return;
        };
        match a.exchange_data(b, contact.duration, contact.start) {
            ContactOutcome::Exchanged => self.stats.contacts_exchanged += 1,
            ContactOutcome::Suppressed => self.stats.contacts_suppressed += 1,
            ContactOutcome::BatteryDepleted => self.stats.contacts_battery_depleted += 1,
        }
    }

    fn generate_messages(&mut self, at: Tick) {
        let n = self.nodes.len();
        if n < 2 {
            return;
        }
        for i in 0..n {
            if self.rng.random::<f64>() >= self.config.message_probability {
                continue;
            }
            let source = NodeId(i as u32);
            let (destination, tags) = if self.config.dissemination {
                let mut tags = Context::new();
                if self.config.topics > 0 {
                    tags.add_topic(Topic(self.rng.random_range(0..self.config.topics)), at);
                }
                (Destination::Dissemination, tags)
            } else {
                let mut dest = self.rng.random_range(0..n - 1);
                if dest >= i {
                    dest += 1;
                }
                (Destination::Node(NodeId(dest as u32)), Context::new())
            };
            self.send_at(source, destination, tags, at);
        }
        debug!(tick = at, total = self.messages.len(), "generation round");
    }

    /// Create a message at `source` stamped with the current tick
    ///
    /// Returns `None` for unknown sources.
    pub fn send_message(
        &mut self,
        source: NodeId,
        destination: Destination,
        tags: Context,
    ) -> Option<MessageRef> {
        self.send_at(source, destination, tags, self.tick)
    }

    fn send_at(
        &mut self,
        source: NodeId,
        destination: Destination,
        tags: Context,
        at: Tick,
    ) -> Option<MessageRef> {
        let node = self.nodes.get_mut(source.index())?;
        let message = Message::new(&self.ctx, source, destination, at, Payload::default(), tags);
        let stored = node.generate_message(message)?;
        self.messages.push(stored.clone());
        Some(stored)
    }

    /// Aggregate statistics over the messages generated so far
    pub fn stats(&self) -> SimStats {
        let mut stats = SimStats {
            messages_generated: self.messages.len() as u64,
            ..self.stats.clone()
        };

        let mut latency = 0u64;
        let mut hops = 0u64;
        let end = self.trace.end();
        for message in &self.messages {
            let receivers: Vec<NodeId> = match message.destination() {
                Destination::Node(dest) => vec![dest],
                Destination::Dissemination => self
                    .nodes
                    .iter()
                    .filter(|n| {
                        n.id() != message.source()
                            && n.state().context().has_common_topics(message.tags(), end)
                    })
                    .map(Node::id)
                    .collect(),
            };
            for id in receivers {
                stats.deliveries_expected += 1;
                if let Some(l) = message.latency(id) {
                    stats.deliveries += 1;
                    latency += l;
                    hops += u64::from(message.hops(id));
                }
            }
        }

        if stats.deliveries_expected > 0 {
            stats.delivery_ratio = stats.deliveries as f64 / stats.deliveries_expected as f64;
        }
        if stats.deliveries > 0 {
            stats.mean_latency = latency as f64 / stats.deliveries as f64;
            stats.mean_hops = hops as f64 / stats.deliveries as f64;
        }

        // each transfer is counted by both of its ends
        stats.transfers = self
            .nodes
            .iter()
            .map(|n| n.state().messages_exchanged())
            .sum::<u64>()
            / 2;
        stats.memory_overflow = self
            .nodes
            .iter()
            .map(|n| n.state().data_memory_overflow())
            .sum();
        stats
    }

    /// Get a summary of the current state
    pub fn state_summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Tick {} | Contacts: {}/{} | Messages: {} | Delivered: {}/{}",
            self.tick,
            self.next_contact,
            self.trace.len(),
            stats.messages_generated,
            stats.deliveries,
            stats.deliveries_expected,
        )
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn context(&self) -> &Arc<SimContext> {
        &self.ctx
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Messages generated so far, in creation order
    pub fn messages(&self) -> &[MessageRef] {
        &self.messages
    }
}

/// Borrow two distinct nodes mutably
fn pair_mut(nodes: &mut [Node], a: usize, b: usize) -> Option<(&mut Node, &mut Node)> {
    if a == b || a >= nodes.len() || b >= nodes.len() {
        return None;
    }
    if a < b {
        let (left, right) = nodes.split_at_mut(b);
        Some((&mut left[a], &mut right[0]))
    } else {
        let (left, right) = nodes.split_at_mut(a);
        Some((&mut right[0], &mut left[b]))
    }
}
