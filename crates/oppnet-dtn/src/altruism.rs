//! Altruism and the selfishness gate
//!
//! A node forwards or accepts a message with a probability given by its
//! altruism: `local` for messages from its social circle (or, when
//! disseminating, on topics it shares), `global` for everything else.
//! Policies move these values, and the per-peer perceived altruism, in
//! fixed steps.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use oppnet_core::{Context, Message, NodeId, Tick};

/// Altruism configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AltruismConfig {
    /// Initial altruism towards the social circle
    pub local: f64,
    /// Initial altruism towards everyone else
    pub global: f64,
    /// Step applied by `increase_*`/`decrease_*`
    pub behavior_constant: f64,
    /// Step applied to perceived altruism of a peer
    pub perceived_behavior_constant: f64,
    /// Perceived altruism of peers not yet rated
    pub initial_perceived: f64,
}

impl Default for AltruismConfig {
    fn default() -> Self {
        Self {
            local: 1.0,
            global: 1.0,
            behavior_constant: 0.05,
            perceived_behavior_constant: 0.02,
            initial_perceived: 0.5,
        }
    }
}

/// What the gate needs to know about the deciding node
#[derive(Debug, Clone, Copy)]
pub struct SocialView<'a> {
    pub social_network: &'a [bool],
    pub context: &'a Context,
}

impl SocialView<'_> {
    fn knows(&self, id: NodeId) -> bool {
        self.social_network.get(id.index()).copied().unwrap_or(false)
    }
}

/// Altruism state of one node
#[derive(Debug, Clone)]
pub struct Altruism {
    config: AltruismConfig,
    local: f64,
    global: f64,
    perceived: HashMap<NodeId, f64>,
    rng: StdRng,
}

impl Altruism {
    pub fn new(config: AltruismConfig, seed: u64) -> Self {
        Self {
            local: config.local.clamp(0.0, 1.0),
            global: config.global.clamp(0.0, 1.0),
            perceived: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    /// Decide whether the node refuses `message`
    ///
    /// Draws one value in `[0, 1)`; the node is selfish when the draw
    /// reaches the applicable altruism, so 0.0 always refuses and 1.0 never
    /// does.
    pub fn is_selfish(
        &mut self,
        node: SocialView<'_>,
        message: &Message,
        tick: Tick,
        dissemination: bool,
    ) -> bool {
        let draw: f64 = self.rng.random();
        let close = if dissemination {
            node.context.has_common_topics(message.tags(), tick)
        } else {
            node.knows(message.source())
        };
        let altruism = if close { self.local } else { self.global };
        draw >= altruism
    }

    pub fn local(&self) -> f64 {
        self.local
    }

    pub fn global(&self) -> f64 {
        self.global
    }

    pub fn set_local(&mut self, value: f64) {
        self.local = value.clamp(0.0, 1.0);
    }

    pub fn set_global(&mut self, value: f64) {
        self.global = value.clamp(0.0, 1.0);
    }

    pub fn increase_local(&mut self) {
        self.set_local(self.local + self.config.behavior_constant);
    }

    pub fn decrease_local(&mut self) {
        self.set_local(self.local - self.config.behavior_constant);
    }

    pub fn increase_global(&mut self) {
        self.set_global(self.global + self.config.behavior_constant);
    }

    pub fn decrease_global(&mut self) {
        self.set_global(self.global - self.config.behavior_constant);
    }

    /// How altruistic this node believes `peer` to be
    pub fn perceived(&self, peer: NodeId) -> f64 {
        self.perceived
            .get(&peer)
            .copied()
            .unwrap_or(self.config.initial_perceived)
    }

    pub fn increase_perceived(&mut self, peer: NodeId) {
        let step = self.config.perceived_behavior_constant;
        self.adjust_perceived(peer, step);
    }

    pub fn decrease_perceived(&mut self, peer: NodeId) {
        let step = self.config.perceived_behavior_constant;
        self.adjust_perceived(peer, -step);
    }

    fn adjust_perceived(&mut self, peer: NodeId, delta: f64) {
        let value = (self.perceived(peer) + delta).clamp(0.0, 1.0);
        self.perceived.insert(peer, value);
    }
}
