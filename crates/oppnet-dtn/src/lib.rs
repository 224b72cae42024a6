//! # Oppnet DTN
//!
//! Per-node contact-exchange engine for opportunistic network simulation.
//!
//! Nodes meet pairwise according to a contact trace. On each meeting the
//! engine updates both sides' relationship state and then hands control to
//! a pluggable forwarding policy on each side.
//!
//! ## Features
//!
//! - **Bounded storage**: a FIFO-evicting message memory per node, plus an
//!   unbounded list of the node's own messages.
//!
//! - **Admission control**: contact duration is turned into a message quota
//!   by the bandwidth model, and a battery gates participation altogether.
//!
//! - **Social awareness**: windowed centrality estimation, K-Clique
//!   community detection and an altruism gate are available to policies.
//!
//! - **Pluggable policies**: forwarding and dissemination strategies
//!   implement [`ExchangePolicy`] on top of the engine primitives.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use oppnet_core::{NodeId, SimContext};
//! use oppnet_dtn::{Node, NodeConfig, policies::Epidemic};
//!
//! let ctx = Arc::new(SimContext::new(0, 86_400, 7));
//! let mut a = Node::builder(NodeId(0), 2)
//!     .with_config(NodeConfig::unconstrained())
//!     .build(ctx.clone(), Box::new(Epidemic::routing()))?;
//! let mut b = Node::builder(NodeId(1), 2)
//!     .build(ctx, Box::new(Epidemic::routing()))?;
//!
//! a.exchange_data(&mut b, 300, 1_000);
//! ```
//!
//! ## Architecture
//!
//! - [`node`]: `Node`, `NodeState` and the contact protocol
//! - [`policy`]: the `ExchangePolicy` trait
//! - [`policies`]: reference policies (epidemic, direct delivery, spray and wait)
//! - [`memory`]: bounded message memory
//! - [`contact`], [`history`]: per-peer counters and transfer provenance
//! - [`battery`], [`network`]: participation gate and bandwidth quota
//! - [`centrality`], [`community`], [`altruism`]: social estimators
//! - [`error`]: construction errors

pub mod altruism;
pub mod battery;
pub mod centrality;
pub mod community;
pub mod contact;
pub mod error;
pub mod history;
pub mod memory;
pub mod network;
pub mod node;
pub mod policies;
pub mod policy;

// Re-export main types
pub use altruism::{Altruism, AltruismConfig, SocialView};
pub use battery::{Battery, BatteryConfig};
pub use centrality::{Centrality, CentralityConfig, CentralityValues};
pub use community::{CommunityDetection, ContactMap, KClique, KCliqueConfig};
pub use contact::ContactInfo;
pub use error::{NodeError, NodeResult};
pub use history::{ExchangeHistory, ExchangeLog};
pub use memory::DataMemory;
pub use network::{Network, NetworkConfig, Quota};
pub use node::{ContactOutcome, Delivery, Node, NodeBuilder, NodeState};
pub use policies::PolicyChoice;
pub use policy::{ExchangePolicy, PolicyKind};

use serde::{Deserialize, Serialize};

use oppnet_core::Tick;

/// Configuration of a single node
///
/// Combines the configuration of every engine component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Capacity of the bounded message memory
    pub data_memory_size: usize,
    /// Capacity of each of the sent/received exchange logs
    pub exchange_history_size: usize,
    /// Ticks between sampling steps, handed to community strategies
    pub sample_time: Tick,
    pub network: NetworkConfig,
    pub battery: BatteryConfig,
    pub centrality: CentralityConfig,
    pub community: KCliqueConfig,
    pub altruism: AltruismConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_memory_size: 4_500,
            exchange_history_size: 100,
            sample_time: 1,
            network: NetworkConfig::default(),
            battery: BatteryConfig::default(),
            centrality: CentralityConfig::default(),
            community: KCliqueConfig::default(),
            altruism: AltruismConfig::default(),
        }
    }
}

impl NodeConfig {
    /// Create a config that never limits the exchange
    ///
    /// Unlimited bandwidth, no battery, very large memory.
    pub fn unconstrained() -> Self {
        Self {
            data_memory_size: 1_000_000,
            exchange_history_size: 1_000,
            network: NetworkConfig::unlimited(),
            battery: BatteryConfig::disabled(),
            ..Default::default()
        }
    }

    /// Create a config for resource-constrained devices
    ///
    /// Small memory, slow links and a battery lasting half a day.
    pub fn resource_constrained() -> Self {
        Self {
            data_memory_size: 20,
            exchange_history_size: 20,
            network: NetworkConfig {
                transfer_speed: 0.02,
                unlimited: false,
            },
            battery: BatteryConfig {
                enabled: true,
                max_level: 43_200.0,
                min_threshold: 0.3,
                recharge_duration: 10_800,
            },
            ..Default::default()
        }
    }

    /// Validate configuration invariants
    ///
    /// Returns a list of warnings/errors if the configuration has potential issues.
    /// An empty list means the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.data_memory_size == 0 {
            warnings.push(ConfigWarning::ZeroDataMemory);
        }

        if self.exchange_history_size == 0 {
            warnings.push(ConfigWarning::ZeroExchangeHistory);
        }

        if self.sample_time == 0 {
            warnings.push(ConfigWarning::ZeroSampleTime);
        }

        if !self.network.unlimited && self.network.transfer_speed <= 0.0 {
            warnings.push(ConfigWarning::NonPositiveTransferSpeed);
        }

        if !(0.0..=1.0).contains(&self.battery.min_threshold) {
            warnings.push(ConfigWarning::BatteryThresholdOutOfRange);
        }

        if self.centrality.time_window == 0 {
            warnings.push(ConfigWarning::ZeroTimeWindow);
        }

        // k = 1 would admit every peer met
        if self.community.community_threshold < 2 {
            warnings.push(ConfigWarning::CommunityThresholdTooSmall);
        }

        let unit = 0.0..=1.0;
        if !unit.contains(&self.altruism.local) || !unit.contains(&self.altruism.global) {
            warnings.push(ConfigWarning::AltruismOutOfRange);
        }

        warnings
    }

    /// Check if the configuration is valid (no errors)
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Configuration warnings and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Bounded memory has no room at all
    ZeroDataMemory,
    /// Exchange logs keep nothing
    ZeroExchangeHistory,
    /// Sampling step of zero ticks
    ZeroSampleTime,
    /// Limited bandwidth with a non-positive speed
    NonPositiveTransferSpeed,
    /// Battery threshold is not a fraction
    BatteryThresholdOutOfRange,
    /// Centrality window of zero ticks
    ZeroTimeWindow,
    /// K-Clique `k` below 2
    CommunityThresholdTooSmall,
    /// Altruism outside `[0, 1]`
    AltruismOutOfRange,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::ZeroDataMemory => write!(f, "data_memory_size is zero"),
            ConfigWarning::ZeroExchangeHistory => write!(f, "exchange_history_size is zero"),
            ConfigWarning::ZeroSampleTime => write!(f, "sample_time is zero"),
            ConfigWarning::NonPositiveTransferSpeed => {
                write!(f, "transfer_speed must be positive when bandwidth is limited")
            }
            ConfigWarning::BatteryThresholdOutOfRange => {
                write!(f, "battery min_threshold outside [0, 1]")
            }
            ConfigWarning::ZeroTimeWindow => write!(f, "centrality time_window is zero"),
            ConfigWarning::CommunityThresholdTooSmall => {
                write!(f, "community_threshold below 2")
            }
            ConfigWarning::AltruismOutOfRange => write!(f, "altruism outside [0, 1]"),
        }
    }
}
