//! Bandwidth model
//!
//! Converts the duration of a contact into the number of messages that can
//! cross it. Every transfer in a contact draws from this quota.

use std::fmt;

use serde::{Deserialize, Serialize};

use oppnet_core::Tick;

/// Bandwidth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Messages per tick
    pub transfer_speed: f64,
    /// Ignore `transfer_speed` and never limit transfers
    pub unlimited: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            transfer_speed: 0.1,
            unlimited: false,
        }
    }
}

impl NetworkConfig {
    pub fn unlimited() -> Self {
        Self {
            unlimited: true,
            ..Default::default()
        }
    }
}

/// Number of messages that may still cross a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quota {
    Unlimited,
    Limited(usize),
}

impl Quota {
    /// True once a limited quota has been used up
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Quota::Limited(0))
    }

    /// Remaining capacity after `used` messages
    pub fn remaining_after(&self, used: usize) -> Quota {
        match self {
            Quota::Unlimited => Quota::Unlimited,
            Quota::Limited(max) => Quota::Limited(max.saturating_sub(used)),
        }
    }

    /// Check whether `used` messages still fit
    pub fn allows(&self, used: usize) -> bool {
        match self {
            Quota::Unlimited => true,
            Quota::Limited(max) => used < *max,
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quota::Unlimited => write!(f, "unlimited"),
            Quota::Limited(n) => write!(f, "{}", n),
        }
    }
}

/// Per-node bandwidth model
#[derive(Debug, Clone)]
pub struct Network {
    config: NetworkConfig,
}

impl Network {
    pub fn new(config: NetworkConfig) -> Self {
        Self { config }
    }

    /// Messages that fit into a contact of `duration` ticks
    ///
    /// `floor(transfer_speed * duration) + 1`, or unlimited.
    pub fn compute_max_messages(&self, duration: Tick) -> Quota {
        if self.config.unlimited {
            return Quota::Unlimited;
        }
        let speed = self.config.transfer_speed.max(0.0);
        let max = (speed * duration as f64).floor();
        if max >= usize::MAX as f64 {
            Quota::Unlimited
        } else {
            Quota::Limited(max as usize + 1)
        }
    }

    pub fn transfer_speed(&self) -> f64 {
        self.config.transfer_speed
    }

    pub fn is_unlimited(&self) -> bool {
        self.config.unlimited
    }
}
