//! Tick-based battery model
//!
//! The battery gates participation in contacts. It discharges by
//! `decrease_rate` each tick; once empty the node recharges for a fixed
//! number of ticks and then snaps back to a full charge.

use serde::{Deserialize, Serialize};
use tracing::debug;

use oppnet_core::Tick;

/// Battery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryConfig {
    /// Disabled batteries never drain and always allow participation
    pub enabled: bool,
    /// Full charge, in ticks of operation
    pub max_level: f64,
    /// Fraction of `max_level` below which the node stops participating
    pub min_threshold: f64,
    /// Ticks spent recharging after the battery runs flat
    pub recharge_duration: Tick,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_level: 86_400.0, // one day
            min_threshold: 0.2,
            recharge_duration: 7_200, // two hours
        }
    }
}

impl BatteryConfig {
    /// A battery that never constrains the node
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Battery state of a node
#[derive(Debug, Clone)]
pub struct Battery {
    config: BatteryConfig,
    current_level: f64,
    decrease_rate: f64,
    charging: bool,
    recharge_elapsed: Tick,
}

impl Battery {
    /// Create a fully charged battery
    pub fn new(config: BatteryConfig) -> Self {
        let max_level = config.max_level.max(0.0);
        Self {
            config: BatteryConfig {
                max_level,
                ..config
            },
            current_level: max_level,
            decrease_rate: 1.0,
            charging: false,
            recharge_elapsed: 0,
        }
    }

    /// Advance the battery by one tick
    pub fn update_battery_level(&mut self) {
        if !self.config.enabled {
            return;
        }

        if self.charging {
            self.recharge_elapsed += 1;
            if self.recharge_elapsed >= self.config.recharge_duration {
                self.charging = false;
                self.recharge_elapsed = 0;
                self.current_level = self.config.max_level;
                debug!("battery recharged");
            }
            return;
        }

        self.current_level -= self.decrease_rate;
        if self.current_level <= 0.0 {
            self.current_level = 0.0;
            self.charging = true;
            self.recharge_elapsed = 0;
            debug!("battery depleted, recharging");
        }
    }

    /// Check whether the node has enough charge to take part in a contact
    pub fn can_participate(&self) -> bool {
        !self.config.enabled || self.current_level >= self.threshold_level()
    }

    fn threshold_level(&self) -> f64 {
        self.config.min_threshold * self.config.max_level
    }

    pub fn current_level(&self) -> f64 {
        self.current_level
    }

    pub fn max_level(&self) -> f64 {
        self.config.max_level
    }

    /// Charge as a fraction of the maximum, 1.0 for disabled batteries
    pub fn fraction(&self) -> f64 {
        if !self.config.enabled || self.config.max_level <= 0.0 {
            1.0
        } else {
            self.current_level / self.config.max_level
        }
    }

    pub fn is_charging(&self) -> bool {
        self.charging
    }

    pub fn decrease_rate(&self) -> f64 {
        self.decrease_rate
    }

    /// Raise the drain for the current tick (transfer costs)
    pub fn increase_decrease_rate(&mut self, extra: f64) {
        if extra > 0.0 {
            self.decrease_rate += extra;
        }
    }

    pub fn reset_decrease_rate(&mut self) {
        self.decrease_rate = 1.0;
    }
}
