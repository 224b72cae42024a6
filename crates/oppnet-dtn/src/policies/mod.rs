//! Reference forwarding policies
//!
//! Small strategies built only from the public engine primitives. They
//! exercise the contact protocol end to end and serve as templates for
//! richer social-aware policies.

mod direct;
mod epidemic;
mod spray_and_wait;

pub use direct::DirectDelivery;
pub use epidemic::Epidemic;
pub use spray_and_wait::SprayAndWait;

use serde::{Deserialize, Serialize};

use crate::policy::ExchangePolicy;

/// Policy selection, as found in simulation configs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolicyChoice {
    /// Flood every message to every peer met
    #[default]
    Epidemic,

    /// Hand messages over only to their destination
    DirectDelivery,

    /// Binary spray with a limited copy budget, then wait
    ///
    /// Routing only; the dissemination flag is ignored.
    SprayAndWait { copies: u32 },
}

impl PolicyChoice {
    /// Instantiate the policy for one node
    pub fn build(&self, dissemination: bool, altruism: bool) -> Box<dyn ExchangePolicy> {
        match *self {
            PolicyChoice::Epidemic => Box::new(Epidemic::new(dissemination, altruism)),
            PolicyChoice::DirectDelivery => {
                Box::new(DirectDelivery::new(dissemination, altruism))
            }
            PolicyChoice::SprayAndWait { copies } => {
                Box::new(SprayAndWait::new(copies).with_altruism(altruism))
            }
        }
    }

    /// Initial copy budget of generated messages
    pub fn initial_copies(&self) -> u32 {
        match self {
            PolicyChoice::SprayAndWait { copies } => *copies,
            _ => 1,
        }
    }
}
