//! # oppnet Core
//!
//! Shared vocabulary for the opportunistic network simulator.
//!
//! Nodes meet pairwise according to a contact trace and exchange messages
//! through a pluggable forwarding policy. This crate holds what every node
//! shares with every other node:
//!
//! - [`NodeId`], [`MessageId`] and the simulated clock unit [`Tick`]
//! - [`Context`]: a node's (or message's) interest topics
//! - [`Message`] / [`MessageStats`]: a message instance shared by reference
//!   between every node that carries it, with per-node bookkeeping
//! - [`SimContext`]: process-wide state (message id counter, trace bounds,
//!   centrality normalization maxima)
//!
//! The per-node contact engine lives in `oppnet-dtn`.

pub mod context;
pub mod error;
pub mod message;
pub mod sim_context;
pub mod types;

pub use context::{Context, Topic};
pub use error::{CoreError, CoreResult};
pub use message::{Destination, Message, MessageRef, MessageStats, Payload, sort_by_utility};
pub use sim_context::{CentralityMaxima, SimContext, TraceBounds};
pub use types::{MessageId, NodeId, Tick};
