//! # Oppnet Simulation
//!
//! Trace-driven simulation of opportunistic networks on top of the
//! `oppnet-dtn` contact-exchange engine.
//!
//! ## Overview
//!
//! Nodes never share a link permanently. They meet pairwise, for a while,
//! according to a contact trace, and messages travel by being carried from
//! one meeting to the next. Key features:
//!
//! - **Contact traces**: loaded from JSON or generated with community
//!   structure, always replayed in start order
//! - **Scheduled workload**: seeded message generation, point-to-point or
//!   topic-based
//! - **Sample steps**: every node ticks once per step (battery, policy hooks)
//! - **Aggregate statistics**: delivery ratio, latency, hops, transfers and
//!   memory overflow
//!
//! ## Architecture
//!
//! - **Trace** (`trace.rs`): contacts, validation, JSON and synthetic traces
//! - **Simulation** (`simulation.rs`): the time-ordered scheduler
//! - **Scenarios** (`scenarios.rs`): pre-built scenarios
//! - **Error** (`error.rs`): loading and validation failures
//!
//! ## Example: Relay
//!
//! ```rust,ignore
//! use oppnet_simulation::*;
//!
//! let trace = Trace::new(3, 0, 1_000, vec![
//!     Contact::new(0, 1, 100, 60),
//!     Contact::new(1, 2, 500, 60),
//! ])?;
//! let mut sim = Simulation::new(trace, SimConfig {
//!     message_probability: 0.0, // manual workload
//!     ..Default::default()
//! })?;
//!
//! sim.send_message(NodeId(0), Destination::Node(NodeId(2)), Context::new());
//! let stats = sim.run();
//!
//! assert_eq!(stats.deliveries, 1);
//! ```

pub mod error;
pub mod scenarios;
pub mod simulation;
pub mod trace;

pub use error::{SimError, SimResult};
pub use simulation::{SimConfig, SimStats, Simulation};
pub use trace::{Contact, Trace};

// Re-export engine types used to drive a simulation
pub use oppnet_core::{Context, Destination, NodeId, Tick, Topic};
pub use oppnet_dtn::{NodeConfig, PolicyChoice};
