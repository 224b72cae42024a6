//! Pre-defined simulation scenarios
//!
//! Small hand-written traces that show one engine behavior each, plus a
//! synthetic comparison of constrained and unconstrained devices.

use tracing::info;

use oppnet_core::{Context, Destination, NodeId, Topic};
use oppnet_dtn::{NodeConfig, PolicyChoice};

use crate::error::SimResult;
use crate::simulation::{SimConfig, SimStats, Simulation};
use crate::trace::{Contact, Trace};

/// Config with no scheduled generation and no resource limits
fn manual_config(policy: PolicyChoice) -> SimConfig {
    SimConfig {
        sample_time: 10,
        policy,
        message_probability: 0.0,
        node: NodeConfig::unconstrained(),
        ..Default::default()
    }
}

fn print_stats(stats: &SimStats) {
    println!("  Messages generated: {}", stats.messages_generated);
    println!(
        "  Deliveries: {}/{} ({:.1}%)",
        stats.deliveries,
        stats.deliveries_expected,
        stats.delivery_ratio * 100.0
    );
    println!("  Mean latency: {:.1} ticks", stats.mean_latency);
    println!("  Mean hops: {:.2}", stats.mean_hops);
    println!("  Transfers: {}", stats.transfers);
    println!("  Memory overflow: {}", stats.memory_overflow);
}

/// Scenario: Multi-hop relay along a chain of meetings
///
/// ```text
/// 0 meets 1, then 1 meets 2, 2 meets 3, 3 meets 4
/// ```
///
/// A message from 0 to 4 is carried hop by hop under epidemic routing.
pub fn run_relay_scenario() -> SimResult<Simulation> {
    info!("=== Running Relay Scenario ===");

    let contacts = (0..4)
        .map(|i| Contact::new(i, i + 1, 100 * (u64::from(i) + 1), 60))
        .collect();
    let trace = Trace::new(5, 0, 500, contacts)?;
    let mut sim = Simulation::new(trace, manual_config(PolicyChoice::Epidemic))?;

    println!("\n--- 0 sends to 4 (they never meet) ---");
    sim.send_message(NodeId(0), Destination::Node(NodeId(4)), Context::new());

    while sim.step() {
        if sim.tick() % 100 == 0 {
            println!("  {}", sim.state_summary());
        }
    }

    println!("\n=== Final Statistics ===");
    print_stats(&sim.stats());
    Ok(sim)
}

/// Scenario: Binary spray and wait with four copies
///
/// ```text
/// 0 meets 1: 0 keeps 2 copies, 1 gets 2
/// 0 meets 2: 0 keeps 1 copy, 2 gets 1
/// 0 meets 3: 0 is waiting, nothing sprayed
/// 2 meets 4: 2 is waiting, nothing sprayed
/// 1 meets 5: delivered
/// ```
pub fn run_spray_scenario() -> SimResult<Simulation> {
    info!("=== Running Spray and Wait Scenario ===");

    let trace = Trace::new(
        6,
        0,
        200,
        vec![
            Contact::new(0, 1, 10, 30),
            Contact::new(0, 2, 20, 30),
            Contact::new(0, 3, 30, 30),
            Contact::new(2, 4, 40, 30),
            Contact::new(1, 5, 100, 30),
        ],
    )?;
    let mut sim = Simulation::new(
        trace,
        manual_config(PolicyChoice::SprayAndWait { copies: 4 }),
    )?;

    println!("\n--- 0 sends to 5 with 4 copies ---");
    sim.send_message(NodeId(0), Destination::Node(NodeId(5)), Context::new());
    sim.run();

    for node in sim.nodes() {
        println!(
            "  node {}: carries {} message(s)",
            node.id(),
            node.state().carried_messages().len()
        );
    }

    println!("\n=== Final Statistics ===");
    print_stats(&sim.stats());
    Ok(sim)
}

/// Scenario: Topic dissemination through subscribers
///
/// Every node subscribes to topic 0. Node 0 publishes once; subscribers
/// pass the message along to the subscribers they meet later.
pub fn run_dissemination_scenario() -> SimResult<Simulation> {
    info!("=== Running Dissemination Scenario ===");

    let trace = Trace::new(
        4,
        0,
        300,
        vec![
            Contact::new(0, 1, 50, 30),
            Contact::new(0, 2, 100, 30),
            Contact::new(2, 3, 200, 30),
        ],
    )?;
    let config = SimConfig {
        dissemination: true,
        topics: 1,
        interests_per_node: 1,
        ..manual_config(PolicyChoice::Epidemic)
    };
    let mut sim = Simulation::new(trace, config)?;

    println!("\n--- 0 publishes on topic 0 ---");
    sim.send_message(
        NodeId(0),
        Destination::Dissemination,
        Context::with_topics([Topic(0)]),
    );
    sim.run();

    println!("\n=== Final Statistics ===");
    print_stats(&sim.stats());
    Ok(sim)
}

/// Scenario: The same synthetic day on unconstrained and constrained devices
///
/// Returns the statistics of both runs, unconstrained first.
pub fn run_constrained_scenario(seed: u64) -> SimResult<(SimStats, SimStats)> {
    info!(seed, "=== Running Constrained Devices Scenario ===");

    let trace = Trace::synthetic(20, 5, 600, 86_400, seed)?;
    let mut runs = Vec::with_capacity(2);
    for (label, node) in [
        ("unconstrained", NodeConfig::unconstrained()),
        ("resource constrained", NodeConfig::resource_constrained()),
    ] {
        let config = SimConfig {
            seed,
            node,
            ..Default::default()
        };
        let stats = Simulation::new(trace.clone(), config)?.run();
        println!("\n=== {} ===", label);
        print_stats(&stats);
        runs.push(stats);
    }

    let constrained = runs.pop().unwrap_or_default();
    let unconstrained = runs.pop().unwrap_or_default();
    Ok((unconstrained, constrained))
}
