//! Oppnet - opportunistic network simulator
//!
//! Replays a contact trace against a network of store-carry-forward nodes
//! and reports delivery statistics.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use oppnet_simulation::{PolicyChoice, SimConfig, Simulation, Trace, scenarios};

#[derive(Parser)]
#[command(
    name = "oppnet-sim",
    about = "Trace-driven opportunistic network simulation",
    version
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation over a JSON or synthetic trace
    Run {
        /// JSON trace to replay; a synthetic trace is generated otherwise
        #[arg(short, long)]
        trace: Option<PathBuf>,

        /// JSON simulation config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Nodes in the synthetic trace
        #[arg(short, long, default_value = "20")]
        nodes: usize,

        /// Community size in the synthetic trace
        #[arg(short, long, default_value = "5")]
        groups: usize,

        /// Contacts in the synthetic trace
        #[arg(long, default_value = "1000")]
        contacts: usize,

        /// Length of the synthetic trace in ticks
        #[arg(short, long, default_value = "86400")]
        duration: u64,

        /// RNG seed, overrides the config
        #[arg(short, long)]
        seed: Option<u64>,

        /// Forwarding policy, overrides the config
        #[arg(short, long, value_enum)]
        policy: Option<PolicyArg>,

        /// Copy budget for spray and wait
        #[arg(long, default_value = "4")]
        copies: u32,

        /// Disseminate by topic instead of routing to a destination
        #[arg(long)]
        dissemination: bool,

        /// Enable the altruism gate
        #[arg(long)]
        altruism: bool,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a pre-defined scenario
    Scenario {
        #[arg(value_enum)]
        name: ScenarioName,

        /// RNG seed for synthetic scenarios
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Epidemic,
    Direct,
    Spray,
}

#[derive(Clone, Copy, ValueEnum)]
enum ScenarioName {
    /// Multi-hop relay along a chain of meetings
    Relay,
    /// Binary spray and wait
    Spray,
    /// Topic dissemination through subscribers
    Dissemination,
    /// Unconstrained versus resource-constrained devices
    Constrained,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Run {
            trace,
            config,
            nodes,
            groups,
            contacts,
            duration,
            seed,
            policy,
            copies,
            dissemination,
            altruism,
            json,
        } => {
            let mut config = match config {
                Some(path) => SimConfig::load(path)?,
                None => SimConfig::default(),
            };
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(policy) = policy {
                config.policy = match policy {
                    PolicyArg::Epidemic => PolicyChoice::Epidemic,
                    PolicyArg::Direct => PolicyChoice::DirectDelivery,
                    PolicyArg::Spray => PolicyChoice::SprayAndWait { copies },
                };
            }
            config.dissemination |= dissemination;
            config.altruism |= altruism;

            let trace = match trace {
                Some(path) => Trace::load(path)?,
                None => Trace::synthetic(nodes, groups, contacts, duration, config.seed)?,
            };
            info!(
                nodes = trace.node_count(),
                contacts = trace.len(),
                start = trace.start(),
                end = trace.end(),
                "trace ready"
            );

            let stats = Simulation::new(trace, config)?.run();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Messages generated: {}", stats.messages_generated);
                println!(
                    "Deliveries: {}/{} ({:.1}%)",
                    stats.deliveries,
                    stats.deliveries_expected,
                    stats.delivery_ratio * 100.0
                );
                println!("Mean latency: {:.1} ticks", stats.mean_latency);
                println!("Mean hops: {:.2}", stats.mean_hops);
                println!("Transfers: {}", stats.transfers);
                println!("Memory overflow: {}", stats.memory_overflow);
                println!(
                    "Contacts: {} exchanged, {} suppressed, {} battery depleted",
                    stats.contacts_exchanged,
                    stats.contacts_suppressed,
                    stats.contacts_battery_depleted
                );
            }
        }
        Commands::Scenario { name, seed } => match name {
            ScenarioName::Relay => {
                scenarios::run_relay_scenario()?;
            }
            ScenarioName::Spray => {
                scenarios::run_spray_scenario()?;
            }
            ScenarioName::Dissemination => {
                scenarios::run_dissemination_scenario()?;
            }
            ScenarioName::Constrained => {
                scenarios::run_constrained_scenario(seed)?;
            }
        },
    }

    Ok(())
}
