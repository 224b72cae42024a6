//! Contact-exchange engine benchmarks
//!
//! Benchmarks for the hot paths of a contact:
//! - Message insertion with eviction
//! - Direct delivery under a quota
//! - Full epidemic contacts
//! - K-Clique view merging
//!
//! Run with: cargo bench -p oppnet-dtn

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use oppnet_core::{Context, Destination, Message, MessageRef, NodeId, Payload, SimContext};
use oppnet_dtn::policies::Epidemic;
use oppnet_dtn::{
    BatteryConfig, CommunityDetection, ContactInfo, ContactMap, KClique, KCliqueConfig,
    NetworkConfig, Node, NodeConfig,
};

// ============================================================================
// Helper Functions
// ============================================================================

const NODES: usize = 64;

fn make_node(ctx: &Arc<SimContext>, id: u32, config: NodeConfig) -> Node {
    Node::builder(NodeId(id), NODES)
        .with_config(config)
        .build(ctx.clone(), Box::new(Epidemic::routing()))
        .unwrap()
}

fn make_message(ctx: &SimContext, source: u32, dest: u32) -> MessageRef {
    Message::new(
        ctx,
        NodeId(source),
        Destination::Node(NodeId(dest)),
        0,
        Payload::plain(vec![0u8; 100]),
        Context::new(),
    )
}

fn open_config(memory: usize) -> NodeConfig {
    NodeConfig {
        data_memory_size: memory,
        network: NetworkConfig::unlimited(),
        battery: BatteryConfig::disabled(),
        ..Default::default()
    }
}

// ============================================================================
// Memory Benchmarks
// ============================================================================

fn bench_insert_message(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_message");
    let ctx = Arc::new(SimContext::new(0, 1_000_000, 1));

    group.bench_function("insert_with_eviction_100", |b| {
        let mut node = make_node(&ctx, 0, open_config(100));
        let mut carrier = make_node(&ctx, 1, open_config(100));
        let mut tick = 0u64;
        b.iter(|| {
            tick += 1;
            let msg = make_message(&ctx, 1, 2);
            node.state_mut()
                .insert_message(black_box(&msg), carrier.state_mut(), tick, false, false)
        })
    });

    group.finish();
}

// ============================================================================
// Contact Benchmarks
// ============================================================================

fn bench_direct_delivery(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_delivery");
    let ctx = Arc::new(SimContext::new(0, 1_000_000, 2));

    group.bench_function("deliver_from_500_carried", |b| {
        b.iter_with_setup(
            || {
                let node = make_node(&ctx, 0, open_config(1_000));
                let mut carrier = make_node(&ctx, 1, open_config(1_000));
                for i in 0..500 {
                    carrier.generate_message(make_message(&ctx, 1, i % 4));
                }
                (node, carrier)
            },
            |(mut node, mut carrier)| {
                node.state_mut().deliver_direct_messages(
                    carrier.state_mut(),
                    false,
                    black_box(300),
                    10,
                    false,
                )
            },
        )
    });

    group.finish();
}

fn bench_epidemic_contact(c: &mut Criterion) {
    let mut group = c.benchmark_group("epidemic_contact");
    let ctx = Arc::new(SimContext::new(0, 1_000_000, 3));

    group.bench_function("exchange_100_messages_each", |b| {
        b.iter_with_setup(
            || {
                let mut a = make_node(&ctx, 0, open_config(500));
                let mut z = make_node(&ctx, 1, open_config(500));
                for i in 0..100 {
                    a.generate_message(make_message(&ctx, 0, 2 + i % 10));
                    z.generate_message(make_message(&ctx, 1, 2 + i % 10));
                }
                (a, z)
            },
            |(mut a, mut z)| a.exchange_data(&mut z, black_box(600), 1_000),
        )
    });

    group.finish();
}

// ============================================================================
// Community Benchmarks
// ============================================================================

fn bench_kclique(c: &mut Criterion) {
    let mut group = c.benchmark_group("kclique");
    let config = KCliqueConfig {
        contact_threshold: 10,
        community_threshold: 3,
    };

    let mut peer = KClique::new(NodeId(1), NODES, config.clone());
    for id in 2..20 {
        let mut info = ContactInfo::new(0);
        info.record_contact(100, 0);
        let contacts = ContactMap::from([(NodeId(id), info)]);
        peer.on_update(NodeId(id), &contacts);
    }

    group.bench_function("on_contact_64_nodes", |b| {
        let mut node = KClique::new(NodeId(0), NODES, config.clone());
        b.iter(|| node.on_contact(NodeId(1), black_box(&peer), 0, 1))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_message,
    bench_direct_delivery,
    bench_epidemic_contact,
    bench_kclique,
);
criterion_main!(benches);
