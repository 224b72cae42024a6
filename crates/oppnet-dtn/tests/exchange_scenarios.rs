//! Contact Exchange Scenario Tests
//!
//! End-to-end checks of the contact protocol between independently owned
//! nodes:
//! - Bounded memory and eviction bookkeeping
//! - Delivery latency, quota and duplicate handling
//! - History symmetry and community monotonicity
//! - Participation gates (battery, altruism, policy compatibility)
//! - Mixed community strategies and the pre-exchange hook

use std::any::Any;
use std::sync::{Arc, Mutex};

use oppnet_core::{
    Context, Destination, Message, MessageRef, NodeId, Payload, SimContext, Tick, Topic,
};
use oppnet_dtn::policies::{DirectDelivery, Epidemic};
use oppnet_dtn::{
    AltruismConfig, BatteryConfig, CommunityDetection, ContactMap, ContactOutcome, Delivery,
    ExchangePolicy, KCliqueConfig, NetworkConfig, Node, NodeConfig, NodeState, PolicyKind, Quota,
};

// ============================================================================
// Helper Functions
// ============================================================================

const NODES: usize = 6;

fn sim_context() -> Arc<SimContext> {
    Arc::new(SimContext::new(0, 200_000, 17))
}

fn open_config() -> NodeConfig {
    NodeConfig {
        network: NetworkConfig::unlimited(),
        battery: BatteryConfig::disabled(),
        ..Default::default()
    }
}

fn make_node(
    ctx: &Arc<SimContext>,
    id: u32,
    config: NodeConfig,
    policy: Box<dyn ExchangePolicy>,
) -> Node {
    Node::builder(NodeId(id), NODES)
        .with_config(config)
        .build(ctx.clone(), policy)
        .unwrap()
}

fn epidemic(ctx: &Arc<SimContext>, id: u32) -> Node {
    make_node(ctx, id, open_config(), Box::new(Epidemic::routing()))
}

fn routed(ctx: &SimContext, source: u32, dest: u32, timestamp: u64) -> MessageRef {
    Message::new(
        ctx,
        NodeId(source),
        Destination::Node(NodeId(dest)),
        timestamp,
        Payload::plain("hello"),
        Context::new(),
    )
}

fn tagged(ctx: &SimContext, source: u32, topic: u32) -> MessageRef {
    Message::new(
        ctx,
        NodeId(source),
        Destination::Dissemination,
        0,
        Payload::default(),
        Context::with_topics([Topic(topic)]),
    )
}

fn social_row(friends: &[u32]) -> Vec<bool> {
    let mut row = vec![false; NODES];
    for f in friends {
        row[*f as usize] = true;
    }
    row
}

// ============================================================================
// Bounded Memory
// ============================================================================

/// Inserting past capacity evicts the oldest message and zeroes its copies
#[test]
fn test_fifo_eviction_scenario() {
    let ctx = sim_context();
    let mut node = make_node(
        &ctx,
        0,
        NodeConfig {
            data_memory_size: 2,
            ..open_config()
        },
        Box::new(Epidemic::routing()),
    );
    let mut carrier = epidemic(&ctx, 1);

    let m1 = routed(&ctx, 1, 5, 0);
    let m2 = routed(&ctx, 1, 5, 0);
    let m3 = routed(&ctx, 1, 5, 0);
    m1.set_copies(NodeId(1), 3);

    for m in [&m1, &m2, &m3] {
        assert!(node.state_mut().insert_message(m, carrier.state_mut(), 10, false, false));
    }

    let ids: Vec<_> = node.state().data_memory().iter().map(|m| m.id()).collect();
    assert_eq!(ids, vec![m2.id(), m3.id()]);
    assert_eq!(m1.copies(NodeId(0)), 0);
    assert_eq!(m1.copies(NodeId(1)), 3);
    assert_eq!(node.state().data_memory_overflow(), 1);
}

/// Memory never exceeds its capacity across many contacts
#[test]
fn test_memory_bound_holds_under_flooding() {
    let ctx = sim_context();
    let small = NodeConfig {
        data_memory_size: 3,
        ..open_config()
    };
    let mut nodes: Vec<Node> = (0..NODES as u32)
        .map(|id| make_node(&ctx, id, small.clone(), Box::new(Epidemic::routing())))
        .collect();
    for (i, node) in nodes.iter_mut().enumerate() {
        for _ in 0..4 {
            node.generate_message(routed(&ctx, i as u32, ((i + 3) % NODES) as u32, 0));
        }
    }

    let mut tick = 0;
    for round in 0..5 {
        for i in 0..NODES {
            let j = (i + round + 1) % NODES;
            if i == j {
                continue;
            }
            tick += 100;
            let (a, b) = pair_mut(&mut nodes, i, j);
            a.exchange_data(b, 10, tick);
            assert!(a.state().data_memory_size() <= 3);
            assert!(b.state().data_memory_size() <= 3);
        }
    }
}

fn pair_mut(nodes: &mut [Node], i: usize, j: usize) -> (&mut Node, &mut Node) {
    if i < j {
        let (left, right) = nodes.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = nodes.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}

/// Re-inserting a held message is a no-op
#[test]
fn test_duplicate_insert_is_noop() {
    let ctx = sim_context();
    let mut node = epidemic(&ctx, 0);
    let mut carrier = epidemic(&ctx, 1);
    let msg = routed(&ctx, 1, 4, 0);

    assert!(node.state_mut().insert_message(&msg, carrier.state_mut(), 5, false, false));
    let received = node.state().received_history().len();

    assert!(!node.state_mut().insert_message(&msg, carrier.state_mut(), 6, false, false));
    assert_eq!(node.state().data_memory_size(), 1);
    assert_eq!(node.state().received_history().len(), received);
}

// ============================================================================
// Delivery
// ============================================================================

/// Latency is fixed by the first delivery
#[test]
fn test_latency_first_write_wins() {
    let ctx = sim_context();
    let mut dest = epidemic(&ctx, 0);
    let mut carrier = epidemic(&ctx, 1);
    let msg = routed(&ctx, 1, 0, 1_000);
    carrier.generate_message(msg.clone());

    dest.exchange_data(&mut carrier, 30, 1_250);
    assert_eq!(msg.latency(NodeId(0)), Some(250));
    assert_eq!(msg.hops(NodeId(0)), 1);

    msg.mark_as_delivered(NodeId(0), 9_000);
    assert_eq!(msg.latency(NodeId(0)), Some(250));
    assert_eq!(msg.hops(NodeId(0)), 2);
}

/// Direct delivery never exceeds floor(speed * duration) + 1 messages
#[test]
fn test_delivery_quota_respected() {
    let ctx = sim_context();
    let config = NodeConfig {
        network: NetworkConfig {
            transfer_speed: 0.1,
            unlimited: false,
        },
        battery: BatteryConfig::disabled(),
        ..Default::default()
    };
    let mut dest = make_node(&ctx, 0, config.clone(), Box::new(DirectDelivery::routing()));
    let mut carrier = make_node(&ctx, 1, config, Box::new(DirectDelivery::routing()));
    let messages: Vec<_> = (0..10).map(|_| routed(&ctx, 1, 0, 0)).collect();
    for m in &messages {
        carrier.generate_message(m.clone());
    }

    let result = dest
        .state_mut()
        .deliver_direct_messages(carrier.state_mut(), false, 20, 50, false);

    assert_eq!(result, Delivery::Remaining(Quota::Limited(0)));
    let delivered = messages.iter().filter(|m| m.is_delivered(NodeId(0))).count();
    assert_eq!(delivered, 3);
    assert_eq!(carrier.state().own_messages().len(), 7);
}

/// Unused quota is handed back to the caller
#[test]
fn test_delivery_returns_remaining_quota() {
    let ctx = sim_context();
    let config = NodeConfig {
        network: NetworkConfig {
            transfer_speed: 0.5,
            unlimited: false,
        },
        ..open_config()
    };
    let mut dest = make_node(&ctx, 0, config.clone(), Box::new(Epidemic::routing()));
    let mut carrier = make_node(&ctx, 1, config, Box::new(Epidemic::routing()));
    carrier.generate_message(routed(&ctx, 1, 0, 0));

    // floor(0.5 * 10) + 1 = 6, one used
    let result = dest
        .state_mut()
        .deliver_direct_messages(carrier.state_mut(), false, 10, 5, false);
    assert_eq!(result, Delivery::Remaining(Quota::Limited(5)));
}

/// Messages for the peer do not move when policies differ
#[test]
fn test_incompatible_peer_is_noop() {
    let ctx = sim_context();
    let mut a = epidemic(&ctx, 0);
    let mut b = make_node(&ctx, 1, open_config(), Box::new(DirectDelivery::routing()));
    let for_a = routed(&ctx, 1, 0, 0);
    let for_b = routed(&ctx, 0, 1, 0);
    b.generate_message(for_a.clone());
    a.generate_message(for_b.clone());

    assert_eq!(a.exchange_data(&mut b, 100, 10), ContactOutcome::Exchanged);

    assert!(!for_a.is_delivered(NodeId(0)));
    assert!(!for_b.is_delivered(NodeId(1)));
    assert_eq!(a.state().messages_exchanged(), 0);
    assert_eq!(a.state().contacts_number(NodeId(1)), 1);
}

// ============================================================================
// Dissemination
// ============================================================================

/// Shared-topic messages end up on both sides after one contact
#[test]
fn test_dissemination_shares_topic_messages() {
    let ctx = sim_context();
    let mut a = Node::builder(NodeId(0), NODES)
        .with_config(NodeConfig::unconstrained())
        .with_context(Context::with_topics([Topic(1), Topic(2)]))
        .build(ctx.clone(), Box::new(Epidemic::dissemination()))
        .unwrap();
    let mut b = Node::builder(NodeId(1), NODES)
        .with_config(NodeConfig::unconstrained())
        .with_context(Context::with_topics([Topic(1), Topic(3)]))
        .build(ctx.clone(), Box::new(Epidemic::dissemination()))
        .unwrap();

    let from_a = tagged(&ctx, 0, 1);
    let from_b = tagged(&ctx, 1, 1);
    a.generate_message(from_a.clone());
    b.generate_message(from_b.clone());

    a.exchange_data(&mut b, 600, 100);

    assert!(a.state().holds(from_b.id()));
    assert!(b.state().holds(from_a.id()));
    assert!(a.state().data_memory().contains(from_b.id()));
    assert!(b.state().data_memory().contains(from_a.id()));
    assert!(from_a.is_delivered(NodeId(1)));
    assert!(from_b.is_delivered(NodeId(0)));
}

/// Dissemination delivery leaves the message with the carrier
#[test]
fn test_dissemination_does_not_consume() {
    let ctx = sim_context();
    let mut carrier = Node::builder(NodeId(0), NODES)
        .with_config(open_config())
        .build(ctx.clone(), Box::new(DirectDelivery::dissemination()))
        .unwrap();
    let subscribers: Vec<Node> = (1..4)
        .map(|id| {
            Node::builder(NodeId(id), NODES)
                .with_config(open_config())
                .with_context(Context::with_topics([Topic(7)]))
                .build(ctx.clone(), Box::new(DirectDelivery::dissemination()))
                .unwrap()
        })
        .collect();
    let msg = tagged(&ctx, 0, 7);
    carrier.generate_message(msg.clone());

    for (i, mut sub) in subscribers.into_iter().enumerate() {
        sub.exchange_data(&mut carrier, 10, 100 * (i as u64 + 1));
    }

    assert_eq!(msg.stats().delivered_count(), 3);
    assert!(carrier.state().holds(msg.id()));
}

// ============================================================================
// Symmetry
// ============================================================================

/// Every transfer appears in the receiver's and the sender's logs
#[test]
fn test_exchange_history_symmetry() {
    let ctx = sim_context();
    let mut a = epidemic(&ctx, 0);
    let mut b = epidemic(&ctx, 1);
    for _ in 0..3 {
        a.generate_message(routed(&ctx, 0, 4, 0));
    }
    b.generate_message(routed(&ctx, 1, 0, 0));
    b.generate_message(routed(&ctx, 1, 5, 0));

    let tick = 777;
    a.exchange_data(&mut b, 60, tick);

    let received_by_a: Vec<_> = a
        .state()
        .received_history()
        .iter()
        .filter(|h| h.time() == tick && h.owner() == NodeId(0))
        .collect();
    assert_eq!(received_by_a.len(), 2);
    for entry in received_by_a {
        assert_eq!(entry.peer_seen(), NodeId(1));
        let mirrored = b.state().sent_history().iter().any(|h| {
            h.time() == tick
                && h.message().id() == entry.message().id()
                && h.peer_seen() == NodeId(0)
                && h.owner() == NodeId(1)
        });
        assert!(mirrored, "missing sent entry for {}", entry.message().id());
    }

    let sent_by_a = a
        .state()
        .sent_history()
        .iter()
        .filter(|h| h.time() == tick && h.owner() == NodeId(0))
        .count();
    assert_eq!(sent_by_a, 3);
}

/// Exchange logs are merged on contact and stay time-descending
#[test]
fn test_history_merged_between_peers() {
    let ctx = sim_context();
    let mut a = epidemic(&ctx, 0);
    let mut b = epidemic(&ctx, 1);
    let mut c = epidemic(&ctx, 2);
    a.generate_message(routed(&ctx, 0, 5, 0));

    a.exchange_data(&mut b, 10, 100);
    c.exchange_data(&mut b, 10, 200);

    // b's record of receiving from a reached c
    let log = c.state().received_history();
    assert!(log.iter().any(|h| h.owner() == NodeId(1) && h.time() == 100));
    assert!(log.iter().any(|h| h.owner() == NodeId(2) && h.time() == 200));
    let times: Vec<_> = log.iter().map(|h| h.time()).collect();
    assert!(times.windows(2).all(|w| w[0] >= w[1]));
}

// ============================================================================
// Centrality and Community
// ============================================================================

/// Three peers in one window, then a rollover
#[test]
fn test_centrality_window_scenario() {
    let ctx = sim_context();
    let mut hub = epidemic(&ctx, 0);
    let mut peers: Vec<Node> = (1..4).map(|id| epidemic(&ctx, id)).collect();

    for (i, peer) in peers.iter_mut().enumerate() {
        hub.exchange_data(peer, 10, 1_000 * (i as u64 + 1));
    }
    // repeated peer in the same window is not counted again
    hub.exchange_data(&mut peers[0], 10, 5_000);

    let values = hub.state().centrality_values(false);
    assert_eq!(values.current, 3.0);
    assert_eq!(values.cumulated, 3.0);

    hub.state_mut().update_centrality(21_600 + 10);
    let values = hub.state().centrality_values(false);
    assert_eq!(values.previous, 3.0);
    assert_eq!(values.current, 0.0);
    assert_eq!(hub.state().centrality(false), 3.0);
}

/// Community-scoped centrality counts members only
#[test]
fn test_local_centrality_counts_community_members() {
    let ctx = sim_context();
    let config = NodeConfig {
        community: KCliqueConfig {
            contact_threshold: 10,
            community_threshold: 2,
        },
        ..open_config()
    };
    let mut nodes: Vec<Node> = (0..3)
        .map(|id| make_node(&ctx, id, config.clone(), Box::new(Epidemic::routing())))
        .collect();

    // long enough for 1 to become familiar, too short for 2
    let (a, b) = pair_mut(&mut nodes, 0, 1);
    a.exchange_data(b, 100, 1_000);
    let (a, c) = pair_mut(&mut nodes, 0, 2);
    a.exchange_data(c, 5, 2_000);

    let hub = nodes[0].state();
    assert_eq!(
        hub.community().local_community(),
        vec![NodeId(0), NodeId(1)]
    );
    assert!(!hub.in_local_community(NodeId(2)));

    let local = hub.centrality_values(true);
    let global = hub.centrality_values(false);
    assert_eq!(local.current, 1.0);
    assert_eq!(hub.centrality(true), 1.0);
    assert_eq!(global.current, 2.0);
    assert_eq!(hub.centrality(false), 2.0);

    // maxima are tracked per scope
    assert_eq!(ctx.centrality_maxima(true).max_current(), 1.0);
    assert_eq!(ctx.centrality_maxima(false).max_current(), 2.0);
    assert_eq!(nodes[1].state().normalized_centrality(false).current, 0.5);
    assert_eq!(nodes[1].state().normalized_centrality(true).current, 1.0);

    // a non-member in the next window only rolls the local window over
    let (a, c) = pair_mut(&mut nodes, 0, 2);
    a.exchange_data(c, 5, 21_600 + 100);

    let hub = nodes[0].state();
    assert!(!hub.in_local_community(NodeId(2)));
    let local = hub.centrality_values(true);
    assert_eq!(local.current, 0.0);
    assert_eq!(local.previous, 1.0);
    assert_eq!(local.cumulated, 1.0);
    let global = hub.centrality_values(false);
    assert_eq!(global.current, 1.0);
    assert_eq!(global.previous, 2.0);
}

/// Local communities only ever grow
#[test]
fn test_community_monotonic_over_run() {
    let ctx = sim_context();
    let config = NodeConfig {
        community: KCliqueConfig {
            contact_threshold: 50,
            community_threshold: 3,
        },
        ..open_config()
    };
    let mut nodes: Vec<Node> = (0..NODES as u32)
        .map(|id| make_node(&ctx, id, config.clone(), Box::new(Epidemic::routing())))
        .collect();
    let mut previous: Vec<Vec<NodeId>> = nodes
        .iter()
        .map(|n| n.state().community().local_community())
        .collect();

    let mut tick = 0;
    for round in 0..8 {
        for i in 0..NODES {
            let j = (i * 2 + round + 1) % NODES;
            if i == j {
                continue;
            }
            tick += 200;
            let (a, b) = pair_mut(&mut nodes, i, j);
            a.exchange_data(b, 40, tick);

            for (k, node) in nodes.iter().enumerate() {
                let now = node.state().community().local_community();
                assert!(previous[k].iter().all(|id| now.contains(id)));
                assert!(now.contains(&node.id()));
                previous[k] = now;
            }
        }
    }

    assert!(previous.iter().any(|community| community.len() > 1));
}

// ============================================================================
// Participation Gates
// ============================================================================

/// Contacts inside the declared duration are processed once
#[test]
fn test_cool_down_per_pair() {
    let ctx = sim_context();
    let mut a = epidemic(&ctx, 0);
    let mut b = epidemic(&ctx, 1);
    let mut c = epidemic(&ctx, 2);

    assert_eq!(a.exchange_data(&mut b, 300, 1_000), ContactOutcome::Exchanged);
    assert_eq!(b.exchange_data(&mut a, 300, 1_200), ContactOutcome::Suppressed);
    // other pairs are independent
    assert_eq!(a.exchange_data(&mut c, 300, 1_200), ContactOutcome::Exchanged);
    assert_eq!(a.exchange_data(&mut b, 300, 1_300), ContactOutcome::Exchanged);

    assert_eq!(a.state().contacts_number(NodeId(1)), 2);
    assert_eq!(b.state().encounters(NodeId(0)), 2);
}

/// A drained battery blocks data exchange until it has recharged
#[test]
fn test_battery_gates_and_recovers() {
    let ctx = sim_context();
    let mut a = epidemic(&ctx, 0);
    let mut b = make_node(
        &ctx,
        1,
        NodeConfig {
            battery: BatteryConfig {
                enabled: true,
                max_level: 10.0,
                min_threshold: 0.5,
                recharge_duration: 5,
            },
            ..open_config()
        },
        Box::new(Epidemic::routing()),
    );
    let msg = routed(&ctx, 1, 0, 0);
    b.generate_message(msg.clone());

    for tick in 0..6 {
        b.on_tick(tick, 1);
    }
    assert!(!b.state().battery().can_participate());
    assert_eq!(a.exchange_data(&mut b, 1, 6), ContactOutcome::BatteryDepleted);
    assert!(!msg.is_delivered(NodeId(0)));

    for tick in 6..15 {
        b.on_tick(tick, 1);
    }
    assert!(b.state().battery().can_participate());
    assert_eq!(a.exchange_data(&mut b, 1, 100), ContactOutcome::Exchanged);
    assert!(msg.is_delivered(NodeId(0)));
}

/// Zero local altruism refuses every message from a friend
#[test]
fn test_altruism_gate_refuses_friends() {
    let ctx = sim_context();
    let stingy = NodeConfig {
        altruism: AltruismConfig {
            local: 0.0,
            global: 1.0,
            ..Default::default()
        },
        ..open_config()
    };
    let mut a = Node::builder(NodeId(0), NODES)
        .with_config(stingy)
        .with_social_network(social_row(&[1]))
        .build(ctx.clone(), Box::new(Epidemic::routing().with_altruism(true)))
        .unwrap();
    let mut b = make_node(
        &ctx,
        1,
        open_config(),
        Box::new(Epidemic::routing().with_altruism(true)),
    );
    for _ in 0..20 {
        b.generate_message(routed(&ctx, 1, 4, 0));
    }
    let for_a = routed(&ctx, 1, 0, 0);
    b.generate_message(for_a.clone());

    a.exchange_data(&mut b, 100, 10);

    assert_eq!(a.state().data_memory_size(), 0);
    assert!(!for_a.is_delivered(NodeId(0)));
    assert_eq!(b.state().own_messages().len(), 21);
}

/// Full local altruism accepts every message from a friend
#[test]
fn test_altruism_gate_accepts_friends() {
    let ctx = sim_context();
    let generous = NodeConfig {
        altruism: AltruismConfig {
            local: 1.0,
            global: 0.0,
            ..Default::default()
        },
        ..open_config()
    };
    let mut a = Node::builder(NodeId(0), NODES)
        .with_config(generous)
        .with_social_network(social_row(&[1]))
        .build(ctx.clone(), Box::new(Epidemic::routing().with_altruism(true)))
        .unwrap();
    let mut b = make_node(
        &ctx,
        1,
        open_config(),
        Box::new(Epidemic::routing().with_altruism(true)),
    );
    for _ in 0..20 {
        b.generate_message(routed(&ctx, 1, 4, 0));
    }

    a.exchange_data(&mut b, 100, 10);

    assert_eq!(a.state().data_memory_size(), 20);
}

// ============================================================================
// Community Strategies and Policy Hooks
// ============================================================================

/// Fixed community that only merges views of its own type
#[derive(Debug, Clone)]
struct StaticCommunity {
    members: Vec<NodeId>,
}

impl CommunityDetection for StaticCommunity {
    fn local_community(&self) -> Vec<NodeId> {
        self.members.clone()
    }

    fn in_local_community(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    fn on_update(&mut self, _peer: NodeId, _contacts: &ContactMap) {}

    fn on_contact(
        &mut self,
        _peer: NodeId,
        peer_view: &dyn CommunityDetection,
        _tick: Tick,
        _sample_time: Tick,
    ) {
        let Some(other) = peer_view.as_any().downcast_ref::<StaticCommunity>() else {
            return;
        };
        for id in &other.members {
            if !self.members.contains(id) {
                self.members.push(*id);
            }
        }
    }

    fn clone_box(&self) -> Box<dyn CommunityDetection> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// K-Clique and a foreign strategy ignore each other's views
#[test]
fn test_mixed_community_strategies() {
    let ctx = sim_context();
    let config = NodeConfig {
        community: KCliqueConfig {
            contact_threshold: 1_000,
            community_threshold: 2,
        },
        ..open_config()
    };
    let mut kclique = make_node(&ctx, 0, config.clone(), Box::new(Epidemic::routing()));
    let mut fixed = Node::builder(NodeId(1), NODES)
        .with_config(config)
        .with_community(Box::new(StaticCommunity {
            members: vec![NodeId(1), NodeId(3), NodeId(4)],
        }))
        .build(ctx.clone(), Box::new(Epidemic::routing()))
        .unwrap();
    assert_eq!(fixed.state().community().name(), "static");

    let msg = routed(&ctx, 1, 0, 0);
    fixed.generate_message(msg.clone());

    let outcome = kclique.exchange_data(&mut fixed, 60, 100);

    assert_eq!(outcome, ContactOutcome::Exchanged);
    assert_eq!(kclique.state().community().local_community(), vec![NodeId(0)]);
    assert_eq!(
        fixed.state().community().local_community(),
        vec![NodeId(1), NodeId(3), NodeId(4)]
    );
    assert!(fixed.state().in_local_community(NodeId(3)));
    assert!(!fixed.state().in_local_community(NodeId(0)));
    // the data exchange itself is unaffected
    assert!(msg.is_delivered(NodeId(0)));
}

/// Epidemic policy that logs its hooks
#[derive(Debug)]
struct RecordingPolicy {
    name: &'static str,
    inner: Epidemic,
    log: Arc<Mutex<Vec<String>>>,
}

impl RecordingPolicy {
    fn boxed(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Box<dyn ExchangePolicy> {
        Box::new(Self {
            name,
            inner: Epidemic::routing(),
            log: log.clone(),
        })
    }

    fn record(&self, event: &str) {
        self.log.lock().unwrap().push(format!("{} {}", event, self.name));
    }
}

impl ExchangePolicy for RecordingPolicy {
    fn kind(&self) -> PolicyKind {
        Epidemic::KIND
    }

    fn pre_exchange(&mut self, _node: &mut NodeState, _peer: &mut NodeState, _duration: Tick, _tick: Tick) {
        self.record("pre");
    }

    fn on_exchange(&mut self, node: &mut NodeState, peer: &mut NodeState, duration: Tick, tick: Tick) {
        self.record("exchange");
        self.inner.on_exchange(node, peer, duration, tick);
    }
}

/// The hook runs once, on the initiating side, before both exchanges
#[test]
fn test_pre_exchange_runs_once_on_initiator() {
    let ctx = sim_context();
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut a = make_node(&ctx, 0, open_config(), RecordingPolicy::boxed("a", &log));
    let mut b = make_node(&ctx, 1, open_config(), RecordingPolicy::boxed("b", &log));

    assert_eq!(a.exchange_data(&mut b, 10, 100), ContactOutcome::Exchanged);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["pre a", "exchange a", "exchange b"]
    );

    // suppressed contacts run no hooks
    log.lock().unwrap().clear();
    assert_eq!(b.exchange_data(&mut a, 10, 105), ContactOutcome::Suppressed);
    assert!(log.lock().unwrap().is_empty());

    assert_eq!(b.exchange_data(&mut a, 10, 200), ContactOutcome::Exchanged);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["pre b", "exchange b", "exchange a"]
    );
}
