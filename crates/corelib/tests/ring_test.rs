//! Integration tests for the hash ring.
//!
//! # Test Strategy
//!
//! 1. **Basic functionality**: Empty ring, add/lookup, remove
//! 2. **Multiple nodes**: Distribution, consistency, minimal disruption
//! 3. **Edge cases**: Wraparound, single node, duplicate ids, collisions
//! 4. **Thread safety**: Resolves racing membership changes

use std::collections::HashMap;

use corelib::partitioner::SipPartitioner;
use corelib::ring::{HashRing, RingBuilder};
use corelib::{Error, NodeId};

fn keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("key{}", i)).collect()
}

fn assignments(ring: &HashRing, keys: &[String]) -> HashMap<String, NodeId> {
    keys.iter()
        .map(|key| (key.clone(), ring.resolve(key).unwrap()))
        .collect()
}

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_ring_lookup() {
    let ring = HashRing::new();
    assert_eq!(ring.resolve("key1"), Err(Error::EmptyRing));
    assert_eq!(ring.node_count(), 0);
    assert_eq!(ring.token_count(), 0);
    assert!(ring.is_empty());
}

#[test]
fn test_add_node_and_lookup() {
    let ring = HashRing::with_replicas(4).unwrap();

    assert_eq!(ring.add_node("node1").unwrap(), 4);

    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.token_count(), 4);
    assert!(ring.contains_node("node1"));
    assert_eq!(ring.resolve("test-key").unwrap(), NodeId::from("node1"));
}

#[test]
fn test_duplicate_add_rejected() {
    let ring = HashRing::with_replicas(4).unwrap();
    ring.add_node("node1").unwrap();

    assert_eq!(
        ring.add_node("node1"),
        Err(Error::DuplicateNode(NodeId::from("node1")))
    );
    // Nothing was placed twice.
    assert_eq!(ring.token_count(), 4);
    assert_eq!(ring.node_count(), 1);
}

#[test]
fn test_empty_node_id_rejected() {
    let ring = HashRing::with_replicas(4).unwrap();

    assert!(matches!(ring.add_node(""), Err(Error::InvalidConfig(_))));
    assert!(ring.is_empty());
    assert!(matches!(
        RingBuilder::new().add_node("A").add_node("").add_node("B").build(),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn test_remove_node() {
    let ring = HashRing::with_replicas(4).unwrap();
    ring.add_node("node1").unwrap();
    ring.add_node("node2").unwrap();
    assert_eq!(ring.token_count(), 8);

    ring.remove_node("node1").unwrap();

    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.token_count(), 4);
    assert!(!ring.contains_node("node1"));
    assert_eq!(ring.resolve("some-key").unwrap(), NodeId::from("node2"));

    assert_eq!(
        ring.remove_node("node999"),
        Err(Error::UnknownNode(NodeId::from("node999")))
    );
}

#[test]
fn test_remove_last_node_empties_ring() {
    let ring = HashRing::with_replicas(3).unwrap();
    ring.add_node("A").unwrap();
    ring.remove_node("A").unwrap();

    assert!(ring.is_empty());
    assert_eq!(ring.resolve("key1"), Err(Error::EmptyRing));
}

// ============================================================================
// Multiple Nodes Tests
// ============================================================================

#[test]
fn test_two_node_ring_is_deterministic() {
    let ring = HashRing::with_replicas(3).unwrap();
    ring.add_node("A").unwrap();
    ring.add_node("B").unwrap();

    let first = ring.resolve("key1").unwrap();
    assert!(first == NodeId::from("A") || first == NodeId::from("B"));
    for _ in 0..10 {
        assert_eq!(ring.resolve("key1").unwrap(), first);
    }
}

#[test]
fn test_identical_rings_agree() {
    let left = RingBuilder::new().with_vnodes(16).add_node("A").add_node("B").build().unwrap();
    let right = RingBuilder::new().with_vnodes(16).add_node("B").add_node("A").build().unwrap();

    let keys = keys(500);
    assert_eq!(assignments(&left, &keys), assignments(&right, &keys));
}

#[test]
fn test_every_node_gets_keys() {
    let ring = RingBuilder::new()
        .with_vnodes(64)
        .add_node("A")
        .add_node("B")
        .add_node("C")
        .build()
        .unwrap();

    let mut counts: HashMap<NodeId, usize> = HashMap::new();
    for key in keys(3000) {
        *counts.entry(ring.resolve(&key).unwrap()).or_default() += 1;
    }

    assert_eq!(counts.len(), 3);
    for (node, count) in counts {
        assert!(count > 500, "{} only owns {} of 3000 keys", node, count);
    }
}

#[test]
fn test_add_only_moves_keys_to_new_node() {
    let ring = RingBuilder::new().with_vnodes(32).add_node("A").add_node("B").build().unwrap();
    let keys = keys(2000);
    let before = assignments(&ring, &keys);

    ring.add_node("C").unwrap();
    let after = assignments(&ring, &keys);

    let mut moved = 0;
    for key in &keys {
        if before[key] != after[key] {
            assert_eq!(after[key], NodeId::from("C"), "{} moved between old nodes", key);
            moved += 1;
        }
    }
    assert!(moved > 0, "new node should take over some keys");
}

#[test]
fn test_add_then_remove_redistributes_only_removed_keys() {
    let ring = RingBuilder::new().with_vnodes(3).add_node("A").add_node("B").build().unwrap();
    ring.add_node("C").unwrap();

    let keys = keys(1000);
    let before = assignments(&ring, &keys);

    ring.remove_node("A").unwrap();
    let after = assignments(&ring, &keys);

    for key in &keys {
        match before[key].as_str() {
            "A" => assert!(after[key] == NodeId::from("B") || after[key] == NodeId::from("C")),
            _ => assert_eq!(after[key], before[key], "{} should not move", key),
        }
    }
}

#[test]
fn test_removed_node_never_resolved() {
    let ring = RingBuilder::new()
        .with_vnodes(8)
        .add_node("A")
        .add_node("B")
        .add_node("C")
        .build()
        .unwrap();
    ring.remove_node("B").unwrap();

    for key in keys(1000) {
        assert_ne!(ring.resolve(&key).unwrap(), NodeId::from("B"));
    }
}

#[test]
fn test_add_remove_add_restores_routing() {
    let ring = RingBuilder::new().with_vnodes(8).add_node("A").add_node("B").build().unwrap();
    let keys = keys(500);
    let before = assignments(&ring, &keys);

    ring.remove_node("A").unwrap();
    ring.add_node("A").unwrap();

    assert_eq!(assignments(&ring, &keys), before);
}

// ============================================================================
// Ring Builder Tests
// ============================================================================

#[test]
fn test_ring_builder_default() {
    let ring = RingBuilder::new().add_node("node1").add_node("node2").build().unwrap();

    assert!(ring.resolve("key").is_ok());
    assert_eq!(ring.node_count(), 2);
    assert_eq!(ring.replica_count(), 256);
    assert_eq!(ring.token_count(), 512);
}

#[test]
fn test_ring_builder_duplicate_fails() {
    let result = RingBuilder::new().with_vnodes(2).add_node("A").add_node("A").build();
    assert_eq!(result.err(), Some(Error::DuplicateNode(NodeId::from("A"))));
}

#[test]
fn test_ring_builder_custom_partitioner() {
    let ring = RingBuilder::new()
        .with_vnodes(8)
        .with_partitioner(SipPartitioner)
        .add_node("A")
        .add_node("B")
        .build()
        .unwrap();

    assert_eq!(ring.partitioner_name(), "SipPartitioner");
    assert_eq!(ring.token_count(), 16);
    let owner = ring.resolve("key1").unwrap();
    assert_eq!(ring.resolve("key1").unwrap(), owner);
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_single_node() {
    let ring = HashRing::with_replicas(4).unwrap();
    ring.add_node("node1").unwrap();

    for key in ["key1", "key2", "key3", "very-long-key-name", ""] {
        assert_eq!(ring.resolve(key).unwrap(), NodeId::from("node1"));
    }
}

#[test]
fn test_wraparound_resolves_to_lowest_token() {
    let ring = HashRing::with_replicas(4).unwrap();
    ring.add_node("A").unwrap();
    ring.add_node("B").unwrap();

    let tokens = ring.tokens();
    let (highest, _) = tokens.last().unwrap();
    let (_, lowest_owner) = tokens.first().unwrap();

    // Find a key hashing past the last position.
    let key = (0..100_000)
        .map(|i| format!("sample{}", i))
        .find(|key| ring.hash(key) > *highest)
        .expect("some sample key lands past the highest token");

    assert_eq!(&ring.resolve(&key).unwrap(), lowest_owner);
}

#[test]
fn test_colliding_placement_is_dropped() {
    // "A1" replicas 0 and 1 hash "A10" and "A11", which "A" already placed
    // as its replicas 10 and 11.
    let ring = HashRing::with_replicas(12).unwrap();
    assert_eq!(ring.add_node("A").unwrap(), 12);
    let owner_before = ring.resolve("some-key").unwrap();
    let tokens_before = ring.tokens();

    assert_eq!(ring.add_node("A1").unwrap(), 10);
    assert_eq!(ring.token_count(), 22);

    // The shared token still belongs to "A".
    let shared = ring.hash("A11");
    let owner = ring.tokens().into_iter().find(|(t, _)| *t == shared).map(|(_, n)| n);
    assert_eq!(owner, Some(NodeId::from("A")));

    // Removing "A1" leaves "A" fully placed.
    ring.remove_node("A1").unwrap();
    assert_eq!(ring.tokens(), tokens_before);
    assert_eq!(ring.resolve("some-key").unwrap(), owner_before);
}

// ============================================================================
// Utility Tests
// ============================================================================

#[test]
fn test_get_all_nodes() {
    let ring = HashRing::with_replicas(4).unwrap();
    ring.add_node("node2").unwrap();
    ring.add_node("node1").unwrap();

    assert_eq!(ring.nodes(), vec![NodeId::from("node1"), NodeId::from("node2")]);
}

#[test]
fn test_tokens_are_sorted_and_owned() {
    let ring = HashRing::with_replicas(4).unwrap();
    ring.add_node("node1").unwrap();

    let tokens = ring.tokens();
    assert_eq!(tokens.len(), 4);
    assert!(tokens.windows(2).all(|w| w[0].0 < w[1].0));
    for (_, node_id) in tokens {
        assert_eq!(node_id, NodeId::from("node1"));
    }
}

#[test]
fn test_ownership_shares_sum_to_one() {
    let ring = RingBuilder::new()
        .with_vnodes(64)
        .add_node("A")
        .add_node("B")
        .add_node("C")
        .build()
        .unwrap();

    let ownership = ring.ownership();
    assert_eq!(ownership.len(), 3);
    let total: f64 = ownership.iter().map(|o| o.share).sum();
    assert!((total - 1.0).abs() < 1e-6, "total share {}", total);
    for entry in ownership {
        assert_eq!(entry.vnodes, 64);
        assert!(entry.share > 0.1, "{} owns {}", entry.node_id, entry.share);
    }
}

#[test]
fn test_ownership_single_position() {
    let ring = HashRing::with_replicas(1).unwrap();
    ring.add_node("A").unwrap();

    let ownership = ring.ownership();
    assert_eq!(ownership[0].share, 1.0);
}

#[test]
fn test_partitioner_name() {
    let ring = HashRing::new();
    assert_eq!(ring.partitioner_name(), "Xxh3Partitioner");
}

// ============================================================================
// Thread Safety
// ============================================================================

#[test]
fn test_concurrent_resolve_during_membership_changes() {
    let ring = HashRing::with_replicas(16).unwrap();
    ring.add_node("stable").unwrap();

    crossbeam::scope(|s| {
        s.spawn(|_| {
            for round in 0..200 {
                let id = format!("churn{}", round % 4);
                if ring.contains_node(&id) {
                    ring.remove_node(&id).unwrap();
                } else {
                    ring.add_node(id).unwrap();
                }
            }
        });

        for reader in 0..4 {
            let ring = &ring;
            s.spawn(move |_| {
                for i in 0..2000 {
                    let node = ring.resolve(format!("r{}-k{}", reader, i)).unwrap();
                    assert!(node.as_str() == "stable" || node.as_str().starts_with("churn"));
                }
            });
        }
    })
    .unwrap();

    // Every registered node holds exactly its full set of positions.
    assert_eq!(ring.token_count(), ring.node_count() * 16);
}
