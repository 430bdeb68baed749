//! Hash ring data structure.
//!
//! Holds a `BTreeMap<Token, NodeId>` of virtual-node positions plus the
//! [`NodeTable`] of real nodes, both behind one `RwLock`. Membership changes
//! take the write lock and update both structures before releasing it, so a
//! concurrent [`HashRing::resolve`] sees either the old membership or the new
//! one, never a mix.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::partitioner::{Partitioner, Xxh3Partitioner};
use crate::ring::node_table::NodeTable;
use crate::token::Token;
use crate::vnode::VirtualNode;

/// Virtual nodes per real node when none is configured.
pub const DEFAULT_VNODES: usize = 256;

#[derive(Debug)]
struct RingState<T: Token> {
    positions: BTreeMap<T, NodeId>,
    nodes: NodeTable<T>,
}

impl<T: Token> RingState<T> {
    fn new() -> Self {
        Self {
            positions: BTreeMap::new(),
            nodes: NodeTable::new(),
        }
    }

    /// First position at or after `token`, wrapping to the lowest position.
    fn successor(&self, token: &T) -> Option<&NodeId> {
        self.positions
            .range(token..)
            .next()
            .or_else(|| self.positions.iter().next())
            .map(|(_, node_id)| node_id)
    }
}

/// Share of the hash space owned by one real node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeOwnership {
    pub node_id: NodeId,
    /// Virtual nodes actually placed for this node.
    pub vnodes: usize,
    /// Fraction of the token space whose keys resolve to this node.
    pub share: f64,
}

/// Consistent hash ring mapping keys to real nodes through virtual nodes.
///
/// The ring is internally synchronized and is meant to be shared behind an
/// `Arc`; every method takes `&self`.
///
/// # Example
///
/// ```rust
/// use corelib::HashRing;
///
/// let ring = HashRing::with_replicas(3).unwrap();
/// ring.add_node("A").unwrap();
/// ring.add_node("B").unwrap();
///
/// let owner = ring.resolve("key1").unwrap();
/// assert!(owner.as_str() == "A" || owner.as_str() == "B");
/// ```
#[derive(Debug)]
pub struct HashRing<P: Partitioner = Xxh3Partitioner> {
    partitioner: P,
    replicas: usize,
    state: RwLock<RingState<P::TokenType>>,
}

impl HashRing<Xxh3Partitioner> {
    /// Empty ring with [`DEFAULT_VNODES`] virtual nodes per node.
    pub fn new() -> Self {
        Self {
            partitioner: Xxh3Partitioner,
            replicas: DEFAULT_VNODES,
            state: RwLock::new(RingState::new()),
        }
    }

    /// Empty ring placing `replicas` virtual nodes per node.
    pub fn with_replicas(replicas: usize) -> Result<Self> {
        Self::with_partitioner(Xxh3Partitioner, replicas)
    }
}

impl Default for HashRing<Xxh3Partitioner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Partitioner> HashRing<P> {
    /// Empty ring hashing with `partitioner`.
    ///
    /// Fails if `replicas` is zero, since such a ring could never route a key.
    pub fn with_partitioner(partitioner: P, replicas: usize) -> Result<Self> {
        if replicas == 0 {
            return Err(Error::InvalidConfig(
                "replica count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            partitioner,
            replicas,
            state: RwLock::new(RingState::new()),
        })
    }

    /// Add a node, placing up to `replica_count()` virtual nodes for it.
    ///
    /// A replica whose token is already taken is dropped and the existing
    /// placement is kept, so keys already routed through that token do not
    /// move. Returns the number of virtual nodes actually placed.
    ///
    /// An empty node id is rejected with [`Error::InvalidConfig`].
    pub fn add_node(&self, node_id: impl Into<NodeId>) -> Result<usize> {
        let node_id = node_id.into();
        if node_id.as_str().is_empty() {
            return Err(Error::InvalidConfig("node id must not be empty".to_string()));
        }
        let mut state = self.state.write();

        if state.nodes.contains(node_id.as_str()) {
            return Err(Error::DuplicateNode(node_id));
        }

        let mut placed = Vec::with_capacity(self.replicas);
        for index in 0..self.replicas {
            let vnode = VirtualNode::from_index(&self.partitioner, &node_id, index);
            match state.positions.entry(vnode.token.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(node_id.clone());
                    placed.push(vnode.token);
                }
                Entry::Occupied(slot) => {
                    warn!(
                        node = %node_id,
                        replica = index,
                        owner = %slot.get(),
                        "virtual node collision, placement dropped"
                    );
                }
            }
        }

        let count = placed.len();
        state.nodes.add(node_id.clone(), placed)?;
        debug!(node = %node_id, vnodes = count, "added node to ring");
        Ok(count)
    }

    /// Remove a node and every virtual node it placed.
    pub fn remove_node(&self, node_id: impl AsRef<str>) -> Result<()> {
        let node_id = node_id.as_ref();
        let mut state = self.state.write();

        let tokens = state.nodes.remove(node_id)?;
        for token in &tokens {
            state.positions.remove(token);
        }

        debug!(node = %node_id, vnodes = tokens.len(), "removed node from ring");
        Ok(())
    }

    /// Resolve the node that owns `key`.
    ///
    /// The owner is the node holding the first virtual node at or after the
    /// key's token, wrapping around to the lowest token.
    pub fn resolve(&self, key: impl AsRef<[u8]>) -> Result<NodeId> {
        let token = self.partitioner.partition(key.as_ref());
        self.state
            .read()
            .successor(&token)
            .cloned()
            .ok_or(Error::EmptyRing)
    }

    /// Hash `input` onto the ring's token space.
    pub fn hash(&self, input: impl AsRef<[u8]>) -> P::TokenType {
        self.partitioner.partition(input.as_ref())
    }

    pub fn contains_node(&self, node_id: impl AsRef<str>) -> bool {
        self.state.read().nodes.contains(node_id.as_ref())
    }

    /// Registered nodes in ascending id order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.state.read().nodes.ids().cloned().collect()
    }

    /// Every virtual node position in ring order (for debugging).
    pub fn tokens(&self) -> Vec<(P::TokenType, NodeId)> {
        self.state
            .read()
            .positions
            .iter()
            .map(|(token, node_id)| (token.clone(), node_id.clone()))
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn token_count(&self) -> usize {
        self.state.read().positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().positions.is_empty()
    }

    pub fn replica_count(&self) -> usize {
        self.replicas
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }

    /// Fraction of the token space owned by each node, in id order.
    ///
    /// A position owns the arc running back to (but excluding) its
    /// predecessor. Shares sum to 1.0 on a non-empty ring.
    pub fn ownership(&self) -> Vec<NodeOwnership> {
        let state = self.state.read();
        let mut shares: BTreeMap<&NodeId, f64> = BTreeMap::new();

        if state.positions.len() == 1 {
            if let Some(node_id) = state.positions.values().next() {
                shares.insert(node_id, 1.0);
            }
        } else if let Some((last, _)) = state.positions.iter().next_back() {
            let mut prev = last;
            for (token, node_id) in &state.positions {
                *shares.entry(node_id).or_default() += prev.distance_to(token).ring_fraction();
                prev = token;
            }
        }

        state
            .nodes
            .ids()
            .map(|node_id| NodeOwnership {
                node_id: node_id.clone(),
                vnodes: state.nodes.tokens_of(node_id.as_str()).map_or(0, <[_]>::len),
                share: shares.get(node_id).copied().unwrap_or(0.0),
            })
            .collect()
    }
}

/// Builder for a pre-populated [`HashRing`].
#[derive(Debug)]
pub struct RingBuilder<P: Partitioner = Xxh3Partitioner> {
    partitioner: P,
    vnodes: usize,
    nodes: Vec<NodeId>,
}

impl RingBuilder<Xxh3Partitioner> {
    pub fn new() -> Self {
        Self {
            partitioner: Xxh3Partitioner,
            vnodes: DEFAULT_VNODES,
            nodes: Vec::new(),
        }
    }
}

impl Default for RingBuilder<Xxh3Partitioner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Partitioner> RingBuilder<P> {
    /// Virtual nodes per real node.
    pub fn with_vnodes(mut self, vnodes: usize) -> Self {
        self.vnodes = vnodes;
        self
    }

    /// Hash with a different partitioner.
    pub fn with_partitioner<Q: Partitioner>(self, partitioner: Q) -> RingBuilder<Q> {
        RingBuilder {
            partitioner,
            vnodes: self.vnodes,
            nodes: self.nodes,
        }
    }

    pub fn add_node(mut self, node_id: impl Into<NodeId>) -> Self {
        self.nodes.push(node_id.into());
        self
    }

    /// Build the ring, adding nodes in the order they were given.
    pub fn build(self) -> Result<HashRing<P>> {
        let ring = HashRing::with_partitioner(self.partitioner, self.vnodes)?;
        for node_id in self.nodes {
            ring.add_node(node_id)?;
        }
        Ok(ring)
    }
}
