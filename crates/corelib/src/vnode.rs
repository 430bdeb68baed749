//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Each real node is placed on the ring several times, once per replica
//! index. With only a handful of real nodes, a single position each would
//! carve the hash space into a few very uneven arcs; many positions per node
//! average those arcs out.
//!
//! 1. **Better Load Distribution**: More tokens = smoother distribution of keys
//! 2. **Gradual Rebalancing**: When nodes join/leave, only that node's arcs move
//!
//! # Placement Key
//!
//! Replica `i` of node `n` is placed at `hash(n || i)`: the node id directly
//! followed by the decimal replica index, with no separator. Two different
//! nodes can therefore produce the same placement key (`"A1"` replica `1` and
//! `"A"` replica `11` both hash `"A11"`). The ring resolves such collisions
//! by keeping the earlier placement; see [`HashRing::add_node`].
//!
//! # Performance Characteristics
//!
//! - **Memory**: O(v) where v = number of vnodes per node
//! - **Lookup**: O(log n) where n = total vnodes
//!
//! [`HashRing::add_node`]: crate::ring::HashRing::add_node

use crate::node::NodeId;
use crate::partitioner::Partitioner;
use crate::token::Token;

/// A virtual node on the hash ring.
///
/// Represents a single token position owned by a physical node.
///
/// # Example
///
/// ```rust
/// use corelib::partitioner::Xxh3Partitioner;
/// use corelib::{NodeId, VirtualNode};
///
/// let vnode = VirtualNode::from_index(&Xxh3Partitioner, &NodeId::from("A"), 0);
/// assert_eq!(vnode.node_id().as_str(), "A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode<T: Token> {
    /// Token position on the ring.
    pub token: T,

    /// The physical node that owns this virtual node.
    pub node_id: NodeId,
}

impl<T: Token> VirtualNode<T> {
    /// Create a new virtual node.
    #[inline]
    pub fn new(token: T, node_id: NodeId) -> Self {
        Self { token, node_id }
    }

    /// Create a virtual node from a node ID and vnode index.
    ///
    /// # Algorithm
    ///
    /// 1. Build the placement key `node_id || vnode_index`
    /// 2. Hash it with the ring's partitioner
    /// 3. Create VirtualNode with token and node_id
    pub fn from_index<P>(partitioner: &P, node_id: &NodeId, vnode_index: usize) -> Self
    where
        P: Partitioner<TokenType = T>,
    {
        let key = placement_key(node_id, vnode_index);
        Self::new(partitioner.partition(key.as_bytes()), node_id.clone())
    }

    /// Get the token position.
    #[inline]
    pub fn token(&self) -> &T {
        &self.token
    }

    /// Get the owning node ID.
    #[inline]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }
}

/// Byte string hashed to place replica `vnode_index` of `node_id`.
pub fn placement_key(node_id: &NodeId, vnode_index: usize) -> String {
    format!("{}{}", node_id, vnode_index)
}
