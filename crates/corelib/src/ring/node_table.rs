//! Real-node membership for the hash ring.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::token::Token;

/// Set of live nodes, each with the ring tokens it actually holds.
///
/// Recording placed tokens (rather than recomputing them on removal) matters
/// when a replica was dropped by the collision policy: the colliding token
/// belongs to another node and must survive this node's removal.
///
/// `NodeTable` is not synchronized on its own; [`HashRing`](super::HashRing)
/// mutates it under the same write lock as the token positions.
#[derive(Debug, Clone)]
pub struct NodeTable<T: Token> {
    nodes: BTreeMap<NodeId, Vec<T>>,
}

impl<T: Token> NodeTable<T> {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Register a node together with the tokens placed for it.
    pub fn add(&mut self, node_id: NodeId, tokens: Vec<T>) -> Result<()> {
        if self.nodes.contains_key(&node_id) {
            return Err(Error::DuplicateNode(node_id));
        }
        self.nodes.insert(node_id, tokens);
        Ok(())
    }

    /// Unregister a node, handing back the tokens it held.
    pub fn remove(&mut self, node_id: &str) -> Result<Vec<T>> {
        self.nodes
            .remove(node_id)
            .ok_or_else(|| Error::UnknownNode(NodeId::from(node_id)))
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Tokens held by `node_id`, if it is a member.
    pub fn tokens_of(&self, node_id: &str) -> Option<&[T]> {
        self.nodes.get(node_id).map(Vec::as_slice)
    }

    /// Member ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<T: Token> Default for NodeTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
