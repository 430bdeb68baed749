//! RequestRouter: dispatches requests to the node that owns each key.

use std::collections::HashMap;
use std::sync::Arc;

use cachestore::StatsSnapshot;
use corelib::{Error, HashRing, NodeId, NodeOwnership, Result};
use metrics::counter;
use parking_lot::RwLock;
use tracing::{debug, error, info};

use crate::node::CacheNode;
use crate::protocol::{Request, Response};

/// Routes each request to the cache node that owns its key.
///
/// Membership lives in two places: the ring's positions and the map of node
/// handles. Both are changed while holding the `backends` write lock, and
/// routing holds the read lock across the ring lookup and the handle lookup,
/// so a request never resolves to a node whose handle is missing. The lock is
/// released before the node itself is called.
///
/// Lock order is `backends` then the ring's internal lock.
pub struct RequestRouter {
    ring: HashRing,
    backends: RwLock<HashMap<NodeId, Arc<dyn CacheNode>>>,
}

impl RequestRouter {
    /// Router with no nodes, placing `replicas` virtual nodes per node.
    pub fn new(replicas: usize) -> Result<Self> {
        Ok(Self {
            ring: HashRing::with_replicas(replicas)?,
            backends: RwLock::new(HashMap::new()),
        })
    }

    /// Register a node and the handle used to reach it.
    ///
    /// Returns the number of virtual nodes placed on the ring.
    pub fn add_node(&self, node_id: impl Into<NodeId>, node: Arc<dyn CacheNode>) -> Result<usize> {
        let node_id = node_id.into();
        let mut backends = self.backends.write();

        let placed = self.ring.add_node(node_id.clone())?;
        backends.insert(node_id.clone(), node);

        info!(node = %node_id, vnodes = placed, "node joined");
        Ok(placed)
    }

    /// Unregister a node, handing back its handle.
    ///
    /// Keys the node owned resolve to their new successors from the moment
    /// this returns. Entries stored on the removed node are not migrated.
    pub fn remove_node(&self, node_id: impl AsRef<str>) -> Result<Arc<dyn CacheNode>> {
        let node_id = node_id.as_ref();
        let mut backends = self.backends.write();

        self.ring.remove_node(node_id)?;
        let node = backends
            .remove(node_id)
            .ok_or_else(|| Error::UnknownNode(NodeId::from(node_id)))?;

        info!(node = %node_id, "node left");
        Ok(node)
    }

    /// Node that currently owns `key`.
    pub fn resolve(&self, key: impl AsRef<[u8]>) -> Result<NodeId> {
        self.ring.resolve(key)
    }

    /// Registered nodes in ascending id order.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.ring.nodes()
    }

    /// Share of the key space owned by each node.
    pub fn ownership(&self) -> Vec<NodeOwnership> {
        self.ring.ownership()
    }

    pub fn replica_count(&self) -> usize {
        self.ring.replica_count()
    }

    /// Parse and route one request line.
    pub fn handle_line(&self, line: &str) -> Response {
        match Request::parse(line) {
            Ok(request) => self.route(request),
            Err(e) => {
                counter!("ringcache_request_errors_total", "kind" => "protocol").increment(1);
                debug!(error = %e, "rejected request line");
                Response::Protocol(e)
            }
        }
    }

    /// Route a parsed request to the owning node and build the reply.
    pub fn route(&self, request: Request) -> Response {
        match request {
            Request::Store { key, value } => {
                counter!("ringcache_requests_total", "command" => "store").increment(1);
                let (node_id, node) = match self.owner(&key) {
                    Ok(owner) => owner,
                    Err(e) => return Self::routing_failure(&key, e),
                };

                match node.set(&key, value) {
                    Ok(()) => {
                        debug!(key = %key, node = %node_id, "stored");
                        Response::Stored
                    }
                    Err(e) => {
                        counter!("ringcache_request_errors_total", "kind" => "capacity")
                            .increment(1);
                        debug!(key = %key, node = %node_id, error = %e, "store rejected");
                        Response::from(e)
                    }
                }
            }
            Request::Retrieve { key } => {
                counter!("ringcache_requests_total", "command" => "retrieve").increment(1);
                let (node_id, node) = match self.owner(&key) {
                    Ok(owner) => owner,
                    Err(e) => return Self::routing_failure(&key, e),
                };

                match node.get(&key) {
                    Some(value) => Response::Value(value),
                    None => {
                        debug!(key = %key, node = %node_id, "not found");
                        Response::NotFound
                    }
                }
            }
            Request::Delete { key } => {
                counter!("ringcache_requests_total", "command" => "delete").increment(1);
                let (node_id, node) = match self.owner(&key) {
                    Ok(owner) => owner,
                    Err(e) => return Self::routing_failure(&key, e),
                };

                if node.delete(&key) {
                    debug!(key = %key, node = %node_id, "deleted");
                    Response::Deleted
                } else {
                    Response::NotFound
                }
            }
            Request::Ping => {
                counter!("ringcache_requests_total", "command" => "ping").increment(1);
                Response::Pong
            }
            Request::Info => {
                counter!("ringcache_requests_total", "command" => "info").increment(1);
                Response::Info(self.node_stats())
            }
            Request::Quit => {
                counter!("ringcache_requests_total", "command" => "quit").increment(1);
                Response::Bye
            }
        }
    }

    /// Counters for every registered node, in ascending id order.
    pub fn node_stats(&self) -> Vec<(NodeId, StatsSnapshot)> {
        let mut handles: Vec<(NodeId, Arc<dyn CacheNode>)> = self
            .backends
            .read()
            .iter()
            .map(|(id, node)| (id.clone(), Arc::clone(node)))
            .collect();
        handles.sort_by(|a, b| a.0.cmp(&b.0));

        handles
            .into_iter()
            .map(|(id, node)| (id, node.stats()))
            .collect()
    }

    fn owner(&self, key: &str) -> Result<(NodeId, Arc<dyn CacheNode>)> {
        let backends = self.backends.read();
        let node_id = self.ring.resolve(key)?;
        let node = backends
            .get(&node_id)
            .cloned()
            .ok_or_else(|| Error::UnknownNode(node_id.clone()))?;
        Ok((node_id, node))
    }

    fn routing_failure(key: &str, err: Error) -> Response {
        counter!("ringcache_request_errors_total", "kind" => "routing").increment(1);
        error!(key, error = %err, "cannot route request");
        Response::NoNodes
    }
}

impl std::fmt::Debug for RequestRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRouter")
            .field("nodes", &self.ring.nodes())
            .field("replicas", &self.ring.replica_count())
            .finish()
    }
}
