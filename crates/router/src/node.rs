//! Handles through which the router reaches cache nodes.

use bytes::Bytes;
use cachestore::{CacheStore, StatsSnapshot, StoreError};

/// A cache node as seen by the router.
///
/// The router only ever holds `Arc<dyn CacheNode>` handles; the node owns its
/// storage. An in-process [`CacheStore`] is the standard implementation.
///
/// # Thread Safety
///
/// Implementations are called concurrently from every connection and must
/// serialize their own state.
pub trait CacheNode: Send + Sync {
    /// Store `value` under `key`.
    fn set(&self, key: &str, value: Bytes) -> Result<(), StoreError>;

    /// Look up `key`.
    fn get(&self, key: &str) -> Option<Bytes>;

    /// Remove `key`. Returns false if it was not stored.
    fn delete(&self, key: &str) -> bool;

    /// Current counters and entry count, reported by `INFO`.
    fn stats(&self) -> StatsSnapshot;
}

impl CacheNode for CacheStore {
    fn set(&self, key: &str, value: Bytes) -> Result<(), StoreError> {
        CacheStore::set(self, key, value)
    }

    fn get(&self, key: &str) -> Option<Bytes> {
        CacheStore::get(self, key)
    }

    fn delete(&self, key: &str) -> bool {
        CacheStore::delete(self, key)
    }

    fn stats(&self) -> StatsSnapshot {
        self.snapshot()
    }
}
