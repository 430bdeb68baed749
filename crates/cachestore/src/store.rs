//! CacheStore: bounded key-value map for one node

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::limits::StoreLimits;
use crate::stats::{CacheStats, StatsSnapshot};

/// Bounded in-memory store owned by a single cache node.
///
/// Every `get`/`set` takes this store's own lock, so stores for different
/// nodes never contend with each other. Values are [`Bytes`], so a read hands
/// back a cheap reference-counted copy rather than cloning the buffer.
#[derive(Debug)]
pub struct CacheStore {
    entries: Mutex<HashMap<String, Bytes>>,
    limits: StoreLimits,
    stats: CacheStats,
}

impl CacheStore {
    /// Create an empty store enforcing `limits`.
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            entries: Mutex::new(HashMap::with_capacity(limits.capacity)),
            limits,
            stats: CacheStats::new(),
        }
    }

    /// Create an empty store holding at most `capacity` keys, with default
    /// key and value length limits.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(StoreLimits::with_capacity(capacity))
    }

    /// Store `value` under `key`.
    ///
    /// Overwriting an existing key always succeeds (within the length limits)
    /// and does not consume extra capacity. A new key is refused with
    /// [`StoreError::Full`] once the store is at capacity.
    pub fn set(&self, key: &str, value: impl Into<Bytes>) -> Result<(), StoreError> {
        let value = value.into();
        if let Err(e) = self.check_lengths(key, &value) {
            self.stats.record_rejection();
            return Err(e);
        }

        let mut entries = self.entries.lock();
        if !entries.contains_key(key) && entries.len() >= self.limits.capacity {
            self.stats.record_rejection();
            debug!(key, capacity = self.limits.capacity, "store full, rejecting key");
            return Err(StoreError::Full {
                capacity: self.limits.capacity,
            });
        }

        entries.insert(key.to_owned(), value);
        self.stats.record_insert();
        Ok(())
    }

    /// Look up `key`.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        let value = self.entries.lock().get(key).cloned();
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    /// Remove `key`, freeing its slot. Returns false if it was not stored.
    pub fn delete(&self, key: &str) -> bool {
        let removed = self.entries.lock().remove(key).is_some();
        if removed {
            self.stats.record_delete();
        }
        removed
    }

    fn check_lengths(&self, key: &str, value: &Bytes) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::KeyEmpty);
        }
        if key.len() > self.limits.max_key_len {
            return Err(StoreError::KeyTooLong {
                len: key.len(),
                max: self.limits.max_key_len,
            });
        }
        if value.len() > self.limits.max_value_len {
            return Err(StoreError::ValueTooLong {
                len: value.len(),
                max: self.limits.max_value_len,
            });
        }
        Ok(())
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Maximum number of keys
    pub fn capacity(&self) -> usize {
        self.limits.capacity
    }

    /// Limits this store enforces
    pub fn limits(&self) -> &StoreLimits {
        &self.limits
    }

    /// Traffic counters
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Counters plus current entry count
    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot(self.len())
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(StoreLimits::default())
    }
}
