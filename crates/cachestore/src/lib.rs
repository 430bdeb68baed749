//! # cachestore
//!
//! Bounded in-memory key-value storage for a single cache node.
//!
//! ## Architecture
//! - **HashMap** behind one `parking_lot::Mutex` per store
//! - **Admission**: new keys are rejected once the store holds `capacity`
//!   entries; nothing is evicted
//! - **Limits**: oversized keys and values are rejected, never truncated

#![warn(missing_docs)]

mod error;
mod limits;
mod stats;
mod store;

pub use error::StoreError;
pub use limits::{StoreLimits, DEFAULT_CAPACITY, DEFAULT_MAX_KEY_LEN, DEFAULT_MAX_VALUE_LEN};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::CacheStore;
