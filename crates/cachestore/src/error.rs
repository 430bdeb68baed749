//! Error types for cachestore

/// Reasons a write is refused. The store is left unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store already holds `capacity` entries and the key is new.
    #[error("cache is full ({capacity} entries)")]
    Full {
        /// Configured maximum entry count.
        capacity: usize,
    },

    /// The key is empty.
    #[error("key must not be empty")]
    KeyEmpty,

    /// The key is longer than the configured limit.
    #[error("key too long: {len} bytes (max {max})")]
    KeyTooLong {
        /// Length of the rejected key in bytes.
        len: usize,
        /// Configured limit.
        max: usize,
    },

    /// The value is longer than the configured limit.
    #[error("value too long: {len} bytes (max {max})")]
    ValueTooLong {
        /// Length of the rejected value in bytes.
        len: usize,
        /// Configured limit.
        max: usize,
    },
}
