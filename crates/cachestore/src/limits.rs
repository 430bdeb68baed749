//! Store sizing limits

/// Default maximum number of entries per store.
pub const DEFAULT_CAPACITY: usize = 100;
/// Default maximum key length in bytes.
pub const DEFAULT_MAX_KEY_LEN: usize = 50;
/// Default maximum value length in bytes.
pub const DEFAULT_MAX_VALUE_LEN: usize = 256;

/// Size bounds enforced by a [`CacheStore`](crate::CacheStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    /// Maximum number of distinct keys.
    pub capacity: usize,
    /// Maximum key length in bytes.
    pub max_key_len: usize,
    /// Maximum value length in bytes.
    pub max_value_len: usize,
}

impl StoreLimits {
    /// Limits with the given entry capacity and default length bounds.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_key_len: DEFAULT_MAX_KEY_LEN,
            max_value_len: DEFAULT_MAX_VALUE_LEN,
        }
    }
}
