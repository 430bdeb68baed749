//! Core token trait definitions.

use std::fmt::Debug;
use std::hash::Hash;

/// Minimal token trait for the hash ring.
///
/// Tokens are immutable, comparable positions. Implementations must be
/// thread-safe and cheap to compare/hash.
pub trait Token: Clone + Ord + Hash + Send + Sync + Debug + 'static {
    /// Clockwise distance from `self` to `other` on the ring.
    fn distance_to(&self, other: &Self) -> Self;
    /// This token as a fraction of the whole token space, in `[0, 1]`.
    fn ring_fraction(&self) -> f64;
}
