//! 64-bit hash token.

use crate::token::traits::Token;
use serde::{Deserialize, Serialize};

/// Position on a ring whose token space is the full `u64` range.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashToken(pub u64);

impl Token for HashToken {
    fn distance_to(&self, other: &Self) -> Self {
        HashToken(other.0.wrapping_sub(self.0))
    }

    fn ring_fraction(&self) -> f64 {
        self.0 as f64 / u64::MAX as f64
    }
}
