//! XXH3 partitioner implementation.

use crate::partitioner::traits::Partitioner;
use crate::token::HashToken;
use xxhash_rust::xxh3::xxh3_64;

/// Default partitioner: 64-bit XXH3 over the raw key bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh3Partitioner;

impl Partitioner for Xxh3Partitioner {
    type TokenType = HashToken;

    fn partition(&self, key: &[u8]) -> Self::TokenType {
        HashToken(xxh3_64(key))
    }

    fn name(&self) -> &'static str {
        "Xxh3Partitioner"
    }
}
