//! Token abstraction module for consistent hashing.
//!
//! Tokens represent positions on the hash ring and must be comparable,
//! hashable, and thread-safe.

pub mod hash_token;
pub mod traits;

pub use hash_token::HashToken;
pub use traits::Token;
