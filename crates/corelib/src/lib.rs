//! Core library for consistent hashing.
//!
//! This crate provides the routing half of the cache cluster:
//! - Token types and partitioners (the hash functions)
//! - Node identifiers and virtual nodes
//! - The node table and the hash ring that resolves keys to nodes

pub mod error;
pub mod node;
pub mod partitioner;
pub mod ring;
pub mod token;
pub mod vnode;

pub use error::{Error, Result};
pub use node::NodeId;
pub use partitioner::Partitioner;
pub use ring::{HashRing, NodeOwnership, RingBuilder};
pub use token::{HashToken, Token};
pub use vnode::VirtualNode;
