//! Consistent hash ring implementation.
//!
//! The ring manages token positions and provides efficient lookup
//! operations for finding nodes responsible for keys.

pub mod node_table;
pub mod ring;

pub use node_table::NodeTable;
pub use ring::{HashRing, NodeOwnership, RingBuilder, DEFAULT_VNODES};
