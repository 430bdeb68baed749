//! Error types for the core library.

use crate::node::NodeId;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
///
/// These are operator-facing: they come back from membership changes and from
/// lookups against a ring with no nodes, never from ordinary key traffic on a
/// healthy ring.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The node is already a member of the ring.
    #[error("node already present: {0}")]
    DuplicateNode(NodeId),
    /// The node is not a member of the ring.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
    /// A lookup was attempted on a ring with no nodes.
    #[error("hash ring is empty")]
    EmptyRing,
    /// Ring construction parameters are invalid.
    #[error("invalid ring configuration: {0}")]
    InvalidConfig(String),
}
