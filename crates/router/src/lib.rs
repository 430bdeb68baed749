//! Request routing for the cache cluster.
//!
//! This crate glues the wire protocol to the ring and the stores:
//! - `protocol`: one request line in, one response line out
//! - `node`: the `CacheNode` seam the router forwards through
//! - `router`: resolves each key's owner and dispatches to it

pub mod node;
pub mod protocol;
pub mod router;

pub use node::CacheNode;
pub use protocol::{ProtocolError, Request, Response};
pub use router::RequestRouter;
