//! Command-line front end and TCP server for the ring cache.
//!
//! Provides:
//! - `serve`: run a line-protocol cache server over in-process nodes
//! - `client`: send request lines to a running server
//! - `resolve` / `inspect`: show key placement and ring balance

pub mod client;
pub mod commands;
pub mod config;
pub mod logging;
pub mod server;

pub use client::Client;
pub use commands::Command;
pub use config::CliConfig;
pub use server::{serve, ServerSettings};
