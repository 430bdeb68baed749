//! Command-line configuration.

use std::net::SocketAddr;
use std::time::Duration;

use cachestore::{StoreLimits, DEFAULT_CAPACITY, DEFAULT_MAX_KEY_LEN, DEFAULT_MAX_VALUE_LEN};
use clap::{Args, Parser};
use corelib::ring::DEFAULT_VNODES;

use crate::commands::Command;
use crate::server::{ServerSettings, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_LINE_LEN};

/// Consistent-hashing cache server and tools.
#[derive(Parser, Debug)]
#[command(name = "ringcache", author, version, about, long_about = None)]
pub struct CliConfig {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub async fn run(self) -> anyhow::Result<()> {
        self.command.execute().await
    }
}

/// Ring membership shared by every subcommand that builds a ring.
#[derive(Args, Debug, Clone)]
pub struct RingArgs {
    /// Comma-separated node ids
    #[arg(long, value_delimiter = ',', required = true)]
    pub nodes: Vec<String>,

    /// Virtual nodes per node
    #[arg(long, default_value_t = DEFAULT_VNODES)]
    pub replicas: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub ring: RingArgs,

    /// Maximum entries per node
    #[arg(short, long, default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Maximum key length in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_KEY_LEN)]
    pub max_key_len: usize,

    /// Maximum value length in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_VALUE_LEN)]
    pub max_value_len: usize,

    /// Close connections idle for this many seconds
    #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT_SECS)]
    pub idle_timeout_secs: u64,

    /// Longest accepted request line in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LEN)]
    pub max_line_len: usize,
}

impl ServeArgs {
    pub fn store_limits(&self) -> StoreLimits {
        StoreLimits {
            capacity: self.capacity,
            max_key_len: self.max_key_len,
            max_value_len: self.max_value_len,
        }
    }

    pub fn server_settings(&self) -> ServerSettings {
        ServerSettings {
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            max_line_len: self.max_line_len,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    pub addr: String,

    /// Request lines, e.g. "STORE key1 value1". Read from stdin when omitted.
    pub requests: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub ring: RingArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Keys to resolve
    #[arg(required = true)]
    pub keys: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub ring: RingArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}
