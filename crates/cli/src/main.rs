//! CLI entry point for ringcache.

use clap::Parser;
use ringcache::{logging, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    logging::init(&config.log_level);
    config.run().await
}
