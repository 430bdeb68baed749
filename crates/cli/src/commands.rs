//! Subcommand implementations.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context;
use cachestore::CacheStore;
use clap::Subcommand;
use corelib::ring::RingBuilder;
use corelib::{HashRing, NodeId};
use router::RequestRouter;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tracing::info;

use crate::client::Client;
use crate::config::{ClientArgs, InspectArgs, ResolveArgs, RingArgs, ServeArgs};
use crate::server;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the cache server with one in-process store per node
    Serve(ServeArgs),
    /// Send request lines to a running server
    Client(ClientArgs),
    /// Show which node owns each key
    Resolve(ResolveArgs),
    /// Show virtual-node counts and key-space share per node
    Inspect(InspectArgs),
}

impl Command {
    pub async fn execute(self) -> anyhow::Result<()> {
        match self {
            Command::Serve(args) => run_serve(args).await,
            Command::Client(args) => run_client(args).await,
            Command::Resolve(args) => {
                print!("{}", render_resolve(&args)?);
                Ok(())
            }
            Command::Inspect(args) => {
                print!("{}", render_inspect(&args)?);
                Ok(())
            }
        }
    }
}

#[derive(Serialize)]
struct Assignment<'a> {
    key: &'a str,
    node: NodeId,
}

fn build_ring(args: &RingArgs) -> anyhow::Result<HashRing> {
    args.nodes
        .iter()
        .fold(RingBuilder::new().with_vnodes(args.replicas), |b, n| b.add_node(n.as_str()))
        .build()
        .context("invalid ring membership")
}

/// Build the router and one store per configured node.
pub fn build_cluster(args: &ServeArgs) -> anyhow::Result<(Arc<RequestRouter>, Vec<(NodeId, Arc<CacheStore>)>)> {
    let router = RequestRouter::new(args.ring.replicas)?;
    let mut stores = Vec::with_capacity(args.ring.nodes.len());

    for name in &args.ring.nodes {
        let store = Arc::new(CacheStore::new(args.store_limits()));
        router
            .add_node(name.as_str(), store.clone())
            .with_context(|| format!("cannot add node {}", name))?;
        stores.push((NodeId::from(name.as_str()), store));
    }

    Ok((Arc::new(router), stores))
}

async fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    let (router, stores) = build_cluster(&args)?;

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("cannot bind {}", args.bind))?;
    info!(
        addr = %args.bind,
        nodes = ?router.nodes(),
        replicas = router.replica_count(),
        capacity = args.capacity,
        "cache server listening"
    );

    let shutdown = async {
        // An error here means no signal handler could be installed; run until killed.
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    server::serve(listener, router, args.server_settings(), shutdown).await?;

    for (node_id, store) in stores {
        let stats = store.snapshot();
        info!(
            node = %node_id,
            entries = stats.entries,
            hits = stats.hits,
            misses = stats.misses,
            deletes = stats.deletes,
            rejections = stats.rejections,
            hit_ratio = store.stats().hit_ratio(),
            "node summary"
        );
    }
    Ok(())
}

async fn run_client(args: ClientArgs) -> anyhow::Result<()> {
    let mut client = Client::connect(&args.addr)
        .await
        .with_context(|| format!("cannot connect to {}", args.addr))?;

    if args.requests.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            println!("{}", client.request(&line).await?);
        }
    } else {
        for line in &args.requests {
            println!("{}", client.request(line).await?);
        }
    }
    Ok(())
}

/// Text or JSON listing of each key's owner.
pub fn render_resolve(args: &ResolveArgs) -> anyhow::Result<String> {
    let ring = build_ring(&args.ring)?;
    let assignments = args
        .keys
        .iter()
        .map(|key| Ok(Assignment { key, node: ring.resolve(key)? }))
        .collect::<corelib::Result<Vec<_>>>()?;

    if args.json {
        return Ok(serde_json::to_string_pretty(&assignments)? + "\n");
    }

    let mut out = String::new();
    for a in assignments {
        writeln!(out, "Key: {} is mapped to Node: {}", a.key, a.node)?;
    }
    Ok(out)
}

/// Text or JSON report of ring balance.
pub fn render_inspect(args: &InspectArgs) -> anyhow::Result<String> {
    let ring = build_ring(&args.ring)?;
    let ownership = ring.ownership();

    if args.json {
        return Ok(serde_json::to_string_pretty(&ownership)? + "\n");
    }

    let mut out = String::new();
    writeln!(
        out,
        "{} nodes, {} virtual nodes, partitioner {}",
        ring.node_count(),
        ring.token_count(),
        ring.partitioner_name()
    )?;
    writeln!(out, "{:<24} {:>8} {:>8}", "NODE", "VNODES", "SHARE")?;
    for entry in ownership {
        writeln!(
            out,
            "{:<24} {:>8} {:>7.2}%",
            entry.node_id.as_str(),
            entry.vnodes,
            entry.share * 100.0
        )?;
    }
    Ok(out)
}
