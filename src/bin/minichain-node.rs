#![forbid(unsafe_code)]
//! minichain node: one in-memory ledger served over HTTP

use clap::Parser;
use minichain::api::run_api_server;
use minichain::config::{load_config, MiningMode};
use minichain::node::Node;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "minichain-node", version, about = "Run a single minichain node")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Address to bind, overrides api.host
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides api.port
    #[arg(short, long)]
    port: Option<u16>,

    /// Mining mode, overrides mining.mode
    #[arg(long, value_enum)]
    mode: Option<MiningMode>,

    /// Required leading zero hex digits, overrides mining.difficulty
    #[arg(short, long)]
    difficulty: Option<u32>,

    /// Fixed node identifier, overrides node.identifier
    #[arg(long)]
    node_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = load_config(&args.config)?;

    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(mode) = args.mode {
        config.mining.mode = mode;
    }
    if let Some(difficulty) = args.difficulty {
        config.mining.difficulty = difficulty;
    }
    if let Some(node_id) = args.node_id {
        config.node.identifier = Some(node_id);
    }
    config.validate()?;

    let node = Node::from_config(&config);
    info!(
        "Starting minichain node {} ({} mining, difficulty {})",
        node.identity(),
        config.mining.mode,
        config.mining.difficulty
    );

    let addr: SocketAddr = format!("{}:{}", config.api.host, config.api.port).parse()?;

    let shutdown_node = node.clone();
    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown requested");
        shutdown_node.cancel_search();
    };

    run_api_server(node, addr, shutdown).await?;
    info!("Node stopped");
    Ok(())
}
