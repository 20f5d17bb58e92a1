//! PoW Ledger node
//!
//! Starts a ledger node and serves its HTTP API.

use clap::Parser;
use pow_ledger::api::{create_router, ApiState};
use pow_ledger::config::NodeConfig;
use pow_ledger::network::Node;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pow-ledger")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "A minimal proof-of-work ledger node", long_about = None)]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Comma-separated peers to register at startup
    #[arg(long, value_delimiter = ',')]
    peers: Vec<String>,

    /// Only check hash links and proofs of peer chains
    #[arg(long)]
    lenient: bool,
}

impl Cli {
    /// Load the config file (if any) and apply command-line overrides
    fn node_config(&self) -> Result<NodeConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => NodeConfig::from_file(path)?,
            None => NodeConfig::default(),
        };

        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        config
            .bootstrap_peers
            .extend(self.peers.iter().map(|p| p.trim().to_string()).filter(|p| !p.is_empty()));
        if self.lenient {
            config.strict_validation = false;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.node_config()?;
    let addr = config.listen_addr();

    let node = Arc::new(Node::new(config).await?);
    let app = create_router(ApiState::new(node.clone()));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Node {} listening on http://{}", node.node_id(), addr);

    let shutdown_node = node.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => shutdown_node.shutdown(),
                Err(e) => {
                    log::error!("Failed to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;

    log::info!("Server stopped");
    Ok(())
}
