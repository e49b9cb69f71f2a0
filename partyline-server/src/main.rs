//! Partyline Server - shared tempo sync for headphone parties
//!
//! Holds the authoritative party state in memory and pushes it to guest
//! clients over SSE. The host posts tempo and liveness updates through the
//! sync API; audio itself travels over a separate media server (WHIP/WHEP)
//! that only consumes the numbers produced here.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use partyline_broadcaster::PartyBroadcaster;
use partyline_server::config::ServerConfig;
use partyline_server::gateway::SyncGateway;
use partyline_server::http::{self, AppState};

#[derive(Parser, Debug)]
#[command(name = "partyline-server", version, about = "Party tempo sync server")]
struct Cli {
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address override (e.g. 0.0.0.0:4173)
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    info!("🎧 Starting Partyline server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load_from(path),
        None => ServerConfig::load(),
    }
    .context("Failed to load configuration")?;

    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }

    info!("📋 Configuration loaded from {}", config.config_path.display());

    // Party state + fan-out
    let broadcaster = Arc::new(PartyBroadcaster::with_keep_alive(Duration::from_secs(
        config.keep_alive_secs,
    )));
    broadcaster
        .start()
        .await
        .context("Failed to start broadcaster")?;

    let gateway = Arc::new(SyncGateway::new(Arc::clone(&broadcaster)));
    let app = http::router(AppState {
        gateway,
        party_name: config.party_name.clone(),
    });

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.listen_addr))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("🚀 Party sync server listening on http://{}", addr);
    info!("   Guests subscribe at /api/events; hosts post to /api/sync");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated unexpectedly")?;

    // Cleanup: end every subscriber stream before exiting.
    info!("🧹 Shutting down, closing subscriber channels...");
    if let Err(e) = broadcaster.stop().await {
        error!("Broadcaster shutdown error: {}", e);
    }
    info!("👋 Partyline server stopped");

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("🛑 Received shutdown signal"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
