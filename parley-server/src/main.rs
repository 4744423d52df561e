//! Server entry point for parley

use anyhow::Result;
use clap::Parser;
use parley_core::config::ConfigLoader;
use parley_core::logging::init_logging;
use parley_server::{AppState, EchoClient};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

#[derive(Parser)]
#[command(name = "parley-server")]
#[command(about = "Session history service for an AI chat backend")]
#[command(version)]
struct Cli {
    /// Configuration directory
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Override the configured bind port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = match cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;
    let _guard = init_logging(&config.logging);

    let state = AppState::new(Arc::new(EchoClient), config.chat.context_messages);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            let _ = shutdown_tx.send(());
        }
    });

    let port = cli.port.unwrap_or(config.server.port);
    parley_server::run_server(state, &config.server.host, port, shutdown_rx).await
}
