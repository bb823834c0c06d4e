//! Gomoku Rooms - realtime room server for 20x20 five-in-a-row.

use anyhow::Result;
use clap::Parser;
use gomoku_rooms::{Cli, Command, MemoryStore, RoomService, ServerConfig, router};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, host, config } => run_server(host, port, config).await,
    }
}

/// Run the HTTP room server
async fn run_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<std::path::PathBuf>,
) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = match config_path {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if host.is_some() || port.is_some() {
        config = ServerConfig::new(
            host.unwrap_or_else(|| config.host().clone()),
            port.unwrap_or(*config.port()),
        );
    }

    info!("Starting gomoku room server");

    let store = Arc::new(MemoryStore::new());
    let service = RoomService::new(store);
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), "Server ready");
    axum::serve(listener, app).await?;

    Ok(())
}
