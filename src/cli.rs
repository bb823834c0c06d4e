//! Command-line interface for gomoku_rooms.

use clap::{Parser, Subcommand};

/// Gomoku Rooms - realtime room service for 20x20 five-in-a-row
#[derive(Parser, Debug)]
#[command(name = "gomoku_rooms")]
#[command(about = "Realtime lobby and game room server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP room server
    Serve {
        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,
    },
}
