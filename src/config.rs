/// Configuration management for the Filmorate server.
/// Handles command-line argument parsing and config structure.
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Where entities are kept
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// SQLite database file
    Sqlite,
    /// Process memory; everything is lost on exit
    Memory,
}

#[derive(Parser, Debug)]
#[command(name = "Filmorate Server")]
#[command(about = "Film rating and social REST backend", long_about = None)]
pub struct Config {
    /// Address to bind (default: 127.0.0.1)
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port (default: 8080)
    #[arg(long, default_value = "8080")]
    pub port: u16,

    /// SQLite database file path (default: filmorate.db)
    #[arg(long, default_value = "filmorate.db")]
    pub database: PathBuf,

    /// Storage backend
    #[arg(long, value_enum, default_value_t = StorageBackend::Sqlite)]
    pub storage: StorageBackend,

    /// PID file path (optional) - write server PID to this file on startup
    #[arg(long)]
    pub pidfile: Option<PathBuf>,
}

impl Config {
    /// Parse command-line arguments into Config
    pub fn from_args() -> Self {
        Config::parse()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
