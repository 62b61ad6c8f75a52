/// Filmorate Server - film rating and social REST backend
///
/// Main server entry point. Handles:
/// - Command-line argument parsing
/// - Storage backend initialization
/// - HTTP server startup
use anyhow::Context;
use filmorate_server::config::{Config, StorageBackend};
use filmorate_server::db::{self, Stores};
use filmorate_server::server;
use filmorate_server::service::AppServices;
use std::fs;
use std::process;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let config = Config::from_args();

    log::info!("Starting Filmorate Server");
    log::info!("Storage: {:?}", config.storage);
    log::info!("Port: {}", config.port);

    // Write PID file if specified
    if let Some(pidfile) = &config.pidfile {
        fs::write(pidfile, process::id().to_string())
            .with_context(|| format!("Failed to write PID file {:?}", pidfile))?;
        log::info!("PID file written to: {:?}", pidfile);
    }

    let stores = match config.storage {
        StorageBackend::Sqlite => {
            log::info!("Database: {:?}", config.database);
            let path = config
                .database
                .to_str()
                .context("Database path is not valid UTF-8")?;
            let pool = db::create_pool(path).context("Failed to create database pool")?;
            Stores::sqlite(pool)
        }
        StorageBackend::Memory => Stores::in_memory(),
    };
    log::info!("Storage initialized");

    let bind_addr = config.bind_addr();
    log::info!("Starting HTTP server on {}", bind_addr);

    let http_server = server::create_http_server(AppServices::new(stores), &bind_addr)
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    http_server.await?;
    Ok(())
}
