//! Remote logs HTTP server binary entry point.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use remote_logs::server::{CliArgs, LogServer, LogServerConfig};
use remote_logs::{CursorQueryEngine, SharedSecretValidator, open_store};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();

    let config = args.to_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::process::exit(1);
    });
    let server_config = LogServerConfig::from(&args);

    tracing::info!("Opening log store with config: {:?}", config.storage);
    let store = open_store(&config.storage).unwrap_or_else(|e| {
        tracing::error!("Failed to open log store: {}", e);
        std::process::exit(1);
    });

    let engine = CursorQueryEngine::new(store).with_max_page_size(config.max_page_size);
    let validator = match &config.secret_key {
        Some(secret) => Arc::new(SharedSecretValidator::new(secret)),
        None => {
            tracing::error!("No secret key configured");
            std::process::exit(1);
        }
    };

    let server = LogServer::new(engine, validator, server_config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
