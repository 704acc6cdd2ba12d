// Rental Catalog - Web Server
// REST API with Axum over the configured storage backend

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use rental_catalog::api::{router, AppState};
use rental_catalog::{logging, StorageConfig};

#[derive(Parser)]
#[command(name = "rental-server")]
#[command(about = "REST API for the rental catalog")]
struct ServerConfig {
    #[command(flatten)]
    storage: StorageConfig,

    #[arg(long, env = "HBNB_API_HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "HBNB_API_PORT", default_value = "5000")]
    port: u16,

    #[arg(long, help = "Enable verbose output")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    logging::init_logger(config.verbose);

    let storage = config.storage.open().context("Failed to open storage")?;
    let app = router(AppState::new(storage));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("🚀 Server running on http://{}/api/v1", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
