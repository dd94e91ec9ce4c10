//! SurfsUp Climate API - Main Entry Point

use api::{init_logging, run_server, ApiConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("=== SurfsUp Climate API v{} ===", env!("CARGO_PKG_VERSION"));

    let config = ApiConfig::load()?;
    info!("Serving observations from {}", config.database.database_url);

    run_server(config).await?;

    Ok(())
}
