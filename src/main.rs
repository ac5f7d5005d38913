//! Ads counter service - Entry Point

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{error, info};

use ads_counter::{App, Config, VERSION};

/// Application entry point
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    // Load configuration
    let (config, defaulted) = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Initialize tracing/logging
    ads_counter::util::init_tracing(&config.logging)?;

    info!(
        version = VERSION,
        config_path = ?config_path,
        defaults = defaulted,
        "Starting ads counter service"
    );

    let app = App::start(&config).await?;

    if let Err(e) = app.run(ads_counter::util::shutdown_signal()).await {
        error!(error = %e, "Service error");
        return Err(e);
    }

    Ok(())
}
