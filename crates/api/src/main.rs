//! Sensor Fusion Service - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, ServiceConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load().context("failed to load service configuration")?;
    init_logging(&config.logging).context("failed to initialize logging")?;

    info!("=== Sensor Fusion Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Mode: {}, history: {} frames, proximity threshold: {}m",
        config.fusion.mode, config.fusion.history_capacity, config.proximity.threshold_m
    );

    run_server(config).await?;

    Ok(())
}
