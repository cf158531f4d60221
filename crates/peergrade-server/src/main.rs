use anyhow::{Context, Result};
use clap::Parser;
use peergrade_core::telemetry::{init_tracing, level_for};
use peergrade_server::{serve, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    init_tracing(config.json, level_for(config.verbose));

    let state = AppState::connect(&config)
        .await
        .context("Failed to connect to peergrade database")?;

    serve(&config, state).await.context("Server error")
}
