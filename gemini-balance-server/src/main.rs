//! Gemini Balance Server - headless gateway daemon.

mod cli;

use anyhow::Result;
use clap::Parser;
use gemini_balance_core::proxy::{config, AppState, GatewayServer, ServerStartConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let gateway_config = config::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    info!(
        upstream = %gateway_config.versioned_base(),
        fetch_timeout_ms = gateway_config.fetch_timeout_ms,
        rate_limit_capacity = gateway_config.rate_limit_capacity,
        rate_limit_refill_rate = gateway_config.rate_limit_refill_rate,
        models_cache_ttl_ms = gateway_config.models_cache_ttl_ms,
        request_logging = gateway_config.request_logging,
        "Gemini Balance starting"
    );

    let state = AppState::new(gateway_config)?;
    let server = GatewayServer::new(ServerStartConfig { host: cli.host, port: cli.port, state });
    server.run().await?;

    Ok(())
}
