//! EtherSense agent
//!
//! Refreshes mock market metrics on a schedule, detects signals and
//! serves the resulting dashboard state over HTTP.

use anyhow::Result;
use ethersense_agent::{api, build_refresh_cycle, config, refresh_loop::RefreshLoop};
use sense_lib::health::{components, HealthRegistry};
use sense_lib::{SenseMetrics, StructuredLogger};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const AGENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = config::AgentConfig::load()?;
    info!(instance = %config.instance_name, timeframe = ?config.timeframe, "Agent configured");

    let health_registry = HealthRegistry::new();
    health_registry.register(components::FEED).await;
    health_registry.register(components::REFRESH_LOOP).await;

    // Register Prometheus metrics before the first scrape
    let _metrics = SenseMetrics::new();

    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(AGENT_VERSION, config.risk_event_probability);

    let cycle = build_refresh_cycle(&config, logger.clone());
    let app_state = api::AppState::new(health_registry, cycle);

    let (shutdown_tx, _) = broadcast::channel(1);

    let refresh_loop = RefreshLoop::new(app_state.clone(), config.refresh_interval());
    let refresh_handle = tokio::spawn(refresh_loop.run(shutdown_tx.subscribe()));

    let server = api::serve(config.api_port, app_state, shutdown_tx.subscribe());
    let api_handle = tokio::spawn(server);

    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    let _ = shutdown_tx.send(());

    refresh_handle.await?;
    api_handle.await??;
    info!("Shutdown complete");

    Ok(())
}
