// Main entry point - Dependency injection, monitor and status server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::cycle_monitor::ApplianceCycleMonitor;
use crate::application::scheduler::MonitorRunner;
use crate::infrastructure::config::load_config;
use crate::infrastructure::home_assistant::HomeAssistantClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{cycle_status, health_check};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_config().context("Failed to load laundry monitor configuration")?;

    // Create platform adapter (infrastructure layer)
    let platform = Arc::new(HomeAssistantClient::new(&config.platform)?);

    // Create monitor and its runner (application layer)
    let monitor = ApplianceCycleMonitor::new(
        platform.clone(),
        platform.clone(),
        platform,
        config.cycle.clone(),
    );
    let (runner, snapshots) = MonitorRunner::new(
        monitor,
        config.schedule.telemetry_interval(),
        config.schedule.display_interval(),
    );
    let monitor_task = tokio::spawn(runner.run(async {
        let _ = tokio::signal::ctrl_c().await;
    }));

    // Build router (presentation layer)
    let state = Arc::new(AppState { snapshots });
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/status", get(cycle_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .http
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.http.bind))?;
    tracing::info!("Starting laundry-monitor status server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    monitor_task.await.context("Monitor task panicked")?;

    Ok(())
}
