//! SkillSpan execution server
//!
//! HTTP front end that accepts code submissions and runs them through
//! [`skillspan_sandbox::SandboxService`].

pub mod config;
pub mod error;
pub mod http;
pub mod logging;

pub use config::{ConfigError, Overrides, ServerConfig};
pub use error::ApiError;
pub use http::{create_router, start_server, AppState};

use anyhow::{Context, Result};
use tracing::info;

/// Bind the configured address and serve until Ctrl-C
pub async fn run(config: ServerConfig) -> Result<()> {
    let state = AppState::from_config(&config);
    let addr = config.bind_addr();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        timeout_ms = config.sandbox.limits.timeout.as_millis() as u64,
        max_concurrent = config.server.max_concurrent_executions,
        "Execution server configured"
    );

    start_server(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}
