// TruthLens HTTP server

use anyhow::{Context, Result};
use std::sync::Arc;
use truthlens::{api, telemetry, Config, FactChecker};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.logging);

    tracing::info!("Starting TruthLens v{}", env!("CARGO_PKG_VERSION"));

    let checker = Arc::new(FactChecker::from_config(&config).context("Failed to build fact checker")?);
    let app = api::app(checker, &config).context("Failed to build router")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
