// Main entry point for API server

use anyhow::{Context, Result};
use server_core::kernel::{logging::init_tracing, ServerDeps};
use server_core::server::{build_app, AppState};
use server_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before logging so RUST_LOG set there applies
    let _ = dotenvy::dotenv();
    init_tracing();

    tracing::info!("Starting searcrawl API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(config = %config.summary(), "Configuration loaded");

    let deps = ServerDeps::from_config(&config)?;
    deps.start().await?;

    let result = serve(&config, &deps).await;

    deps.shutdown().await;
    tracing::info!("searcrawl API stopped");

    result
}

async fn serve(config: &Config, deps: &ServerDeps) -> Result<()> {
    let app = build_app(
        AppState::new(deps.pipeline.clone()),
        config.request_timeout(),
    );

    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.api_port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
