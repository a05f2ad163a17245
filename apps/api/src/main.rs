//! # Cave Fire Proposals API Entry Point
//!
//! ```text
//! main ──► tracing ──► ApiConfig::load ──► read catalog ──► axum::serve
//! ```

use std::sync::Arc;

use anyhow::Context;
use cavefire_api::{build_router, ApiConfig, AppState};
use cavefire_core::Catalog;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("Starting Cave Fire Proposals API...");

    let config = ApiConfig::load(None).context("Failed to load configuration")?;
    info!(
        addr = %config.bind_address(),
        catalog = %config.catalog_path.display(),
        tax_rate = %config.tax_rate(),
        rounding = %config.rounding,
        "Configuration loaded"
    );

    let contents = std::fs::read_to_string(&config.catalog_path).with_context(|| {
        format!("Failed to read catalog {}", config.catalog_path.display())
    })?;
    let catalog = Catalog::from_json(&contents).context("Failed to parse catalog")?;
    info!(addons = catalog.len(), "Catalog loaded");

    let bind_addr = config.bind_address();
    let state = Arc::new(AppState::new(config, catalog));
    let app = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!(addr = %bind_addr, "API server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initializes the logging system.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cavefire=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
