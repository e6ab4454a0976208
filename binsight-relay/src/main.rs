//! binsight-relay - Waste photo analysis relay
//!
//! Accepts a multipart upload plus an analysis mode, forwards the image to
//! the configured classification service and passes its answer back.
//! Also serves the upload page.

use anyhow::{Context, Result};
use binsight_common::config::TomlConfig;
use binsight_relay::config::{RelayArgs, RelayConfig};
use binsight_relay::{build_router, AppState, UpstreamClient};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let args = RelayArgs::parse();
    let toml = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load config file")?;
    let config = RelayConfig::resolve(args, toml).context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("binsight_relay={0},binsight_common={0},tower_http=info", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before anything that can stall
    info!(
        "Starting binsight-relay v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Upstream endpoint: {}", config.upstream_url);
    match config.upstream_timeout {
        Some(timeout) => info!("Upstream timeout: {:?}", timeout),
        None => info!("Upstream timeout: none"),
    }
    info!("Upload limit: {} bytes", config.max_upload_bytes);

    let upstream = UpstreamClient::new(config.upstream_url.clone(), config.upstream_timeout)
        .context("Failed to create upstream client")?;
    let app = build_router(AppState::new(upstream, config.max_upload_bytes));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    info!("binsight-relay listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
