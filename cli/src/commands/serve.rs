// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! `repograph serve`: run the HTTP API until Ctrl+C or SIGTERM.

use anyhow::{Context, Result};
use clap::Args;
use metrics_exporter_prometheus::PrometheusBuilder;
use repograph_core::presentation::api;
use repograph_core::DiagramGenerationService;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address (default: server.bind_address from config)
    #[arg(long, env = "REPOGRAPH_HOST")]
    pub host: Option<String>,

    /// HTTP API port (default: server.port from config)
    #[arg(long, env = "REPOGRAPH_PORT")]
    pub port: Option<u16>,

    /// Expose Prometheus metrics on this port
    #[arg(long, env = "REPOGRAPH_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

pub async fn execute(args: ServeArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config_path)?;

    let host = args.host.unwrap_or_else(|| config.server.bind_address.clone());
    let port = args.port.unwrap_or(config.server.port);

    if let Some(metrics_port) = args.metrics_port {
        let metrics_addr: SocketAddr = format!("{host}:{metrics_port}")
            .parse()
            .with_context(|| format!("Invalid metrics address {host}:{metrics_port}"))?;
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Metrics exporter listening on {}", metrics_addr);
    }

    info!(
        default_platform = %config.defaults.ai_platform,
        default_model = %config.defaults.ai_model,
        cache_capacity = config.cache.capacity,
        "Configuration loaded"
    );

    let service = DiagramGenerationService::from_config(&config);
    let app = api::app(service);

    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("repograph API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
