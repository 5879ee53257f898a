//! nest_exporter — Prometheus exporter for Nest thermostats.
//!
//! Polls the vendor devices endpoint in the background and serves the
//! derived gauges on `/metrics`:
//! - Poller (background task, one fetch per refresh interval)
//! - Metrics registry (owned here, shared by poller and router)
//! - HTTP server (foreground)
//!
//! # Usage
//!
//! ```text
//! nest_exporter --listen-address :9264 --config ~/.nest_exporter.toml
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use nest_core::{ExporterConfig, expand_home};
use nest_metrics::NestMetrics;
use nest_poller::{NestClient, Poller};

#[derive(Parser, Debug)]
#[command(name = "nest_exporter", about = "Prometheus exporter for Nest thermostats")]
struct Cli {
    /// The address to listen on for HTTP requests.
    #[arg(long, default_value = ":9264")]
    listen_address: String,

    /// Path to the configuration file.
    #[arg(long, default_value = "~/.nest_exporter.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nest_exporter=debug,nest_poller=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let addr = listen_address(&cli.listen_address);

    let config_path = expand_home(&cli.config);
    let config = match ExporterConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(path = ?config_path, error = %e, "failed to load configuration");
            return Err(e).context("loading configuration");
        }
    };
    info!(
        path = ?config_path,
        refresh_secs = config.refresh_interval().as_secs(),
        legacy_oauth = config.client_id.is_some(),
        "configuration loaded"
    );

    // ── Initialize subsystems ──────────────────────────────────

    let metrics = NestMetrics::new().context("registering metric families")?;
    info!("metric families registered");

    let client = NestClient::new(config.api_url(), &config.token)?;
    let poller = Poller::new(
        client,
        metrics.clone(),
        config.refresh_interval(),
        config.temperature_scale,
    );

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Start background poller ────────────────────────────────

    let poller_handle = tokio::spawn(async move {
        poller.run(shutdown_rx).await;
    });

    // ── Start HTTP server ──────────────────────────────────────

    let router = nest_api::build_router(metrics);
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(addr = %listener.local_addr()?, "metrics server listening");

    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    let _ = poller_handle.await;

    info!("nest exporter stopped");
    Ok(())
}

/// Expand the `:port` shorthand to the IPv6 wildcard, which also accepts
/// IPv4 on dual-stack hosts. Anything else, hostnames included, is passed
/// to the resolver unchanged.
fn listen_address(s: &str) -> String {
    match s.strip_prefix(':') {
        Some(port) => format!("[::]:{port}"),
        None => s.to_string(),
    }
}
