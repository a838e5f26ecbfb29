//! vendorscope Server
//!
//! Runs vendor-usage checks over public web sources and serves them over
//! HTTP.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

use vendorscope_server::{build_engine, create_router, AppState, Cli, Credentials, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    info!("Starting vendorscope server");

    let config = ServerConfig::load(&cli)?;
    let credentials = Credentials::from_env();
    info!(
        config = %cli.config,
        policy = config.policy_path.as_deref().unwrap_or("built-in"),
        profile = config.profile_path.as_deref().unwrap_or("built-in"),
        "Configuration loaded"
    );

    let metrics_handle = init_metrics()?;

    let engine = build_engine(&config, &credentials).await?;
    let state = AppState::new(engine).with_metrics(metrics_handle);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", cli.listen, cli.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("vendorscope=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vendorscope=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "vendorscope_runs_total",
        "Usage-check runs by outcome"
    );
    metrics::describe_counter!(
        "vendorscope_cache_hits_total",
        "Runs answered from the result cache"
    );
    metrics::describe_counter!(
        "vendorscope_queries_total",
        "Search provider queries issued"
    );
    metrics::describe_counter!(
        "vendorscope_evidence_total",
        "Accepted evidence items by match type"
    );
    metrics::describe_counter!(
        "vendorscope_rejections_total",
        "Rejected search results by reason"
    );
    metrics::describe_histogram!(
        "vendorscope_run_duration_ms",
        metrics::Unit::Milliseconds,
        "Usage-check run duration in milliseconds"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
