//! String service HTTP server.
//!
//! Wires the base service through the logging and instrumenting decorators,
//! builds one endpoint per operation, and serves them over HTTP until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use stringsvc_core::BaseStringService;
use stringsvc_server::metrics::{install_prometheus, spawn_upkeep};
use stringsvc_server::{
    build_endpoints, decorate, MetricsConfig, NetworkConfig, NetworkModule, ServiceMetrics,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line and environment configuration.
#[derive(Debug, Parser)]
#[command(name = "stringsvc", about = "Uppercase and count strings over HTTP")]
struct Args {
    /// Address to bind.
    #[arg(long, env = "STRINGSVC_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "STRINGSVC_PORT", default_value_t = 3090)]
    port: u16,

    /// Request timeout in seconds.
    #[arg(long, env = "STRINGSVC_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    /// Metric name namespace.
    #[arg(long, env = "STRINGSVC_METRICS_NAMESPACE", default_value = "my_group")]
    metrics_namespace: String,

    /// Metric name subsystem.
    #[arg(long, env = "STRINGSVC_METRICS_SUBSYSTEM", default_value = "string_service")]
    metrics_subsystem: String,

    /// Emit logs as JSON lines.
    #[arg(long, env = "STRINGSVC_LOG_JSON")]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    // The recorder must be in place before instruments register descriptions.
    let prometheus = install_prometheus()?;
    let upkeep = spawn_upkeep(prometheus.clone(), Duration::from_secs(5));
    let metrics = ServiceMetrics::new(&MetricsConfig {
        namespace: args.metrics_namespace,
        subsystem: args.metrics_subsystem,
    });

    let service = Arc::new(decorate(BaseStringService, &metrics));
    let endpoints = build_endpoints(service);

    let config = NetworkConfig {
        host: args.host,
        port: args.port,
        request_timeout: Duration::from_secs(args.request_timeout_secs),
        ..NetworkConfig::default()
    };
    let mut network = NetworkModule::new(config, endpoints, metrics).with_prometheus(prometheus);
    let port = network.start().await?;
    info!(port, "string service listening");

    let served = network
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutdown signal received");
        })
        .await;

    upkeep.shutdown().await;
    served?;
    info!("string service stopped");
    Ok(())
}
