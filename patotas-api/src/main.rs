use anyhow::{Context, Result};
use clap::Parser;
use patotas_api::events::log_session_changes;
use patotas_api::{build_router, AppState, Shutdown};
use patotas_core::config::Config;
use patotas_core::logging::{init_logging_with_config, LogConfig};
use patotas_core::metrics::{init_metrics, install_prometheus_exporter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "patotas-api")]
#[command(about = "Patotas HTTP API server", long_about = None)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the config
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
    config.validate()?;

    init_logging_with_config(LogConfig::try_from(&config.logging)?)?;

    if config.metrics.enabled {
        install_prometheus_exporter(&config.metrics)?;
        info!(address = %config.metrics.bind_address, "Prometheus exporter listening");
    } else {
        init_metrics();
    }

    let state = Arc::new(AppState::open(&config).context("opening database")?);
    let shutdown = Shutdown::new(config.server.shutdown_timeout);

    tokio::spawn(log_session_changes(
        state.identity.subscribe(),
        shutdown.subscribe(),
    ));

    let listener = TcpListener::bind(config.server.bind_address)
        .await
        .with_context(|| format!("binding {}", config.server.bind_address))?;
    info!(address = %config.server.bind_address, "Patotas API listening");

    let router = build_router(state);
    let waiter = shutdown.wait();
    let mut server =
        tokio::spawn(async move { axum::serve(listener, router).with_graceful_shutdown(waiter).await });

    tokio::select! {
        result = &mut server => {
            result??;
            return Ok(());
        }
        signal = tokio::signal::ctrl_c() => signal?,
    }

    shutdown.trigger();
    match tokio::time::timeout(shutdown.timeout(), server).await {
        Ok(result) => result??,
        Err(_) => warn!("Shutdown timeout elapsed with requests still in flight"),
    }

    info!("Shutdown complete");
    Ok(())
}
