//! joblog server - serves cleaned CI job logs and their editor decorations.

use anyhow::Result;
use axum::Router;
use clap::Parser;
use joblog_server::{config, logging, routes, state};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use config::Config;
use logging::{LogConfig, LogFormat, LogPreset};
use state::AppState;

/// joblog server - CI job log viewer backend.
#[derive(Parser, Debug)]
#[command(name = "joblog-server")]
#[command(about = "HTTP server that cleans CI job logs and resolves their colors and folds")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override port from config
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the logs directory from config
    #[arg(long, value_name = "DIR")]
    logs_dir: Option<PathBuf>,

    /// Enable verbose logging (INFO level for most targets)
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging (DEBUG level)
    #[arg(short, long)]
    debug: bool,

    /// Enable trace logging (TRACE level for everything)
    #[arg(long)]
    trace: bool,

    /// Quiet mode (WARN and ERROR only)
    #[arg(short, long)]
    quiet: bool,

    /// Set log level for specific targets (e.g., "parser=debug" or "cache=trace")
    /// Can be specified multiple times. Targets are prefixed with "joblog::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL")]
    log_overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::new(
        LogPreset::from_flags(cli.verbose, cli.debug, cli.trace, cli.quiet),
        &cli.log_overrides,
        cli.log_format,
    );
    logging::init(&log_config);

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(logs_dir) = cli.logs_dir {
        config.logs_dir = logs_dir;
    }

    tracing::info!(
        target: "joblog::startup",
        "Loaded configuration (port: {}, logs: {})",
        config.port,
        config.logs_dir.display()
    );

    let state = Arc::new(AppState::new(config.clone())?);
    tracing::info!(target: "joblog::startup", "Initialized application state");

    let app = Router::new()
        .nest("/api", routes::api_router())
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!(target: "joblog::startup", "Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
