//! prio-server - Workshop prioritization service
//!
//! Runs voting sessions over HTTP: hosts set up features, participants
//! allocate points, and everyone reads rankings and consensus metrics.

use anyhow::{Context, Result};
use clap::Parser;
use prio_common::config::{ConfigOverrides, ServerConfig};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prio_server::{build_router, AppState};

/// Command-line arguments for prio-server
#[derive(Parser, Debug)]
#[command(name = "prio-server")]
#[command(about = "Workshop prioritization voting service")]
#[command(version)]
struct Args {
    /// TOML configuration file (default: <config dir>/prio/config.toml)
    #[arg(short, long, env = "PRIO_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind
    #[arg(long, env = "PRIO_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PRIO_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(short, long, env = "PRIO_DATABASE")]
    database: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PRIO_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            bind_address: self.bind.clone(),
            port: self.port,
            database_path: self.database.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is resolved before logging starts so the level can come from it;
    // warnings emitted during resolution are therefore not shown.
    let config = ServerConfig::load(&args.overrides());

    let level = &config.logging.level;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("prio_server={level},prio_common={level},tower_http={level}").into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting prio-server v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.listen_address()
    );
    info!("Database path: {}", config.database_path.display());

    let pool = match prio_common::db::init_database(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(pool.clone(), config.voting.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_address())
        .await
        .context("Failed to bind to address")?;
    info!("prio-server listening on http://{}", config.listen_address());
    info!("Health check: http://{}/health", config.listen_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
