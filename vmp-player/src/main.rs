//! VMP Player - Main entry point
//!
//! Unattended background-music player core for venues: loads the venue's
//! music configuration, keeps a time-of-day-aware playlist scheduled and
//! its media downloaded ahead of playback, and serves a read-only status
//! interface.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vmp_common::config::PlayerConfig;
use vmp_common::fs::ensure_dir;
use vmp_common::time::SystemClock;
use vmp_common::Error;
use vmp_player::api;
use vmp_player::catalog::{CatalogService, HttpCatalog};
use vmp_player::download::{Downloader, HttpTransport};
use vmp_player::playlist::Scheduler;
use vmp_player::state::SharedState;

/// How long startup waits for the first track before giving up on the log
/// message (the download itself keeps going regardless)
const FIRST_TRACK_WAIT: Duration = Duration::from_secs(120);
const FIRST_TRACK_POLL: Duration = Duration::from_millis(500);

/// Command-line arguments for vmp-player
#[derive(Parser, Debug)]
#[command(name = "vmp-player")]
#[command(about = "Background music player core for venues")]
#[command(version)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "VMP_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "VMP_PORT")]
    port: Option<u16>,

    /// Base URL of the venue platform API (overrides the config file)
    #[arg(long, env = "VMP_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Root directory for cached media (overrides the config file)
    #[arg(long, env = "VMP_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vmp_player=debug,vmp_common=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = PlayerConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(api_base_url) = args.api_base_url {
        config.api_base_url = api_base_url;
    }
    if let Some(cache_dir) = args.cache_dir {
        config.cache_dir = cache_dir;
    }

    info!("Starting VMP Player on port {}", config.port);
    info!("Cache directory: {}", config.cache_dir.display());

    // The media cache directory is the one piece of local state the player
    // cannot run without
    let media_dir = config.cache_dir.join("media");
    ensure_dir(&media_dir).context("Failed to create media cache directory")?;

    let state = Arc::new(SharedState::new());
    let cancel = CancellationToken::new();

    // Initial catalog load; failure is non-fatal, the refresh loop retries
    let catalog = CatalogService::new(
        state.clone(),
        Arc::new(HttpCatalog::new(config.api_base_url.clone())),
        Duration::from_secs(config.catalog_refresh_secs),
    );
    if let Err(err) = catalog.load().await {
        warn!(%err, "initial music data load failed; retrying on refresh interval");
    }
    tokio::spawn(catalog.run(cancel.child_token()));

    // Background services
    let scheduler = Scheduler::new(
        state.clone(),
        Arc::new(SystemClock),
        config.playlist_length,
        Duration::from_millis(config.scheduler_tick_ms),
    );
    tokio::spawn(scheduler.run(cancel.child_token()));

    let downloader = Downloader::new(
        state.clone(),
        Arc::new(HttpTransport::new()),
        media_dir,
        Duration::from_millis(config.downloader_tick_ms),
    );
    tokio::spawn(downloader.run(cancel.child_token()));

    // Log the "waiting for first track" phase without blocking startup
    {
        let state = state.clone();
        let token = cancel.child_token();
        tokio::spawn(async move {
            match state
                .wait_first_track_ready(FIRST_TRACK_WAIT, FIRST_TRACK_POLL, &token)
                .await
            {
                Ok(()) | Err(Error::Cancelled) => {}
                Err(err) => warn!(%err, "first track still not ready"),
            }
        });
    }

    // HTTP status interface
    let app = api::create_router(api::AppState {
        state,
        port: config.port,
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop the background services promptly
    cancel.cancel();

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
