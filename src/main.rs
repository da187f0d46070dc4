use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

mod chart;
mod config;
mod dashboard;
mod db;
mod selection;
mod stats;

use config::{Backend, Config};
use dashboard::AppState;
use db::{DataAccess, PgStore, SqliteStore, StatsStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up DB_* and friends from a local .env before parsing arguments
    let _ = dotenvy::dotenv();

    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    // Open the stats store
    let store: Arc<dyn StatsStore> = match config.backend()? {
        Backend::Sqlite(path) => {
            let store = SqliteStore::open(&path)?;
            info!("SQLite database opened: {}", path);
            Arc::new(store)
        }
        Backend::Postgres(settings) => Arc::new(PgStore::connect_lazy(&settings)),
    };
    let data = DataAccess::new(store);

    if !config.images_dir.is_dir() {
        warn!(
            "Medal image directory {} not found; chart rendering will fail",
            config.images_dir.display()
        );
    }
    info!(
        "Medal layout: {:?}, images from {}",
        config.medal_layout,
        config.images_dir.display()
    );

    // Start the dashboard HTTP server
    let app = dashboard::router(AppState {
        data: data.clone(),
        images_dir: config.images_dir.clone(),
        medal_layout: config.medal_layout,
        season_label: config.season_label.clone(),
    });
    let addr: SocketAddr = config.dashboard_addr.parse()?;
    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run dashboard server until Ctrl-C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    data.close().await;
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
