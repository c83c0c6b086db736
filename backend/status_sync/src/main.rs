//! Collaboreum status sync entry point.
//!
//! Starts a background refresher that mirrors funding projects from the
//! platform API into SQLite and re-derives their displayed status on a fixed
//! timer. Simultaneously exposes a small Axum REST API that serves status
//! badges and progress figures to the frontend.

mod api;
mod config;
mod db;
mod errors;
mod records;
mod refresher;
mod upstream;


use std::sync::Arc;

use reqwest::Client;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use refresher::{StatusRefresher, SyncState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    let pool = db::init_pool(&config.database_url).await?;

    // HTTP client shared between the refresher and the API's upstream fallback.
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
        .build()?;

    let projects = Arc::new(RwLock::new(Vec::new()));

    // ─── Background refresher ─────────────────────────────
    let refresher = StatusRefresher::start(Arc::new(SyncState {
        pool: pool.clone(),
        config: config.clone(),
        client: client.clone(),
        projects: projects.clone(),
    }));

    // ─── REST API ─────────────────────────────────────────
    let api_state = Arc::new(api::ApiState {
        pool,
        projects,
        client,
        config: config.clone(),
    });

    let app = api::router(api_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    refresher.stop().await;
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
