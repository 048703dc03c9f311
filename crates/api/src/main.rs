use anyhow::{Context, Result};
use persistence::{
    FixtureSource, HttpFixtureSource, InMemoryKeyValueStore, KeyValueStore, ReferenceStore,
    StaticFixtureSource,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use fleet_beacon_api::app;
use fleet_beacon_api::config::{Config, StorageBackend};
use fleet_beacon_api::feed::{FeedPoller, HttpBeaconFeed};
use fleet_beacon_api::middleware;
use fleet_beacon_api::services::TrackingService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics().context("Failed to install Prometheus recorder")?;

    info!("Starting Fleet Beacon API v{}", env!("CARGO_PKG_VERSION"));

    let kv: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; table edits are lost on restart");
            Arc::new(InMemoryKeyValueStore::new())
        }
        StorageBackend::Postgres => {
            let db_config: persistence::db::DatabaseConfig = (&config.storage.database).into();
            Arc::new(persistence::db::connect_kv_store(&db_config).await?)
        }
    };

    let fixtures: Arc<dyn FixtureSource> = if config.fixtures.base_url.is_empty() {
        info!("No fixture base URL configured; tables start empty");
        Arc::new(StaticFixtureSource::empty())
    } else {
        Arc::new(HttpFixtureSource::new(
            config.fixtures.base_url.clone(),
            Duration::from_millis(config.fixtures.timeout_ms),
        )?)
    };

    let store = ReferenceStore::new(kv, fixtures);
    let feed = Arc::new(HttpBeaconFeed::new(
        config.feed.url.clone(),
        config.feed.request_timeout(),
    )?);
    let service = Arc::new(TrackingService::new(store, feed));

    if let Err(e) = service.restore().await {
        warn!(error = %e, "Could not restore the previous map");
    }

    let poller = Arc::new(FeedPoller::new(service.clone(), config.feed.interval()));
    if config.feed.autostart {
        poller.start().await;
    }

    let app = app::create_app(config.clone(), service, poller.clone());

    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poller.stop().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
