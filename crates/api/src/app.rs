use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::feed::FeedPoller;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{feed, health, locations, map, readers, sightings, vessels};
use crate::services::TrackingService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TrackingService>,
    pub poller: Arc<FeedPoller>,
    pub config: Arc<Config>,
}

pub fn create_app(config: Config, service: Arc<TrackingService>, poller: Arc<FeedPoller>) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        service,
        poller,
        config: config.clone(),
    };

    // Build CORS layer based on configuration
    let cors = if config.server.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .server
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Dashboard routes
    let dashboard_routes = Router::new()
        .route("/api/v1/map", get(map::get_map))
        .route("/api/v1/sightings", get(sightings::latest_sightings))
        .route(
            "/api/v1/locations",
            get(locations::list_locations).post(locations::create_location),
        )
        .route(
            "/api/v1/locations/:id",
            put(locations::update_location).delete(locations::delete_location),
        )
        .route(
            "/api/v1/vessels",
            get(vessels::list_vessels).post(vessels::create_vessel),
        )
        .route(
            "/api/v1/vessels/:id",
            put(vessels::update_vessel).delete(vessels::delete_vessel),
        )
        .route(
            "/api/v1/readers",
            get(readers::list_readers).post(readers::create_reader),
        )
        .route(
            "/api/v1/readers/:id",
            put(readers::update_reader).delete(readers::delete_reader),
        );

    // Feed control routes
    let feed_routes = Router::new()
        .route("/api/v1/feed/start", post(feed::start_feed))
        .route("/api/v1/feed/stop", post(feed::stop_feed))
        .route("/api/v1/feed/poll", post(feed::poll_feed))
        .route("/api/v1/feed/status", get(feed::feed_status));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(dashboard_routes)
        .merge(feed_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
