//! Common test utilities for integration tests.
//!
//! Apps are built over the in-memory store, static fixtures and a scripted
//! feed, so no network or database is needed.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use chrono::{TimeZone, Utc};
use domain::models::{BeaconReader, BeaconSighting, Location, Vessel};
use fleet_beacon_api::{
    app::create_app,
    config::Config,
    feed::{testing::ScriptedFeed, FeedPoller},
    services::TrackingService,
};
use persistence::{InMemoryKeyValueStore, ReferenceStore, StaticFixtureSource};
use std::sync::Arc;
use std::time::Duration;

pub struct TestApp {
    pub router: Router,
    pub service: Arc<TrackingService>,
    pub poller: Arc<FeedPoller>,
    pub feed: ScriptedFeed,
}

impl TestApp {
    /// A fresh router over the same service; `oneshot` consumes routers.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

pub fn test_config() -> Config {
    Config::load_for_test(&[
        ("logging.level", "debug"),
        ("logging.format", "pretty"),
        ("feed.interval_ms", "50"),
        ("feed.request_timeout_ms", "40"),
    ])
    .expect("Failed to load test config")
}

pub fn dock() -> Location {
    Location {
        id: 1,
        name: "Dock".to_string(),
        latitude: 41.0,
        longitude: 29.0,
    }
}

pub fn alpha() -> Vessel {
    Vessel {
        id: 1,
        name: "Alpha".to_string(),
        mac: "V1".to_string(),
    }
}

pub fn dock_reader() -> BeaconReader {
    BeaconReader {
        id: 1,
        name: "Dock Gate".to_string(),
        location_id: 1,
        mac: "R1".to_string(),
    }
}

/// Fixtures for one location, one vessel and one reader.
pub fn seeded_fixtures() -> StaticFixtureSource {
    StaticFixtureSource::empty()
        .with_records(&[dock()])
        .with_records(&[alpha()])
        .with_records(&[dock_reader()])
}

pub fn sighting(kind: &str, mac: &str) -> BeaconSighting {
    BeaconSighting {
        time_stamp: Utc.with_ymd_and_hms(2019, 6, 14, 9, 30, 0).unwrap(),
        kind: kind.to_string(),
        mac: mac.to_string(),
        ble_name: String::new(),
        rssi: -60,
        raw_data: String::new(),
    }
}

/// Gateway R1, vessel V1, and one sighting nobody knows.
pub fn dock_batch() -> Vec<BeaconSighting> {
    vec![
        sighting("Gateway", "R1"),
        sighting("iBeacon", "V1"),
        sighting("iBeacon", "UNKNOWN"),
    ]
}

pub fn create_test_app(fixtures: StaticFixtureSource, feed: ScriptedFeed) -> TestApp {
    let config = test_config();
    let store = ReferenceStore::new(Arc::new(InMemoryKeyValueStore::new()), Arc::new(fixtures));
    let service = Arc::new(TrackingService::new(store, Arc::new(feed.clone())));
    let poller = Arc::new(FeedPoller::new(service.clone(), Duration::from_millis(50)));
    let router = create_app(config, service.clone(), poller.clone());

    TestApp {
        router,
        service,
        poller,
        feed,
    }
}

/// App seeded with the Dock fixtures and a feed that always returns `dock_batch()`.
pub fn create_seeded_app() -> TestApp {
    create_test_app(seeded_fixtures(), ScriptedFeed::always(dock_batch()))
}

/// Build a JSON request.
pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a bodiless request.
pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    empty_request(Method::GET, uri)
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}
