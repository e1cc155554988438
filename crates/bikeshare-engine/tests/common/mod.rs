//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use bikeshare_cache::AvailabilityCache;
use bikeshare_core::EARTH_RADIUS_MILES;
use bikeshare_engine::{FingerprintSlots, QueryEngine, Reconciler};
use bikeshare_feed::{FeedClient, FeedClientConfig};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const FEED_PATH: &str = "/stations/";

pub struct Harness {
    pub server: MockServer,
    pub pool: SqlitePool,
    pub cache: AvailabilityCache,
    pub fingerprints: Arc<FingerprintSlots>,
    pub reconciler: Reconciler,
    pub query: QueryEngine,
}

impl Harness {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let pool = bikeshare_db::connect_memory_pool()
            .await
            .expect("memory pool");
        bikeshare_db::run_migrations(&pool)
            .await
            .expect("migrations");

        let cache = AvailabilityCache::new();
        let fingerprints = Arc::new(FingerprintSlots::new());
        let feed = FeedClient::new(
            FeedClientConfig::new(format!("{}{FEED_PATH}", server.uri())).with_timeout_secs(5),
        )
        .expect("feed client");
        let reconciler = Reconciler::new(feed, pool.clone(), cache.clone(), fingerprints.clone());
        let query = QueryEngine::new(pool.clone(), cache.clone());

        Self {
            server,
            pool,
            cache,
            fingerprints,
            reconciler,
            query,
        }
    }

    /// Replace whatever the feed currently serves with `body`.
    pub async fn serve(&self, body: &Value) {
        self.server.reset().await;
        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn serve_status(&self, status: u16) {
        self.server.reset().await;
        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}

pub fn popup(bikes: u32, docks: u32) -> String {
    format!(
        "<div class=\"station-popup\">\
           <span class=\"station-bikes\"><b>{bikes}</b> bikes</span>\
           <span class=\"station-docks\"><b>{docks}</b> docks</span>\
         </div>"
    )
}

pub fn station(
    id: &str,
    name: &str,
    station_type: &str,
    location: [f64; 2],
    bikes: u32,
    docks: u32,
) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} dock"),
        "type": station_type,
        "stationStockingStatus": "STOCKED",
        "hasKiosk": true,
        "hasCardReader": true,
        "location": location,
        "popup": popup(bikes, docks),
    })
}

/// Longitude offset along the equator that is `miles` away from 0°E.
pub fn equator_offset(miles: f64) -> f64 {
    miles / (EARTH_RADIUS_MILES * std::f64::consts::PI / 180.0)
}

pub fn baltimore_feed() -> Value {
    json!([
        station("st-1", "Penn Station", "OPEN", [39.3073, -76.6157], 4, 11),
        station("st-2", "Fells Point", "OPEN", [39.2826, -76.5930], 0, 15),
        station("st-3", "Inner Harbor", "CLOSED", [39.2858, -76.6131], 2, 8),
    ])
}
