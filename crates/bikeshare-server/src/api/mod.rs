mod stations;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use bikeshare_cache::AvailabilityCache;
use bikeshare_engine::{FeedSlot, FingerprintSlots, QueryEngine, QueryError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub query: QueryEngine,
    pub cache: AvailabilityCache,
    pub fingerprints: Arc<FingerprintSlots>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    cached_stations: usize,
    indexed_stations: usize,
    catalog_fingerprint: bool,
    counts_fingerprint: bool,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_query_error(request_id: String, error: QueryError) -> ApiError {
    let message = error.to_string();
    match error {
        QueryError::StationNotFound(_) | QueryError::NoStationFound => {
            ApiError::new(request_id, "not_found", message)
        }
        QueryError::InvalidQuery(reason) => ApiError::new(request_id, "bad_request", reason),
        QueryError::Store(e) => {
            tracing::error!(error = %e, "database query failed");
            ApiError::new(request_id, "internal_error", "database query failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/stations", get(stations::list_open_stations))
        .route(
            "/api/v1/stations/nearest",
            get(stations::nearest_open_station),
        )
        .route("/api/v1/stations/{name}", get(stations::get_station))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let database = match bikeshare_db::health_check(&state.pool).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            "unavailable"
        }
    };
    let status = if database == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ApiResponse {
            data: HealthData {
                status: if database == "ok" { "ok" } else { "degraded" },
                database,
                cached_stations: state.cache.len(),
                indexed_stations: state.cache.indexed_len(),
                catalog_fingerprint: state.fingerprints.get(FeedSlot::Catalog).is_some(),
                counts_fingerprint: state.fingerprints.get(FeedSlot::Counts).is_some(),
            },
            meta,
        }),
    )
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
