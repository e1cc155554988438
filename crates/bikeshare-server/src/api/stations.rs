use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use bikeshare_engine::{NearestQuery, StationView};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_query_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Raw query string for `/stations/nearest`. Values stay strings so a
/// malformed number is reported as `bad_request` with our own message.
#[derive(Debug, Default, Deserialize)]
pub(super) struct NearestParams {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub radius_miles: Option<String>,
    pub limit: Option<String>,
}

impl NearestParams {
    fn parse(&self) -> Result<NearestQuery, String> {
        Ok(NearestQuery {
            latitude: parse_param("latitude", self.latitude.as_deref())?,
            longitude: parse_param("longitude", self.longitude.as_deref())?,
            radius_miles: parse_param("radius_miles", self.radius_miles.as_deref())?,
            limit: parse_param("limit", self.limit.as_deref())?,
        })
    }
}

fn parse_param<T: std::str::FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| format!("{name} must be a number, got {value:?}")),
    }
}

pub(super) async fn list_open_stations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<StationView>>>, ApiError> {
    let data = state
        .query
        .list_open_stations()
        .await
        .map_err(|e| map_query_error(req_id.0.clone(), e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_station(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<StationView>>, ApiError> {
    let data = state
        .query
        .station_by_name(&name)
        .await
        .map_err(|e| map_query_error(req_id.0.clone(), e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn nearest_open_station(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<NearestParams>,
) -> Result<Json<ApiResponse<StationView>>, ApiError> {
    let query = params
        .parse()
        .map_err(|message| ApiError::new(req_id.0.clone(), "bad_request", message))?;

    let data = state
        .query
        .nearest_open_station(&query)
        .await
        .map_err(|e| map_query_error(req_id.0.clone(), e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
