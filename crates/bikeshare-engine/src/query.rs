//! Read side: station lookups composed from catalog rows and cached counts.
//!
//! Queries never fetch the feed or wait for a refresh pass.

use bikeshare_cache::AvailabilityCache;
use bikeshare_core::{GeoPoint, StationRecord};
use bikeshare_db::{DbError, StationRow};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::QueryError;

pub const DEFAULT_RADIUS_MILES: f64 = 10.0;
pub const DEFAULT_LIMIT: usize = 10;

/// A station with its current availability.
///
/// `bikes`/`docks` serialize as `null` when the station has no snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationView {
    #[serde(flatten)]
    pub station: StationRecord,
    pub bikes: Option<u32>,
    pub docks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

/// Parameters of a nearest-station search. Unset radius and limit fall back
/// to the engine defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NearestQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_miles: Option<f64>,
    pub limit: Option<usize>,
}

impl NearestQuery {
    #[must_use]
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryEngine {
    pool: SqlitePool,
    cache: AvailabilityCache,
    default_radius_miles: f64,
    default_limit: usize,
}

impl QueryEngine {
    #[must_use]
    pub fn new(pool: SqlitePool, cache: AvailabilityCache) -> Self {
        Self {
            pool,
            cache,
            default_radius_miles: DEFAULT_RADIUS_MILES,
            default_limit: DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub fn with_defaults(mut self, radius_miles: f64, limit: usize) -> Self {
        self.default_radius_miles = radius_miles;
        self.default_limit = limit;
        self
    }

    /// Every OPEN station in feed order.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Store`] if the catalog cannot be read.
    pub async fn list_open_stations(&self) -> Result<Vec<StationView>, QueryError> {
        let rows = bikeshare_db::list_open_stations(&self.pool).await?;
        Ok(rows.into_iter().map(|row| self.view(row, None)).collect())
    }

    /// Any known station by exact name, OPEN or not.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::StationNotFound`] if no station has the name.
    pub async fn station_by_name(&self, name: &str) -> Result<StationView, QueryError> {
        match bikeshare_db::get_station_by_name(&self.pool, name).await {
            Ok(row) => Ok(self.view(row, None)),
            Err(DbError::NotFound) => Err(QueryError::StationNotFound(name.to_string())),
            Err(e) => Err(QueryError::Store(e)),
        }
    }

    /// The nearest OPEN station within the query radius.
    ///
    /// # Errors
    ///
    /// - [`QueryError::InvalidQuery`] if a coordinate is missing or out of
    ///   range, or radius/limit are not positive.
    /// - [`QueryError::NoStationFound`] if no OPEN station is in range.
    pub async fn nearest_open_station(
        &self,
        query: &NearestQuery,
    ) -> Result<StationView, QueryError> {
        let origin = validate_origin(query)?;
        let radius_miles = query.radius_miles.unwrap_or(self.default_radius_miles);
        if !radius_miles.is_finite() || radius_miles <= 0.0 {
            return Err(QueryError::InvalidQuery(format!(
                "radius_miles must be a positive number, got {radius_miles}"
            )));
        }
        let limit = query.limit.unwrap_or(self.default_limit);
        if limit == 0 {
            return Err(QueryError::InvalidQuery(
                "limit must be at least 1".to_string(),
            ));
        }

        let candidates = self
            .cache
            .nearest_within_radius(&origin, radius_miles, limit);
        if candidates.is_empty() {
            tracing::info!(
                latitude = origin.latitude(),
                longitude = origin.longitude(),
                radius_miles,
                "query: no stations within radius"
            );
            return Err(QueryError::NoStationFound);
        }

        for candidate in &candidates {
            match bikeshare_db::get_open_station_by_name(&self.pool, &candidate.name).await {
                Ok(row) => return Ok(self.view(row, Some(candidate.distance_miles))),
                Err(DbError::NotFound) => {
                    tracing::debug!(
                        station = %candidate.name,
                        distance_miles = candidate.distance_miles,
                        "query: candidate not open, skipped"
                    );
                }
                Err(e) => return Err(QueryError::Store(e)),
            }
        }

        tracing::info!(
            candidates = candidates.len(),
            radius_miles,
            "query: no open station among candidates"
        );
        Err(QueryError::NoStationFound)
    }

    fn view(&self, row: StationRow, distance_miles: Option<f64>) -> StationView {
        let counts = self.cache.counts(&row.name);
        StationView {
            station: StationRecord::from(row),
            bikes: counts.map(|c| c.bikes),
            docks: counts.map(|c| c.docks),
            distance_miles,
        }
    }
}

fn validate_origin(query: &NearestQuery) -> Result<GeoPoint, QueryError> {
    let latitude = query
        .latitude
        .ok_or_else(|| QueryError::InvalidQuery("latitude is required".to_string()))?;
    let longitude = query
        .longitude
        .ok_or_else(|| QueryError::InvalidQuery("longitude is required".to_string()))?;
    GeoPoint::new(latitude, longitude).map_err(|e| QueryError::InvalidQuery(e.to_string()))
}
