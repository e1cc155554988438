//! Database operations for the `stations` catalog table.

use bikeshare_core::{StationRecord, StationType};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::DbError;

const STATION_COLUMNS: &str = "id, name, station_stocking_status, description, has_kiosk, \
     has_card_reader, station_type, latitude, longitude, feed_position, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `stations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StationRow {
    pub id: String,
    pub name: String,
    pub station_stocking_status: String,
    pub description: String,
    pub has_kiosk: bool,
    pub has_card_reader: bool,
    pub station_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub feed_position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog coordinates of one station name.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StationLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl StationRow {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.station_type == StationType::Open.as_str()
    }
}

impl From<StationRow> for StationRecord {
    fn from(row: StationRow) -> Self {
        StationRecord {
            id: row.id,
            name: row.name,
            status: row.station_stocking_status,
            description: row.description,
            has_kiosk: row.has_kiosk,
            has_card_reader: row.has_card_reader,
            station_type: StationType::from(row.station_type),
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Insert or update every record in a single transaction.
///
/// Rows are keyed by `id`; an existing row has every column except `id` and
/// `created_at` overwritten, so running the same batch twice leaves the
/// catalog content unchanged. `feed_position` is the record's index in
/// `records`.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails, including a second OPEN
/// station claiming an existing OPEN name. Nothing is committed in that case.
pub async fn upsert_stations(
    pool: &SqlitePool,
    records: &[StationRecord],
) -> Result<usize, DbError> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;

    for (position, record) in records.iter().enumerate() {
        let feed_position = i64::try_from(position).unwrap_or(i64::MAX);
        sqlx::query(
            "INSERT INTO stations \
               (id, name, station_stocking_status, description, has_kiosk, has_card_reader, \
                station_type, latitude, longitude, feed_position, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11) \
             ON CONFLICT (id) DO UPDATE SET \
               name = excluded.name, \
               station_stocking_status = excluded.station_stocking_status, \
               description = excluded.description, \
               has_kiosk = excluded.has_kiosk, \
               has_card_reader = excluded.has_card_reader, \
               station_type = excluded.station_type, \
               latitude = excluded.latitude, \
               longitude = excluded.longitude, \
               feed_position = excluded.feed_position, \
               updated_at = excluded.updated_at",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.status)
        .bind(&record.description)
        .bind(record.has_kiosk)
        .bind(record.has_card_reader)
        .bind(record.station_type.as_str())
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(feed_position)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(records.len())
}

/// Set the stocking status and station type of every row named `name`.
///
/// No other column is touched.
///
/// Returns the number of rows updated.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row has that exact name, or
/// [`DbError::Sqlx`] if the statement fails.
pub async fn update_status_and_type(
    pool: &SqlitePool,
    name: &str,
    status: &str,
    station_type: &StationType,
) -> Result<u64, DbError> {
    let result = sqlx::query(
        "UPDATE stations \
         SET station_stocking_status = ?1, station_type = ?2, updated_at = ?3 \
         WHERE name = ?4",
    )
    .bind(status)
    .bind(station_type.as_str())
    .bind(Utc::now())
    .bind(name)
    .execute(pool)
    .await?;

    match result.rows_affected() {
        0 => Err(DbError::NotFound),
        n => Ok(n),
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns every station in feed order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_stations(pool: &SqlitePool) -> Result<Vec<StationRow>, DbError> {
    let rows = sqlx::query_as::<_, StationRow>(&format!(
        "SELECT {STATION_COLUMNS} FROM stations ORDER BY feed_position, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the OPEN stations in feed order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_open_stations(pool: &SqlitePool) -> Result<Vec<StationRow>, DbError> {
    let rows = sqlx::query_as::<_, StationRow>(&format!(
        "SELECT {STATION_COLUMNS} FROM stations \
         WHERE station_type = 'OPEN' \
         ORDER BY feed_position, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the station with this exact (case-sensitive) name.
///
/// An OPEN row wins over rows of other types sharing the name; after that
/// the earliest in feed order is returned.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no station has the name, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_station_by_name(pool: &SqlitePool, name: &str) -> Result<StationRow, DbError> {
    sqlx::query_as::<_, StationRow>(&format!(
        "SELECT {STATION_COLUMNS} FROM stations \
         WHERE name = ?1 \
         ORDER BY (station_type = 'OPEN') DESC, feed_position, id \
         LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the OPEN station with this exact name.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if there is no OPEN station with the name,
/// or [`DbError::Sqlx`] if the query fails.
pub async fn get_open_station_by_name(
    pool: &SqlitePool,
    name: &str,
) -> Result<StationRow, DbError> {
    sqlx::query_as::<_, StationRow>(&format!(
        "SELECT {STATION_COLUMNS} FROM stations \
         WHERE name = ?1 AND station_type = 'OPEN'"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the number of catalog rows.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_stations(pool: &SqlitePool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stations")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Returns one catalog location per station name, sorted by name. When a
/// name has several rows the OPEN one wins, then feed order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_station_locations(pool: &SqlitePool) -> Result<Vec<StationLocation>, DbError> {
    let mut locations = sqlx::query_as::<_, StationLocation>(
        "SELECT name, latitude, longitude FROM stations \
         ORDER BY name, (station_type = 'OPEN') DESC, feed_position, id",
    )
    .fetch_all(pool)
    .await?;

    locations.dedup_by(|later, first| later.name == first.name);
    Ok(locations)
}

#[cfg(test)]
#[path = "stations_test.rs"]
mod tests;
