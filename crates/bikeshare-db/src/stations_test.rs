use bikeshare_core::{StationRecord, StationType};
use sqlx::SqlitePool;

use super::*;
use crate::{connect_memory_pool, run_migrations};

async fn test_pool() -> SqlitePool {
    let pool = connect_memory_pool().await.expect("memory pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}

fn record(id: &str, name: &str, station_type: StationType) -> StationRecord {
    StationRecord {
        id: id.to_string(),
        name: name.to_string(),
        status: "STOCKED".to_string(),
        description: format!("{name} description"),
        has_kiosk: true,
        has_card_reader: false,
        station_type,
        latitude: 39.29,
        longitude: -76.61,
    }
}

fn records(rows: Vec<StationRow>) -> Vec<StationRecord> {
    rows.into_iter().map(StationRecord::from).collect()
}

#[tokio::test]
async fn upsert_then_list_preserves_feed_order() {
    let pool = test_pool().await;
    let batch = vec![
        record("st-2", "Penn Station", StationType::Open),
        record("st-1", "Fells Point", StationType::Closed),
        record("st-3", "Inner Harbor", StationType::Open),
    ];

    let written = upsert_stations(&pool, &batch).await.expect("upsert");
    assert_eq!(written, 3);

    let listed = records(list_stations(&pool).await.expect("list"));
    assert_eq!(listed, batch);
    assert_eq!(count_stations(&pool).await.expect("count"), 3);
}

#[tokio::test]
async fn upsert_twice_leaves_identical_content() {
    let pool = test_pool().await;
    let batch = vec![
        record("st-1", "Penn Station", StationType::Open),
        record("st-2", "Fells Point", StationType::Open),
    ];

    upsert_stations(&pool, &batch).await.expect("first upsert");
    let first = records(list_stations(&pool).await.expect("list"));
    upsert_stations(&pool, &batch).await.expect("second upsert");
    let second = records(list_stations(&pool).await.expect("list"));

    assert_eq!(first, second);
    assert_eq!(count_stations(&pool).await.expect("count"), 2);
}

#[tokio::test]
async fn upsert_overwrites_metadata_but_keeps_created_at() {
    let pool = test_pool().await;
    upsert_stations(&pool, &[record("st-1", "Penn Station", StationType::Open)])
        .await
        .expect("insert");
    let before = get_station_by_name(&pool, "Penn Station")
        .await
        .expect("row");

    let mut moved = record("st-1", "Penn Station North", StationType::Open);
    moved.latitude = 39.31;
    upsert_stations(&pool, &[moved]).await.expect("update");

    let after = get_station_by_name(&pool, "Penn Station North")
        .await
        .expect("renamed row");
    assert_eq!(after.id, "st-1");
    assert!((after.latitude - 39.31).abs() < f64::EPSILON);
    assert_eq!(after.created_at, before.created_at);
    assert!(matches!(
        get_station_by_name(&pool, "Penn Station").await,
        Err(DbError::NotFound)
    ));
}

#[tokio::test]
async fn list_open_stations_excludes_other_types() {
    let pool = test_pool().await;
    upsert_stations(
        &pool,
        &[
            record("st-1", "Open One", StationType::Open),
            record("st-2", "Closed One", StationType::Closed),
            record("st-3", "Planned One", StationType::Other("PLANNED".to_string())),
        ],
    )
    .await
    .expect("upsert");

    let open = list_open_stations(&pool).await.expect("list open");
    let names: Vec<_> = open.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["Open One"]);
    assert!(open.iter().all(StationRow::is_open));
}

#[tokio::test]
async fn lookup_by_name_is_case_sensitive() {
    let pool = test_pool().await;
    upsert_stations(&pool, &[record("st-1", "Pier 1", StationType::Open)])
        .await
        .expect("upsert");

    assert!(get_station_by_name(&pool, "Pier 1").await.is_ok());
    assert!(matches!(
        get_station_by_name(&pool, "pier 1").await,
        Err(DbError::NotFound)
    ));
}

#[tokio::test]
async fn missing_name_is_not_found() {
    let pool = test_pool().await;
    assert!(matches!(
        get_station_by_name(&pool, "Pier 1").await,
        Err(DbError::NotFound)
    ));
}

#[tokio::test]
async fn open_row_wins_over_closed_namesake() {
    let pool = test_pool().await;
    upsert_stations(
        &pool,
        &[
            record("st-1", "Harbor East", StationType::Closed),
            record("st-2", "Harbor East", StationType::Open),
        ],
    )
    .await
    .expect("upsert");

    let row = get_station_by_name(&pool, "Harbor East")
        .await
        .expect("row");
    assert_eq!(row.id, "st-2");

    let open = get_open_station_by_name(&pool, "Harbor East")
        .await
        .expect("open row");
    assert_eq!(open.id, "st-2");
}

#[tokio::test]
async fn get_open_station_by_name_ignores_closed_rows() {
    let pool = test_pool().await;
    upsert_stations(&pool, &[record("st-1", "Canton", StationType::Closed)])
        .await
        .expect("upsert");

    assert!(matches!(
        get_open_station_by_name(&pool, "Canton").await,
        Err(DbError::NotFound)
    ));
}

#[tokio::test]
async fn duplicate_open_name_is_rejected_atomically() {
    let pool = test_pool().await;
    let result = upsert_stations(
        &pool,
        &[
            record("st-1", "Mount Vernon", StationType::Open),
            record("st-2", "Mount Vernon", StationType::Open),
        ],
    )
    .await;

    assert!(matches!(result, Err(DbError::Sqlx(_))), "got {result:?}");
    assert_eq!(count_stations(&pool).await.expect("count"), 0);
}

#[tokio::test]
async fn update_status_and_type_touches_only_those_columns() {
    let pool = test_pool().await;
    upsert_stations(&pool, &[record("st-1", "Federal Hill", StationType::Open)])
        .await
        .expect("upsert");

    let updated = update_status_and_type(&pool, "Federal Hill", "EMPTY", &StationType::Closed)
        .await
        .expect("update");
    assert_eq!(updated, 1);

    let row = get_station_by_name(&pool, "Federal Hill")
        .await
        .expect("row");
    assert_eq!(row.station_stocking_status, "EMPTY");
    assert_eq!(row.station_type, "CLOSED");
    assert_eq!(row.description, "Federal Hill description");
    assert!(row.has_kiosk);
    assert!(row.updated_at >= row.created_at);
}

#[tokio::test]
async fn update_unknown_name_is_not_found() {
    let pool = test_pool().await;
    let result = update_status_and_type(&pool, "Nowhere", "STOCKED", &StationType::Open).await;
    assert!(matches!(result, Err(DbError::NotFound)));
}

#[tokio::test]
async fn station_locations_are_one_per_name_open_row_first() {
    let pool = test_pool().await;
    let closed = StationRecord {
        latitude: 39.10,
        longitude: -76.10,
        ..record("st-1", "Harbor East", StationType::Closed)
    };
    let open = StationRecord {
        latitude: 39.20,
        longitude: -76.20,
        ..record("st-2", "Harbor East", StationType::Open)
    };
    upsert_stations(
        &pool,
        &[closed, open, record("st-3", "Canton", StationType::Open)],
    )
    .await
    .expect("upsert");

    let locations = list_station_locations(&pool).await.expect("locations");
    let names: Vec<_> = locations.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Canton", "Harbor East"]);
    assert_eq!(
        locations[1],
        StationLocation {
            name: "Harbor East".to_string(),
            latitude: 39.20,
            longitude: -76.20,
        }
    );
}

#[tokio::test]
async fn closed_pool_reports_write_failure() {
    let pool = test_pool().await;
    pool.close().await;

    let result = upsert_stations(&pool, &[record("st-1", "Canton", StationType::Open)]).await;
    assert!(matches!(result, Err(DbError::Sqlx(_))));
}
