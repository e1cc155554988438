use std::f64::consts::PI;

use bikeshare_core::{GeoPoint, StationCounts, EARTH_RADIUS_MILES};

use super::*;

fn point(latitude: f64, longitude: f64) -> GeoPoint {
    GeoPoint::new(latitude, longitude).expect("valid point")
}

/// Longitude offset along the equator that is `miles` away from 0°E.
fn equator_offset(miles: f64) -> f64 {
    miles / (EARTH_RADIUS_MILES * PI / 180.0)
}

#[test]
fn unknown_station_has_no_counts() {
    let cache = AvailabilityCache::new();
    assert_eq!(cache.counts("Pier 1"), None);
    assert!(cache.is_empty());
}

#[test]
fn set_counts_replaces_whole_snapshot() {
    let cache = AvailabilityCache::new();
    cache.set_counts("Pier 1", StationCounts { bikes: 3, docks: 9 });
    cache.set_counts("Pier 1", StationCounts { bikes: 0, docks: 12 });

    assert_eq!(
        cache.counts("Pier 1"),
        Some(StationCounts { bikes: 0, docks: 12 })
    );
    assert_eq!(cache.len(), 1);
}

#[test]
fn zero_counts_are_distinct_from_unknown() {
    let cache = AvailabilityCache::new();
    cache.set_counts("Canton", StationCounts { bikes: 0, docks: 0 });
    assert_eq!(
        cache.counts("Canton"),
        Some(StationCounts { bikes: 0, docks: 0 })
    );
}

#[test]
fn clones_share_state() {
    let cache = AvailabilityCache::new();
    let handle = cache.clone();
    handle.set_counts("Canton", StationCounts { bikes: 1, docks: 2 });
    assert!(cache.counts("Canton").is_some());
}

#[test]
fn reindexing_moves_point_but_keeps_sequence() {
    let cache = AvailabilityCache::new();
    cache.index_location("A", point(0.0, 0.0));
    cache.index_location("B", point(0.0, 0.1));
    cache.index_location("A", point(1.0, 1.0));

    let a = cache.location("A").expect("indexed");
    assert_eq!(a.seq, 0);
    assert_eq!(a.point, point(1.0, 1.0));
    assert_eq!(cache.location("B").expect("indexed").seq, 1);
    assert_eq!(cache.indexed_len(), 2);
}

#[test]
fn results_are_ordered_by_distance() {
    let cache = AvailabilityCache::new();
    cache.index_location("far", point(0.0, equator_offset(3.0)));
    cache.index_location("near", point(0.0, equator_offset(1.0)));
    cache.index_location("mid", point(0.0, equator_offset(2.0)));

    let names: Vec<_> = cache
        .nearest_within_radius(&point(0.0, 0.0), 10.0, 10)
        .into_iter()
        .map(|hit| hit.name)
        .collect();
    assert_eq!(names, vec!["near", "mid", "far"]);
}

#[test]
fn radius_boundary_is_respected() {
    let cache = AvailabilityCache::new();
    cache.index_location("inside", point(0.0, equator_offset(9.99)));
    cache.index_location("outside", point(0.0, equator_offset(10.01)));

    let hits = cache.nearest_within_radius(&point(0.0, 0.0), 10.0, 10);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "inside");
    assert!((hits[0].distance_miles - 9.99).abs() < 1e-6);
}

#[test]
fn equal_distances_keep_index_order() {
    let cache = AvailabilityCache::new();
    cache.index_location("east", point(0.0, 0.01));
    cache.index_location("west", point(0.0, -0.01));
    cache.index_location("north", point(0.01, 0.0));

    let names: Vec<_> = cache
        .nearest_within_radius(&point(0.0, 0.0), 10.0, 2)
        .into_iter()
        .map(|hit| hit.name)
        .collect();
    assert_eq!(names, vec!["east", "west"]);
}

#[test]
fn limit_caps_result_count() {
    let cache = AvailabilityCache::new();
    for i in 0..5 {
        cache.index_location(&format!("s{i}"), point(0.0, f64::from(i) * 0.001));
    }

    assert_eq!(
        cache.nearest_within_radius(&point(0.0, 0.0), 10.0, 3).len(),
        3
    );
    assert!(cache
        .nearest_within_radius(&point(0.0, 0.0), 10.0, 0)
        .is_empty());
}

#[test]
fn empty_index_returns_nothing() {
    let cache = AvailabilityCache::new();
    assert!(cache
        .nearest_within_radius(&point(39.29, -76.61), 10.0, 10)
        .is_empty());
}

#[test]
fn snapshot_names_are_sorted() {
    let cache = AvailabilityCache::new();
    cache.set_counts("b", StationCounts { bikes: 1, docks: 1 });
    cache.set_counts("a", StationCounts { bikes: 1, docks: 1 });
    assert_eq!(cache.snapshot_names(), vec!["a", "b"]);
}

#[tokio::test]
async fn concurrent_writers_and_readers_see_whole_snapshots() {
    let cache = AvailabilityCache::new();
    let writer = {
        let cache = cache.clone();
        tokio::spawn(async move {
            for n in 0..500_u32 {
                cache.set_counts("Pier 1", StationCounts { bikes: n, docks: n });
                tokio::task::yield_now().await;
            }
        })
    };

    for _ in 0..500 {
        if let Some(counts) = cache.counts("Pier 1") {
            assert_eq!(counts.bikes, counts.docks);
        }
        tokio::task::yield_now().await;
    }
    writer.await.expect("writer task");
}
