//! In-process availability cache: live bike/dock counts plus a geospatial
//! index, both keyed by station name.
//!
//! Uses `DashMap` so query handlers read concurrently with a refresh pass
//! writing; every write replaces one key atomically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bikeshare_core::{GeoPoint, StationCounts};
use dashmap::DashMap;
use serde::Serialize;

/// A station's indexed location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoIndexEntry {
    pub point: GeoPoint,
    /// Order in which the name was first indexed; breaks distance ties.
    pub seq: u64,
}

/// One result of a radius search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyStation {
    pub name: String,
    pub distance_miles: f64,
}

#[derive(Debug, Default)]
struct Inner {
    counts: DashMap<String, StationCounts>,
    geo: DashMap<String, GeoIndexEntry>,
    next_seq: AtomicU64,
}

/// Shared handle to the cache. Clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityCache {
    inner: Arc<Inner>,
}

impl AvailabilityCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot for `name`.
    pub fn set_counts(&self, name: &str, counts: StationCounts) {
        self.inner.counts.insert(name.to_string(), counts);
    }

    /// Current snapshot, or `None` when the station has never been counted.
    #[must_use]
    pub fn counts(&self, name: &str) -> Option<StationCounts> {
        self.inner.counts.get(name).map(|entry| *entry.value())
    }

    /// Insert or move the indexed location of `name`.
    ///
    /// A name keeps the sequence number it was first indexed with.
    pub fn index_location(&self, name: &str, point: GeoPoint) {
        self.inner
            .geo
            .entry(name.to_string())
            .and_modify(|entry| entry.point = point)
            .or_insert_with(|| GeoIndexEntry {
                point,
                seq: self.inner.next_seq.fetch_add(1, Ordering::Relaxed),
            });
    }

    #[must_use]
    pub fn location(&self, name: &str) -> Option<GeoIndexEntry> {
        self.inner.geo.get(name).map(|entry| *entry.value())
    }

    /// Up to `limit` indexed stations within `radius_miles` of `origin`,
    /// nearest first. Equal distances keep first-indexed order.
    #[must_use]
    pub fn nearest_within_radius(
        &self,
        origin: &GeoPoint,
        radius_miles: f64,
        limit: usize,
    ) -> Vec<NearbyStation> {
        if limit == 0 {
            return Vec::new();
        }

        let mut candidates: Vec<(f64, u64, String)> = self
            .inner
            .geo
            .iter()
            .filter_map(|entry| {
                let distance = origin.distance_miles(&entry.value().point);
                (distance <= radius_miles)
                    .then(|| (distance, entry.value().seq, entry.key().clone()))
            })
            .collect();

        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        candidates
            .into_iter()
            .take(limit)
            .map(|(distance_miles, _, name)| NearbyStation {
                name,
                distance_miles,
            })
            .collect()
    }

    /// Number of stations with a counts snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.counts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.counts.is_empty()
    }

    /// Number of stations in the geospatial index.
    #[must_use]
    pub fn indexed_len(&self) -> usize {
        self.inner.geo.len()
    }

    /// Names with a counts snapshot, sorted.
    #[must_use]
    pub fn snapshot_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .counts
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
