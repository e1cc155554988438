//! Feed → catalog/cache reconciliation.
//!
//! Two jobs share one [`Reconciler`]:
//!
//! - the **catalog job** ([`Reconciler::refresh_catalog`]) bootstraps an
//!   empty catalog, or refreshes status/type of known stations;
//! - the **counts job** ([`Reconciler::refresh_counts`]) rewrites the
//!   availability snapshots and geo index.
//!
//! A station is indexed at its catalog coordinates, and only together with
//! a snapshot, so the geo index and the snapshot key set stay in lockstep.
//!
//! Each pass fetches the feed, skips all work if the payload fingerprint
//! matches the job's slot, and advances the slot only after every store
//! write of the pass succeeded.

use std::collections::HashMap;
use std::sync::Arc;

use bikeshare_cache::AvailabilityCache;
use bikeshare_core::GeoPoint;
use bikeshare_db::{DbError, StationLocation};
use bikeshare_feed::{
    extract_counts, parse_stations, parse_stations_lenient, FeedClient, FeedStation, Fingerprint,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::error::SyncError;
use crate::fingerprint::{FeedSlot, FingerprintSlots};
use crate::gate::JobGate;

/// Counters for one applied pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassStats {
    /// Records in the payload.
    pub stations: usize,
    pub catalog_upserts: usize,
    pub catalog_updates: u64,
    pub counts_written: usize,
    /// Feed stations with no catalog row.
    pub skipped_unknown: usize,
    /// Records or popups that failed to parse.
    pub skipped_malformed: usize,
}

/// What a pass did when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Payload fingerprint matched the slot; nothing was parsed or written.
    Unchanged,
    /// The pass was not needed.
    Skipped(&'static str),
    /// The counts job found an empty catalog.
    AwaitingBootstrap,
    /// Another pass of the same job is in flight.
    AlreadyRunning,
    Applied(PassStats),
}

pub struct Reconciler {
    feed: FeedClient,
    pool: SqlitePool,
    cache: AvailabilityCache,
    fingerprints: Arc<FingerprintSlots>,
    catalog_gate: JobGate,
    counts_gate: JobGate,
}

impl Reconciler {
    #[must_use]
    pub fn new(
        feed: FeedClient,
        pool: SqlitePool,
        cache: AvailabilityCache,
        fingerprints: Arc<FingerprintSlots>,
    ) -> Self {
        Self {
            feed,
            pool,
            cache,
            fingerprints,
            catalog_gate: JobGate::new(),
            counts_gate: JobGate::new(),
        }
    }

    /// Populate an empty catalog from the feed.
    ///
    /// Shares the catalog job's gate. A non-empty catalog is left alone.
    ///
    /// # Errors
    ///
    /// See [`SyncError`]. On error no fingerprint slot is advanced.
    pub async fn bootstrap(&self) -> Result<PassOutcome, SyncError> {
        let Some(_guard) = self.catalog_gate.try_begin() else {
            tracing::info!(job = "catalog", "reconcile: bootstrap already running, dropped");
            return Ok(PassOutcome::AlreadyRunning);
        };

        if bikeshare_db::count_stations(&self.pool).await? > 0 {
            return Ok(PassOutcome::Skipped("catalog already populated"));
        }

        let raw = self.fetch("catalog").await?;
        let fingerprint = Fingerprint::of(&raw);
        self.apply_bootstrap(&raw, fingerprint).await
    }

    /// Run one catalog-job pass.
    ///
    /// # Errors
    ///
    /// See [`SyncError`]. On error the catalog slot is not advanced.
    pub async fn refresh_catalog(&self) -> Result<PassOutcome, SyncError> {
        let Some(_guard) = self.catalog_gate.try_begin() else {
            tracing::info!(job = "catalog", "reconcile: previous pass still running, dropped");
            return Ok(PassOutcome::AlreadyRunning);
        };

        let raw = self.fetch("catalog").await?;
        let fingerprint = Fingerprint::of(&raw);
        if !self.fingerprints.has_changed(FeedSlot::Catalog, &fingerprint) {
            tracing::debug!(job = "catalog", %fingerprint, "reconcile: payload unchanged");
            return Ok(PassOutcome::Unchanged);
        }

        if bikeshare_db::count_stations(&self.pool).await? == 0 {
            return self.apply_bootstrap(&raw, fingerprint).await;
        }

        let stations = parse_stations(&raw).map_err(SyncError::Format)?;
        let mut stats = PassStats {
            stations: stations.len(),
            ..PassStats::default()
        };

        for station in &stations {
            let station_type = bikeshare_core::StationType::from(station.station_type.as_str());
            match bikeshare_db::update_status_and_type(
                &self.pool,
                &station.name,
                &station.stocking_status,
                &station_type,
            )
            .await
            {
                Ok(updated) => stats.catalog_updates += updated,
                Err(DbError::NotFound) => {
                    tracing::warn!(
                        job = "catalog",
                        station = %station.name,
                        "reconcile: station not in catalog, skipped"
                    );
                    stats.skipped_unknown += 1;
                }
                Err(e) => return Err(SyncError::StoreWrite(e)),
            }
        }

        self.fingerprints.store(FeedSlot::Catalog, fingerprint);
        tracing::info!(
            job = "catalog",
            stations = stats.stations,
            updated = stats.catalog_updates,
            skipped_unknown = stats.skipped_unknown,
            "reconcile: metadata pass applied"
        );
        Ok(PassOutcome::Applied(stats))
    }

    /// Run one counts-job pass.
    ///
    /// Only stations already in the catalog get a snapshot.
    ///
    /// # Errors
    ///
    /// See [`SyncError`]. On error the counts slot is not advanced.
    pub async fn refresh_counts(&self) -> Result<PassOutcome, SyncError> {
        let Some(_guard) = self.counts_gate.try_begin() else {
            tracing::info!(job = "counts", "reconcile: previous pass still running, dropped");
            return Ok(PassOutcome::AlreadyRunning);
        };

        let raw = self.fetch("counts").await?;
        let fingerprint = Fingerprint::of(&raw);
        if !self.fingerprints.has_changed(FeedSlot::Counts, &fingerprint) {
            tracing::debug!(job = "counts", %fingerprint, "reconcile: payload unchanged");
            return Ok(PassOutcome::Unchanged);
        }

        let known: HashMap<String, StationLocation> =
            bikeshare_db::list_station_locations(&self.pool)
                .await?
                .into_iter()
                .map(|location| (location.name.clone(), location))
                .collect();
        if known.is_empty() {
            tracing::info!(job = "counts", "reconcile: catalog empty, waiting for bootstrap");
            return Ok(PassOutcome::AwaitingBootstrap);
        }

        let records = parse_stations_lenient(&raw).map_err(SyncError::Format)?;
        let mut stats = PassStats {
            stations: records.len(),
            ..PassStats::default()
        };

        for record in records {
            let station = match record {
                Ok(station) => station,
                Err(e) => {
                    tracing::warn!(
                        job = "counts",
                        error = %e,
                        "reconcile: malformed record skipped"
                    );
                    stats.skipped_malformed += 1;
                    continue;
                }
            };

            let Some(location) = known.get(&station.name) else {
                tracing::debug!(
                    job = "counts",
                    station = %station.name,
                    "reconcile: station not in catalog, skipped"
                );
                stats.skipped_unknown += 1;
                continue;
            };

            if self.write_availability("counts", &station, location.latitude, location.longitude)
            {
                stats.counts_written += 1;
            } else {
                stats.skipped_malformed += 1;
            }
        }

        self.fingerprints.store(FeedSlot::Counts, fingerprint);
        tracing::info!(
            job = "counts",
            stations = stats.stations,
            written = stats.counts_written,
            skipped_unknown = stats.skipped_unknown,
            skipped_malformed = stats.skipped_malformed,
            "reconcile: counts pass applied"
        );
        Ok(PassOutcome::Applied(stats))
    }

    async fn fetch(&self, job: &'static str) -> Result<Vec<u8>, SyncError> {
        self.feed.fetch().await.map_err(|e| {
            tracing::warn!(job, url = %self.feed.url(), error = %e, "reconcile: feed fetch failed");
            SyncError::from(e)
        })
    }

    /// Catalog first, cache second: no snapshot is written before every
    /// station has a catalog row.
    ///
    /// Snapshots and the counts slot are written under the counts gate. If a
    /// counts pass holds it, that pass owns the cache and only the catalog
    /// slot advances here.
    async fn apply_bootstrap(
        &self,
        raw: &[u8],
        fingerprint: Fingerprint,
    ) -> Result<PassOutcome, SyncError> {
        let stations = parse_stations(raw).map_err(SyncError::Format)?;
        let records: Vec<_> = stations.iter().map(FeedStation::to_record).collect();

        let mut stats = PassStats {
            stations: stations.len(),
            catalog_upserts: bikeshare_db::upsert_stations(&self.pool, &records).await?,
            ..PassStats::default()
        };

        let Some(_counts_guard) = self.counts_gate.try_begin() else {
            tracing::info!(
                job = "catalog",
                "reconcile: counts pass in flight, snapshots left to it"
            );
            self.fingerprints.store(FeedSlot::Catalog, fingerprint);
            return Ok(PassOutcome::Applied(stats));
        };

        for (station, record) in stations.iter().zip(&records) {
            if self.write_availability("catalog", station, record.latitude, record.longitude) {
                stats.counts_written += 1;
            } else {
                stats.skipped_malformed += 1;
            }
        }

        self.fingerprints.store(FeedSlot::Catalog, fingerprint.clone());
        self.fingerprints.store(FeedSlot::Counts, fingerprint);
        tracing::info!(
            job = "catalog",
            stations = stats.stations,
            upserted = stats.catalog_upserts,
            counts = stats.counts_written,
            "reconcile: bootstrap applied"
        );
        Ok(PassOutcome::Applied(stats))
    }

    /// Snapshot one station and index it at (`latitude`, `longitude`).
    /// Returns `false` if its popup or coordinates are unusable; nothing is
    /// written in that case.
    fn write_availability(
        &self,
        job: &'static str,
        station: &FeedStation,
        latitude: f64,
        longitude: f64,
    ) -> bool {
        let counts = match extract_counts(&station.popup) {
            Ok(counts) => counts,
            Err(e) => {
                tracing::warn!(
                    job,
                    station = %station.name,
                    error = %e,
                    "reconcile: popup unreadable, skipped"
                );
                return false;
            }
        };
        let point = match GeoPoint::new(latitude, longitude) {
            Ok(point) => point,
            Err(e) => {
                tracing::warn!(
                    job,
                    station = %station.name,
                    error = %e,
                    "reconcile: catalog coordinates unusable, skipped"
                );
                return false;
            }
        };

        self.cache.index_location(&station.name, point);
        self.cache.set_counts(&station.name, counts);
        true
    }
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
