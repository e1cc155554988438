//! Command handlers for the CLI.
//!
//! Called from `main` once config and the database pool are established.
//! Each invocation is a fresh process, so query commands first warm the
//! in-process availability cache with one counts pass.

use std::sync::Arc;

use bikeshare_cache::AvailabilityCache;
use bikeshare_core::AppConfig;
use bikeshare_engine::{
    FingerprintSlots, NearestQuery, PassOutcome, QueryEngine, Reconciler, SyncError,
};
use bikeshare_feed::{FeedClient, FeedClientConfig};
use serde::Serialize;
use sqlx::SqlitePool;

struct Engine {
    reconciler: Reconciler,
    query: QueryEngine,
}

fn build_engine(pool: &SqlitePool, config: &AppConfig) -> anyhow::Result<Engine> {
    let cache = AvailabilityCache::new();
    let feed = FeedClient::new(FeedClientConfig::from_app_config(config))
        .map_err(|e| anyhow::anyhow!("failed to build feed client: {e}"))?;
    let reconciler = Reconciler::new(
        feed,
        pool.clone(),
        cache.clone(),
        Arc::new(FingerprintSlots::new()),
    );
    let query = QueryEngine::new(pool.clone(), cache)
        .with_defaults(config.nearest_radius_miles, config.nearest_limit);
    Ok(Engine { reconciler, query })
}

/// Run a counts pass so queries see live availability. A failed pass only
/// means counts print as `null`.
async fn warm_cache(engine: &Engine) {
    match engine.reconciler.refresh_counts().await {
        Ok(PassOutcome::AwaitingBootstrap) => {
            tracing::warn!("catalog is empty; run `bikeshare-cli sync` first");
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "could not load live counts"),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn describe(outcome: &Result<PassOutcome, SyncError>) -> String {
    match outcome {
        Ok(PassOutcome::Applied(stats)) => format!(
            "applied: {} stations, {} upserted, {} updated, {} counts written, \
             {} unknown skipped, {} malformed skipped",
            stats.stations,
            stats.catalog_upserts,
            stats.catalog_updates,
            stats.counts_written,
            stats.skipped_unknown,
            stats.skipped_malformed
        ),
        Ok(PassOutcome::Unchanged) => "unchanged".to_string(),
        Ok(PassOutcome::Skipped(reason)) => format!("skipped: {reason}"),
        Ok(PassOutcome::AwaitingBootstrap) => "waiting for catalog bootstrap".to_string(),
        Ok(PassOutcome::AlreadyRunning) => "already running".to_string(),
        Err(e) => format!("failed: {e}"),
    }
}

pub(crate) async fn run_migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    let applied = bikeshare_db::run_migrations(pool).await?;
    println!("migrations applied: {applied}");
    Ok(())
}

/// Catalog pass (bootstraps an empty catalog) followed by a counts pass.
///
/// # Errors
///
/// Returns the first pass error after both passes have been attempted.
pub(crate) async fn run_sync(pool: &SqlitePool, config: &AppConfig) -> anyhow::Result<()> {
    bikeshare_db::run_migrations(pool).await?;
    let engine = build_engine(pool, config)?;

    let catalog = engine.reconciler.refresh_catalog().await;
    println!("catalog: {}", describe(&catalog));
    let counts = engine.reconciler.refresh_counts().await;
    println!("counts: {}", describe(&counts));

    catalog?;
    counts?;
    Ok(())
}

pub(crate) async fn run_stations(pool: &SqlitePool, config: &AppConfig) -> anyhow::Result<()> {
    let engine = build_engine(pool, config)?;
    warm_cache(&engine).await;
    print_json(&engine.query.list_open_stations().await?)
}

pub(crate) async fn run_station(
    pool: &SqlitePool,
    config: &AppConfig,
    name: &str,
) -> anyhow::Result<()> {
    let engine = build_engine(pool, config)?;
    warm_cache(&engine).await;
    print_json(&engine.query.station_by_name(name).await?)
}

pub(crate) async fn run_nearest(
    pool: &SqlitePool,
    config: &AppConfig,
    query: &NearestQuery,
) -> anyhow::Result<()> {
    let engine = build_engine(pool, config)?;
    warm_cache(&engine).await;
    print_json(&engine.query.nearest_open_station(query).await?)
}
