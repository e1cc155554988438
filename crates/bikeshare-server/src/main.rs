mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use bikeshare_cache::AvailabilityCache;
use bikeshare_engine::{FingerprintSlots, QueryEngine, Reconciler};
use bikeshare_feed::{FeedClient, FeedClientConfig};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(bikeshare_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = bikeshare_db::PoolConfig::from_app_config(&config);
    let pool = bikeshare_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = bikeshare_db::run_migrations(&pool).await?;
    tracing::info!(applied, env = %config.env, "database ready");

    let cache = AvailabilityCache::new();
    let fingerprints = Arc::new(FingerprintSlots::new());
    let feed = FeedClient::new(FeedClientConfig::from_app_config(&config))?;
    let reconciler = Arc::new(Reconciler::new(
        feed,
        pool.clone(),
        cache.clone(),
        Arc::clone(&fingerprints),
    ));

    scheduler::run_startup_passes(&reconciler).await;
    let _scheduler = scheduler::build_scheduler(Arc::clone(&reconciler), Arc::clone(&config)).await?;

    let query = QueryEngine::new(pool.clone(), cache.clone())
        .with_defaults(config.nearest_radius_miles, config.nearest_limit);
    let app = build_app(AppState {
        pool,
        query,
        cache,
        fingerprints,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
