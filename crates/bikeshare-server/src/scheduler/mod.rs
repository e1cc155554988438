//! Background refresh jobs.
//!
//! Two independent cron jobs drive the [`Reconciler`]: a frequent counts
//! pass and an infrequent catalog (metadata) pass. Failures are logged and
//! left for the next tick.

use std::sync::Arc;

use bikeshare_engine::{PassOutcome, Reconciler, SyncError};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    reconciler: Arc<Reconciler>,
    config: Arc<bikeshare_core::AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_counts_job(
        &scheduler,
        Arc::clone(&reconciler),
        &config.counts_refresh_cron,
    )
    .await?;
    register_catalog_job(&scheduler, reconciler, &config.stations_refresh_cron).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_counts_job(
    scheduler: &JobScheduler,
    reconciler: Arc<Reconciler>,
    schedule: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let reconciler = Arc::clone(&reconciler);

        Box::pin(async move {
            tracing::debug!("scheduler: starting counts refresh");
            log_outcome("counts", reconciler.refresh_counts().await);
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(schedule, "scheduler: counts refresh registered");
    Ok(())
}

async fn register_catalog_job(
    scheduler: &JobScheduler,
    reconciler: Arc<Reconciler>,
    schedule: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let reconciler = Arc::clone(&reconciler);

        Box::pin(async move {
            tracing::info!("scheduler: starting catalog refresh");
            log_outcome("catalog", reconciler.refresh_catalog().await);
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(schedule, "scheduler: catalog refresh registered");
    Ok(())
}

/// One catalog pass (bootstraps an empty catalog) then one counts pass.
/// Failures are logged; the scheduled jobs retry.
pub async fn run_startup_passes(reconciler: &Reconciler) {
    log_outcome("catalog", reconciler.refresh_catalog().await);
    log_outcome("counts", reconciler.refresh_counts().await);
}

fn log_outcome(job: &'static str, result: Result<PassOutcome, SyncError>) {
    match result {
        Ok(PassOutcome::Applied(stats)) => {
            tracing::info!(job, ?stats, "scheduler: pass applied");
        }
        Ok(outcome) => tracing::debug!(job, ?outcome, "scheduler: pass finished"),
        Err(SyncError::Transient(e)) => {
            tracing::warn!(job, error = %e, "scheduler: feed unavailable, will retry");
        }
        Err(e) => tracing::error!(job, error = %e, "scheduler: pass failed"),
    }
}
