//! Scheduled jobs: the daily profit accrual and a keep-alive heartbeat.

use std::{sync::Arc, time::Duration};

use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{config::Catalog, db::DbPool, error::AppError, services::accrual};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(300);

/// Register the jobs and start the scheduler.
///
/// `accrual_cron` uses the six-field (seconds first) cron syntax and is
/// evaluated in UTC. The returned scheduler must be kept alive.
pub async fn start(
    pool: DbPool,
    catalog: Arc<Catalog>,
    accrual_cron: &str,
) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;

    let accrual_job = Job::new_async(accrual_cron, move |_uuid, _lock| {
        let pool = pool.clone();
        let catalog = catalog.clone();
        Box::pin(async move {
            match accrual::run_daily_accrual(&pool, &catalog).await {
                Ok(summary) => tracing::info!(
                    credited = summary.credited,
                    skipped = summary.skipped,
                    total_increment = %summary.total_increment,
                    "Daily profits updated for {} users",
                    summary.credited
                ),
                Err(e) => tracing::error!(error = %e, "Daily profit accrual failed"),
            }
        })
    })?;
    let accrual_id = scheduler.add(accrual_job).await?;
    tracing::info!(job = %accrual_id, cron = accrual_cron, "Accrual job scheduled");

    let heartbeat = Job::new_repeated_async(HEARTBEAT_INTERVAL, |_uuid, _lock| {
        Box::pin(async {
            tracing::info!("Keep-alive ping");
        })
    })?;
    scheduler.add(heartbeat).await?;

    scheduler.start().await?;

    Ok(scheduler)
}
