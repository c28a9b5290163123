//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use kidtrack_core::config::worker::WorkerConfig;
use kidtrack_core::error::AppError;

use crate::jobs::ExpirySweep;

/// Cron-based scheduler for the expiry sweeps.
pub struct MaintenanceScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// Sweep handler shared by the scheduled closures.
    sweep: Arc<ExpirySweep>,
    /// Schedules.
    config: WorkerConfig,
}

impl std::fmt::Debug for MaintenanceScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceScheduler").finish()
    }
}

impl MaintenanceScheduler {
    /// Create a new maintenance scheduler.
    pub async fn new(sweep: Arc<ExpirySweep>, config: WorkerConfig) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            sweep,
            config,
        })
    }

    /// Register both sweeps and start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.register_share_sweep().await?;
        self.register_invitation_sweep().await?;

        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Maintenance scheduler started");
        Ok(())
    }

    /// Shut the scheduler down.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Maintenance scheduler shut down");
        Ok(())
    }

    async fn register_share_sweep(&self) -> Result<(), AppError> {
        let sweep = Arc::clone(&self.sweep);
        let job = CronJob::new_async(self.config.share_sweep_schedule.as_str(), move |_uuid, _lock| {
            let sweep = Arc::clone(&sweep);
            Box::pin(async move {
                sweep.sweep_shares().await;
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create share sweep schedule: {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add share sweep schedule: {e}")))?;

        tracing::info!(
            schedule = %self.config.share_sweep_schedule,
            "Registered: share expiry sweep"
        );
        Ok(())
    }

    async fn register_invitation_sweep(&self) -> Result<(), AppError> {
        let sweep = Arc::clone(&self.sweep);
        let job = CronJob::new_async(
            self.config.invitation_sweep_schedule.as_str(),
            move |_uuid, _lock| {
                let sweep = Arc::clone(&sweep);
                Box::pin(async move {
                    sweep.sweep_invitations().await;
                })
            },
        )
        .map_err(|e| {
            AppError::internal(format!("Failed to create invitation sweep schedule: {e}"))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add invitation sweep schedule: {e}"))
        })?;

        tracing::info!(
            schedule = %self.config.invitation_sweep_schedule,
            "Registered: invitation expiry sweep"
        );
        Ok(())
    }
}
