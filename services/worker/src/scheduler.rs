//! Cron jobs run by the worker

use anyhow::Result;
use common::services::SessionService;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::archive_builder::ArchiveBuilder;

/// Cron expressions (with a seconds field) for each job
#[derive(Debug, Clone)]
pub struct Schedules {
    pub session_cleanup: String,
    pub archive_poll: String,
}

/// Register both jobs and start the scheduler
pub async fn start(
    schedules: &Schedules,
    sessions: SessionService,
    archives: ArchiveBuilder,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let cleanup_job = Job::new_async(schedules.session_cleanup.as_str(), move |_, _| {
        let sessions = sessions.clone();
        Box::pin(async move {
            if let Err(e) = sessions.cleanup_expired_sessions().await {
                error!("Failed to sweep expired sessions: {}", e);
            }
        })
    })?;

    let archive_job = Job::new_async(schedules.archive_poll.as_str(), move |_, _| {
        let archives = archives.clone();
        Box::pin(async move {
            match archives.run_pending().await {
                Ok(0) => {}
                Ok(handled) => info!(handled, "Processed pending archives"),
                Err(e) => error!("Failed to process pending archives: {}", e),
            }
        })
    })?;

    scheduler.add(cleanup_job).await?;
    scheduler.add(archive_job).await?;
    scheduler.start().await?;

    info!(
        session_cleanup = %schedules.session_cleanup,
        archive_poll = %schedules.archive_poll,
        "Started worker scheduler"
    );
    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedules_parse() {
        for schedule in ["0 0 * * * *", "0/30 * * * * *"] {
            assert!(
                Job::new_async(schedule, |_, _| Box::pin(async {})).is_ok(),
                "schedule {schedule} should parse"
            );
        }
    }

    #[test]
    fn test_invalid_schedule_is_rejected() {
        assert!(Job::new_async("every minute", |_, _| Box::pin(async {})).is_err());
    }
}
