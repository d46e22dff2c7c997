use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod archive_builder;
mod scheduler;

use archive_builder::ArchiveBuilder;
use common::{
    config::AppConfig,
    database::{DatabaseConfig, init_pool},
    services::SessionService,
    storage::{ObjectStorage, StorageConfig},
};
use scheduler::Schedules;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting worker service");

    let config = AppConfig::from_env()?;

    // Migrations are owned by the API
    let pool = init_pool(&DatabaseConfig::from(&config)).await?;
    let storage = ObjectStorage::new(&StorageConfig::from(&config)).await;

    let schedules = Schedules {
        session_cleanup: config.session_cleanup_schedule.clone(),
        archive_poll: config.archive_poll_schedule.clone(),
    };
    let mut scheduler = scheduler::start(
        &schedules,
        SessionService::new(pool.clone()),
        ArchiveBuilder::new(pool, storage),
    )
    .await?;

    info!("Worker service started successfully");

    // Keep the service running
    tokio::signal::ctrl_c().await?;
    info!("Shutting down worker service");
    scheduler.shutdown().await?;

    Ok(())
}
