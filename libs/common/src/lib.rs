//! Common library for the SnapShare services
//!
//! Shared by the API and the worker: configuration, PostgreSQL connectivity
//! and migrations, the object store client, and the domain services for
//! events, guest sessions and photos.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod storage;
pub mod tokens;

/// Example wiring of the services
///
/// ```rust,no_run
/// use common::config::AppConfig;
/// use common::database::{DatabaseConfig, init_pool, health_check};
/// use common::services::SessionService;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = AppConfig::from_env()?;
///     let pool = init_pool(&DatabaseConfig::from(&config)).await?;
///     println!("Database health check: {}", health_check(&pool).await?);
///
///     let sessions = SessionService::new(pool);
///     let removed = sessions.cleanup_expired_sessions().await?;
///     println!("Removed {} expired sessions", removed);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
