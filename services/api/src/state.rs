//! Application state shared across handlers

use common::{
    services::{EventService, PhotoService, SessionService},
    storage::ObjectStorage,
};
use sqlx::PgPool;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub event_service: EventService,
    pub session_service: SessionService,
    pub photo_service: PhotoService,
}

impl AppState {
    pub fn new(pool: PgPool, storage: ObjectStorage) -> Self {
        Self {
            event_service: EventService::new(pool.clone()),
            session_service: SessionService::new(pool.clone()),
            photo_service: PhotoService::new(pool.clone(), storage),
            db_pool: pool,
        }
    }
}
