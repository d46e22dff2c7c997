//! Guest session model

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A guest's time-limited access to one event
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub event_id: Uuid,
    pub guest_name: String,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
