//! Session Issuer: guest sessions keyed by bearer token

use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{EventStatus, Session};
use crate::repositories::{EventRepository, SessionRepository};
use crate::tokens::generate_token;

/// Lifetime of a session from creation or refresh
pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct SessionService {
    sessions: SessionRepository,
    events: EventRepository,
}

impl SessionService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            sessions: SessionRepository::new(pool.clone()),
            events: EventRepository::new(pool),
        }
    }

    /// Start a session for a guest of an active event
    pub async fn create_session(&self, event_id: Uuid, guest_name: &str) -> ServiceResult<Session> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .filter(|event| event.status == EventStatus::Active)
            .ok_or_else(|| ServiceError::NotFound("event not found or inactive".to_string()))?;

        let now = Utc::now();
        let session = self
            .sessions
            .insert(
                event.id,
                guest_name,
                &generate_token(),
                now + Duration::hours(SESSION_TTL_HOURS),
                now,
            )
            .await?;

        info!(session_id = %session.id, event_id = %event.id, "Created guest session");
        Ok(session)
    }

    /// Start a session from the code a guest typed or scanned
    pub async fn create_session_for_code(
        &self,
        code: &str,
        guest_name: &str,
    ) -> ServiceResult<Session> {
        let event = match self.events.find_by_code(code).await? {
            Some(event) if event.status != EventStatus::Closed => event,
            _ => return Err(ServiceError::NotFound("event not found".to_string())),
        };
        self.create_session(event.id, guest_name).await
    }

    /// The session behind a token, if unexpired and its event is active
    pub async fn validate_session(&self, token: &str) -> ServiceResult<Session> {
        let session = self
            .sessions
            .find_unexpired_by_token(token, Utc::now())
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("invalid or expired session".to_string()))?;

        let active = self
            .events
            .find_by_id(session.event_id)
            .await?
            .is_some_and(|event| event.status == EventStatus::Active);
        if !active {
            debug!(session_id = %session.id, "Session rejected, event not active");
            return Err(ServiceError::Unauthorized("event is not active".to_string()));
        }

        Ok(session)
    }

    /// Reset expiry to a full lifetime from now
    pub async fn refresh_session(&self, token: &str) -> ServiceResult<Session> {
        let session = self.validate_session(token).await?;

        let now = Utc::now();
        self.sessions
            .set_expiry(session.id, now + Duration::hours(SESSION_TTL_HOURS), now)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("invalid or expired session".to_string()))
    }

    pub async fn revoke_session(&self, token: &str) -> ServiceResult<()> {
        if !self.sessions.delete_by_token(token).await? {
            return Err(ServiceError::NotFound("session not found".to_string()));
        }
        info!("Revoked guest session");
        Ok(())
    }

    pub async fn get_sessions_by_event(&self, event_id: Uuid) -> ServiceResult<Vec<Session>> {
        Ok(self
            .sessions
            .list_unexpired_by_event(event_id, Utc::now())
            .await?)
    }

    /// Delete every expired session, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> ServiceResult<u64> {
        let removed = self.sessions.delete_expired(Utc::now()).await?;
        info!(removed, "Swept expired sessions");
        Ok(removed)
    }
}
