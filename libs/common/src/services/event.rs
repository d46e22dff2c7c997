//! Event Directory: events, their codes and their owners

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{Event, EventStatus, EventUpdate, NewEvent};
use crate::repositories::{EventRepository, event::CODE_INDEX};
use crate::tokens::{generate_event_code, generate_token};

/// How many fresh codes are tried before giving up
pub const MAX_CODE_ATTEMPTS: usize = 10;

#[derive(Clone)]
pub struct EventService {
    events: EventRepository,
}

impl EventService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            events: EventRepository::new(pool),
        }
    }

    /// Create an active event with a fresh code and owner token
    ///
    /// The partial unique index on live codes is the arbiter: a collision
    /// surfaces as a unique violation on that index and another code is
    /// drawn. Any other violation is returned as is.
    pub async fn create_event(&self, new_event: NewEvent) -> ServiceResult<Event> {
        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_event_code();
            let owner_token = generate_token();
            match self
                .events
                .insert(&new_event, &code, &owner_token, Utc::now())
                .await
            {
                Ok(event) => {
                    info!(event_id = %event.id, code = %event.code, "Created event");
                    return Ok(event);
                }
                Err(e) if e.is_unique_violation_on(CODE_INDEX) => {
                    warn!(attempt, code = %code, "Event code collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::CodeGenerationExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> ServiceResult<Event> {
        self.events
            .find_by_id(id)
            .await?
            .ok_or_else(event_not_found)
    }

    /// Look up an event guests may still join
    ///
    /// Closed events are reported as absent.
    pub async fn get_by_code(&self, code: &str) -> ServiceResult<Event> {
        match self.events.find_by_code(code).await? {
            Some(event) if event.status != EventStatus::Closed => Ok(event),
            _ => Err(event_not_found()),
        }
    }

    /// Resolve an owner bearer token to its event
    pub async fn get_by_owner_token(&self, token: &str) -> ServiceResult<Event> {
        self.events
            .find_by_owner_token(token)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("invalid owner token".to_string()))
    }

    /// The event an owner token was issued for
    ///
    /// A token grants nothing on other events, even ones created with the
    /// same owner email.
    pub async fn get_owned(&self, id: Uuid, owner_token: &str) -> ServiceResult<Event> {
        let event = self.get_by_id(id).await?;
        if event.owner_token != owner_token {
            return Err(ServiceError::Unauthorized(
                "event belongs to another organizer".to_string(),
            ));
        }
        Ok(event)
    }

    /// Directory listing by contact email, not an authorization check
    pub async fn list_by_owner(&self, owner_email: &str) -> ServiceResult<Vec<Event>> {
        Ok(self.events.list_by_owner_email(owner_email).await?)
    }

    /// Apply a partial update
    ///
    /// A closed event stays closed. The repository enforces this in the
    /// same statement, the check here only gives the early error.
    pub async fn update(&self, id: Uuid, update: EventUpdate) -> ServiceResult<Event> {
        let current = self.get_by_id(id).await?;

        if let Some(status) = update.status {
            check_transition(current.status, status)?;
        }

        if update.is_empty() {
            return Ok(current);
        }

        let Some(event) = self.events.update(id, &update, Utc::now()).await? else {
            // Closed or deleted since the read above
            let latest = self.get_by_id(id).await?;
            return Err(match update.status {
                Some(status) => check_transition(latest.status, status)
                    .err()
                    .unwrap_or_else(event_not_found),
                None => event_not_found(),
            });
        };

        info!(event_id = %id, status = event.status.as_str(), "Updated event");
        Ok(event)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        if !self.events.soft_delete(id, Utc::now()).await? {
            return Err(event_not_found());
        }
        info!(event_id = %id, "Deleted event");
        Ok(())
    }

    pub async fn close(&self, id: Uuid) -> ServiceResult<()> {
        if !self
            .events
            .set_status(id, EventStatus::Closed, Utc::now())
            .await?
        {
            return Err(event_not_found());
        }
        info!(event_id = %id, "Closed event");
        Ok(())
    }
}

fn event_not_found() -> ServiceError {
    ServiceError::NotFound("event not found".to_string())
}

fn check_transition(from: EventStatus, to: EventStatus) -> ServiceResult<()> {
    if from == EventStatus::Closed && to != EventStatus::Closed {
        return Err(ServiceError::Validation(format!(
            "cannot change status of a closed event to {}",
            to.as_str()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_is_terminal() {
        assert!(check_transition(EventStatus::Closed, EventStatus::Active).is_err());
        assert!(check_transition(EventStatus::Closed, EventStatus::Inactive).is_err());
        assert!(check_transition(EventStatus::Closed, EventStatus::Closed).is_ok());
    }

    #[test]
    fn test_open_states_move_freely() {
        assert!(check_transition(EventStatus::Active, EventStatus::Inactive).is_ok());
        assert!(check_transition(EventStatus::Inactive, EventStatus::Active).is_ok());
        assert!(check_transition(EventStatus::Active, EventStatus::Closed).is_ok());
    }

    #[test]
    fn test_transition_error_is_validation() {
        let err = check_transition(EventStatus::Closed, EventStatus::Active).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "cannot change status of a closed event to active"
        );
    }
}
