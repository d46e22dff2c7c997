//! Event repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{Event, EventStatus, EventUpdate, NewEvent};

/// Partial unique index guarding codes of live events
pub const CODE_INDEX: &str = "events_code_live_key";

const EVENT_COLUMNS: &str = "id, name, code, description, event_date, status, owner_email, \
                             owner_token, created_at, updated_at, deleted_at";

/// Event repository for database operations
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new event repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an event with the given code
    ///
    /// A code already used by a live event fails with a unique violation
    /// on [`CODE_INDEX`], see [`DatabaseError::is_unique_violation_on`].
    pub async fn insert(
        &self,
        event: &NewEvent,
        code: &str,
        owner_token: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Event> {
        let sql = format!(
            r#"
            INSERT INTO events (name, code, description, event_date, status, owner_email,
                                owner_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {EVENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Event>(&sql)
            .bind(&event.name)
            .bind(code)
            .bind(&event.description)
            .bind(event.event_date)
            .bind(EventStatus::Active)
            .bind(&event.owner_email)
            .bind(owner_token)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM live_events WHERE id = $1");

        sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    pub async fn find_by_code(&self, code: &str) -> DatabaseResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM live_events WHERE code = $1");

        sqlx::query_as::<_, Event>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    pub async fn find_by_owner_token(&self, token: &str) -> DatabaseResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM live_events WHERE owner_token = $1");

        sqlx::query_as::<_, Event>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Live events of an organizer, newest first
    pub async fn list_by_owner_email(&self, owner_email: &str) -> DatabaseResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM live_events WHERE owner_email = $1 ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, Event>(&sql)
            .bind(owner_email)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Apply the supplied fields, `None` when no live event matched
    ///
    /// A closed event only matches when the update leaves its status
    /// closed, so a concurrent close cannot be undone.
    pub async fn update(
        &self,
        id: Uuid,
        update: &EventUpdate,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<Event>> {
        let sql = format!(
            r#"
            UPDATE live_events
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                event_date = COALESCE($4, event_date),
                status = COALESCE($5, status),
                updated_at = $6
            WHERE id = $1
              AND (status <> 'closed' OR $5::event_status IS NULL OR $5 = 'closed')
            RETURNING {EVENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(&update.name)
            .bind(&update.description)
            .bind(update.event_date)
            .bind(update.status)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        status: EventStatus,
        now: DateTime<Utc>,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query("UPDATE live_events SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamp the tombstone, false when nothing live matched
    pub async fn soft_delete(&self, id: Uuid, now: DateTime<Utc>) -> DatabaseResult<bool> {
        let result =
            sqlx::query("UPDATE live_events SET deleted_at = $2, updated_at = $2 WHERE id = $1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}
