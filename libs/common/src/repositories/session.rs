//! Session repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::Session;

const SESSION_COLUMNS: &str =
    "id, event_id, guest_name, session_token, expires_at, created_at, updated_at";

/// Session repository for database operations
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        event_id: Uuid,
        guest_name: &str,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Session> {
        let sql = format!(
            r#"
            INSERT INTO sessions (event_id, guest_name, session_token, expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {SESSION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Session>(&sql)
            .bind(event_id)
            .bind(guest_name)
            .bind(token)
            .bind(expires_at)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Session for `token` that is still unexpired at `now`
    pub async fn find_unexpired_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE session_token = $1 AND expires_at > $2"
        );

        sqlx::query_as::<_, Session>(&sql)
            .bind(token)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Overwrite the expiry of a session
    pub async fn set_expiry(
        &self,
        id: Uuid,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<Session>> {
        let sql = format!(
            r#"
            UPDATE sessions SET expires_at = $2, updated_at = $3
            WHERE id = $1
            RETURNING {SESSION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Session>(&sql)
            .bind(id)
            .bind(expires_at)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    pub async fn delete_by_token(&self, token: &str) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    /// Unexpired sessions of an event, newest first
    pub async fn list_unexpired_by_event(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Vec<Session>> {
        let sql = format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM sessions
            WHERE event_id = $1 AND expires_at > $2
            ORDER BY created_at DESC
            "#
        );

        sqlx::query_as::<_, Session>(&sql)
            .bind(event_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Remove every session expired at `now`, returning how many went
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected())
    }
}
