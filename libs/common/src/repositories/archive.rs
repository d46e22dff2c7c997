//! Archive job repository

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{Archive, ArchiveStatus};

const ARCHIVE_COLUMNS: &str = "id, event_id, object_key, status, photo_count, size, error, \
                               created_at, updated_at, completed_at";

/// Archive repository for database operations
#[derive(Clone)]
pub struct ArchiveRepository {
    pool: PgPool,
}

impl ArchiveRepository {
    /// Create a new archive repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a pending archive job
    pub async fn insert_pending(
        &self,
        id: Uuid,
        event_id: Uuid,
        object_key: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Archive> {
        let sql = format!(
            r#"
            INSERT INTO archives (id, event_id, object_key, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {ARCHIVE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Archive>(&sql)
            .bind(id)
            .bind(event_id)
            .bind(object_key)
            .bind(ArchiveStatus::Pending)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    pub async fn find_for_event(
        &self,
        event_id: Uuid,
        archive_id: Uuid,
    ) -> DatabaseResult<Option<Archive>> {
        let sql = format!("SELECT {ARCHIVE_COLUMNS} FROM archives WHERE id = $1 AND event_id = $2");

        sqlx::query_as::<_, Archive>(&sql)
            .bind(archive_id)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Move the oldest claimable archive to `building` and return it
    ///
    /// Claimable means `pending`, or `building` with no progress since
    /// `now - lease` (its worker died or lost track of it). Rows locked by a
    /// concurrent claim are skipped, so two workers never take the same
    /// archive at once.
    pub async fn claim_pending(
        &self,
        now: DateTime<Utc>,
        lease: Duration,
    ) -> DatabaseResult<Option<Archive>> {
        let sql = format!(
            r#"
            UPDATE archives SET status = $1, updated_at = $3
            WHERE id = (
                SELECT id FROM archives
                WHERE status = $2 OR (status = $1 AND updated_at < $4)
                ORDER BY created_at
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING {ARCHIVE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Archive>(&sql)
            .bind(ArchiveStatus::Building)
            .bind(ArchiveStatus::Pending)
            .bind(now)
            .bind(now - lease)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Extend the lease of an archive being built
    pub async fn renew(&self, id: Uuid, now: DateTime<Utc>) -> DatabaseResult<()> {
        sqlx::query("UPDATE archives SET updated_at = $3 WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(ArchiveStatus::Building)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(())
    }

    pub async fn mark_ready(
        &self,
        id: Uuid,
        photo_count: i32,
        size: i64,
        now: DateTime<Utc>,
    ) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            UPDATE archives
            SET status = $2, photo_count = $3, size = $4, error = NULL,
                updated_at = $5, completed_at = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(ArchiveStatus::Ready)
        .bind(photo_count)
        .bind(size)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(())
    }

    pub async fn mark_failed(&self, id: Uuid, error: &str, now: DateTime<Utc>) -> DatabaseResult<()> {
        sqlx::query(
            r#"
            UPDATE archives
            SET status = $2, error = $3, updated_at = $4, completed_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(ArchiveStatus::Failed)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(())
    }
}
