//! Photo repository

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{NewPhoto, Photo};

const PHOTO_COLUMNS: &str = "id, event_id, uploader_name, object_key, size, mime_type, \
                             created_at, updated_at, deleted_at";

/// Photo repository for database operations
#[derive(Clone)]
pub struct PhotoRepository {
    pool: PgPool,
}

impl PhotoRepository {
    /// Create a new photo repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert placeholder rows with size 0 in a single statement
    pub async fn insert_placeholders(
        &self,
        photos: &[NewPhoto],
        now: DateTime<Utc>,
    ) -> DatabaseResult<Vec<Photo>> {
        if photos.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO photos (id, event_id, uploader_name, object_key, size, mime_type, created_at, updated_at) ",
        );
        builder.push_values(photos, |mut row, photo| {
            row.push_bind(photo.id)
                .push_bind(photo.event_id)
                .push_bind(&photo.uploader_name)
                .push_bind(&photo.object_key)
                .push_bind(0_i64)
                .push_bind(&photo.mime_type)
                .push_bind(now)
                .push_bind(now);
        });
        builder.push(" RETURNING ");
        builder.push(PHOTO_COLUMNS);

        builder
            .build_query_as::<Photo>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Photo>> {
        let sql = format!("SELECT {PHOTO_COLUMNS} FROM live_photos WHERE id = $1");

        sqlx::query_as::<_, Photo>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Live photos of an event, newest first
    pub async fn list_by_event(&self, event_id: Uuid) -> DatabaseResult<Vec<Photo>> {
        let sql = format!(
            "SELECT {PHOTO_COLUMNS} FROM live_photos WHERE event_id = $1 ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, Photo>(&sql)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Live photos whose upload was confirmed, oldest first
    pub async fn list_confirmed_by_event(&self, event_id: Uuid) -> DatabaseResult<Vec<Photo>> {
        let sql = format!(
            "SELECT {PHOTO_COLUMNS} FROM live_photos WHERE event_id = $1 AND size > 0 ORDER BY created_at"
        );

        sqlx::query_as::<_, Photo>(&sql)
            .bind(event_id)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    pub async fn count_by_event(&self, event_id: Uuid) -> DatabaseResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM live_photos WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    /// Record the uploaded size, false when no live photo of the event matched
    pub async fn confirm_size(
        &self,
        event_id: Uuid,
        photo_id: Uuid,
        size: i64,
        now: DateTime<Utc>,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE live_photos SET size = $3, updated_at = $4 WHERE id = $1 AND event_id = $2",
        )
        .bind(photo_id)
        .bind(event_id)
        .bind(size)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    /// Record several sizes in one transaction
    ///
    /// Stops at the first photo that does not match and rolls everything
    /// back, returning its id. `None` means every size was committed.
    pub async fn confirm_sizes(
        &self,
        event_id: Uuid,
        sizes: &[(Uuid, i64)],
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<Uuid>> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        for (photo_id, size) in sizes {
            let result = sqlx::query(
                "UPDATE live_photos SET size = $3, updated_at = $4 WHERE id = $1 AND event_id = $2",
            )
            .bind(photo_id)
            .bind(event_id)
            .bind(size)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;

            if result.rows_affected() == 0 {
                tx.rollback().await.map_err(DatabaseError::Query)?;
                return Ok(Some(*photo_id));
            }
        }

        tx.commit().await.map_err(DatabaseError::Query)?;
        Ok(None)
    }

    pub async fn soft_delete(&self, id: Uuid, now: DateTime<Utc>) -> DatabaseResult<bool> {
        let result =
            sqlx::query("UPDATE live_photos SET deleted_at = $2, updated_at = $2 WHERE id = $1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete exactly the given photos of an event
    ///
    /// `ids` must be free of duplicates. When any id is not a live photo of
    /// the event the transaction is rolled back and `None` is returned.
    pub async fn soft_delete_many(
        &self,
        event_id: Uuid,
        ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> DatabaseResult<Option<Vec<Photo>>> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        let sql = format!(
            r#"
            UPDATE live_photos SET deleted_at = $3, updated_at = $3
            WHERE event_id = $1 AND id = ANY($2)
            RETURNING {PHOTO_COLUMNS}
            "#
        );
        let deleted = sqlx::query_as::<_, Photo>(&sql)
            .bind(event_id)
            .bind(ids)
            .bind(now)
            .fetch_all(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;

        if deleted.len() != ids.len() {
            tx.rollback().await.map_err(DatabaseError::Query)?;
            return Ok(None);
        }

        tx.commit().await.map_err(DatabaseError::Query)?;
        Ok(Some(deleted))
    }
}
