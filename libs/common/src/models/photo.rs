//! Photo metadata model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for one uploaded (or pending) photo
///
/// `size` stays 0 until the client confirms the upload.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Photo {
    pub id: Uuid,
    pub event_id: Uuid,
    pub uploader_name: String,
    pub object_key: String,
    #[serde(rename = "file_size")]
    pub size: i64,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Photo {
    pub fn is_confirmed(&self) -> bool {
        self.size > 0
    }
}

/// Placeholder row written before the client uploads
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub id: Uuid,
    pub event_id: Uuid,
    pub uploader_name: String,
    pub object_key: String,
    pub mime_type: String,
}

/// One file of a bulk upload request
///
/// A size declared by the client is ignored, the stored size comes from
/// confirmation.
#[derive(Debug, Clone, Deserialize)]
pub struct FileSpec {
    pub content_type: String,
}
