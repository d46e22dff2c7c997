//! Bulk download archive model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Build state of an archive, stored as the `archive_status` enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "archive_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ArchiveStatus {
    Pending,
    Building,
    Ready,
    Failed,
}

/// A ZIP of an event's confirmed photos, built by the worker
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Archive {
    pub id: Uuid,
    pub event_id: Uuid,
    pub object_key: String,
    pub status: ArchiveStatus,
    pub photo_count: i32,
    pub size: i64,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Archive {
    /// Key the archive object is written to
    pub fn object_key_for(event_id: Uuid, archive_id: Uuid) -> String {
        format!("events/{}/archives/{}.zip", event_id, archive_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_key_layout() {
        let event_id = Uuid::new_v4();
        let archive_id = Uuid::new_v4();
        assert_eq!(
            Archive::object_key_for(event_id, archive_id),
            format!("events/{event_id}/archives/{archive_id}.zip")
        );
    }
}
