//! Photo Registrar: upload tickets, confirmations, deletions and archives

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::{Archive, ArchiveStatus, Event, FileSpec, NewPhoto, Photo};
use crate::repositories::{ArchiveRepository, EventRepository, PhotoRepository};
use crate::storage::ObjectStorage;

pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(15 * 60);
pub const DELETE_URL_TTL: Duration = Duration::from_secs(5 * 60);
pub const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(60 * 60);

/// Largest number of files accepted in one bulk upload
pub const MAX_BULK_FILES: usize = 50;

/// Who is asking to remove a photo
#[derive(Debug, Clone)]
pub enum Requester {
    /// A guest may remove what they uploaded to their own event
    Guest { event_id: Uuid, guest_name: String },
    /// An organizer may remove anything from the event their token manages
    Owner { event_id: Uuid },
}

/// Where and until when a client may PUT one photo
#[derive(Debug, Clone, Serialize)]
pub struct UploadTicket {
    pub photo_id: Uuid,
    pub object_key: String,
    pub upload_url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkUpload {
    pub batch_id: Uuid,
    pub uploads: Vec<UploadTicket>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhotoWithUrl {
    #[serde(flatten)]
    pub photo: Photo,
    pub url: String,
}

/// A removed photo and the URL that deletes its object
#[derive(Debug, Clone, Serialize)]
pub struct PhotoDeletion {
    pub photo_id: Uuid,
    pub delete_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Archive state, with a download link once it is built
#[derive(Debug, Clone, Serialize)]
pub struct BulkDownload {
    #[serde(flatten)]
    pub archive: Archive,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct PhotoService {
    photos: PhotoRepository,
    events: EventRepository,
    archives: ArchiveRepository,
    storage: ObjectStorage,
}

impl PhotoService {
    pub fn new(pool: PgPool, storage: ObjectStorage) -> Self {
        Self {
            photos: PhotoRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            archives: ArchiveRepository::new(pool),
            storage,
        }
    }

    /// Issue a presigned PUT and record a placeholder row of size 0
    pub async fn generate_upload_url(
        &self,
        event_id: Uuid,
        uploader_name: &str,
        content_type: &str,
    ) -> ServiceResult<UploadTicket> {
        self.require_event(event_id).await?;

        let (ticket, photo) = self
            .issue_ticket(event_id, uploader_name, content_type)
            .await?;
        self.photos
            .insert_placeholders(std::slice::from_ref(&photo), Utc::now())
            .await?;

        info!(photo_id = %ticket.photo_id, event_id = %event_id, "Issued upload URL");
        Ok(ticket)
    }

    /// Set the size of an uploaded photo of this event
    pub async fn confirm_upload(
        &self,
        event_id: Uuid,
        photo_id: Uuid,
        size: i64,
    ) -> ServiceResult<()> {
        if !self
            .photos
            .confirm_size(event_id, photo_id, size, Utc::now())
            .await?
        {
            return Err(photo_not_found());
        }
        Ok(())
    }

    /// Live photos of an event, newest first, with their public URLs
    pub async fn get_photos_by_event(&self, event_id: Uuid) -> ServiceResult<Vec<PhotoWithUrl>> {
        let photos = self.photos.list_by_event(event_id).await?;

        Ok(photos
            .into_iter()
            .map(|photo| PhotoWithUrl {
                url: self.storage.public_url(&photo.object_key),
                photo,
            })
            .collect())
    }

    /// Soft-delete a photo the requester may remove
    ///
    /// The stored object is kept. The returned URL deletes it.
    pub async fn delete_photo(
        &self,
        photo_id: Uuid,
        requester: &Requester,
    ) -> ServiceResult<PhotoDeletion> {
        let photo = self
            .photos
            .find_by_id(photo_id)
            .await?
            .ok_or_else(photo_not_found)?;

        let allowed = match requester {
            Requester::Guest {
                event_id,
                guest_name,
            } => photo.event_id == *event_id && photo.uploader_name == *guest_name,
            Requester::Owner { event_id } => photo.event_id == *event_id,
        };
        if !allowed {
            return Err(ServiceError::Unauthorized(
                "unauthorized to delete photo".to_string(),
            ));
        }

        let deletion = self.deletion_for(&photo).await?;

        if !self.photos.soft_delete(photo.id, Utc::now()).await? {
            return Err(photo_not_found());
        }

        info!(photo_id = %photo.id, event_id = %photo.event_id, "Deleted photo");
        Ok(deletion)
    }

    /// Issue one upload ticket per file, recording all placeholders at once
    pub async fn generate_bulk_upload_urls(
        &self,
        event_id: Uuid,
        uploader_name: &str,
        files: &[FileSpec],
    ) -> ServiceResult<BulkUpload> {
        if files.is_empty() {
            return Err(ServiceError::Validation("no files requested".to_string()));
        }
        if files.len() > MAX_BULK_FILES {
            return Err(ServiceError::BatchTooLarge {
                max: MAX_BULK_FILES,
            });
        }

        self.require_event(event_id).await?;

        let mut uploads = Vec::with_capacity(files.len());
        let mut placeholders = Vec::with_capacity(files.len());
        for file in files {
            let (ticket, photo) = self
                .issue_ticket(event_id, uploader_name, &file.content_type)
                .await?;
            uploads.push(ticket);
            placeholders.push(photo);
        }

        self.photos
            .insert_placeholders(&placeholders, Utc::now())
            .await?;

        let batch_id = Uuid::new_v4();
        info!(batch_id = %batch_id, event_id = %event_id, count = uploads.len(), "Issued bulk upload URLs");

        Ok(BulkUpload { batch_id, uploads })
    }

    /// Set several sizes at once, all or nothing
    pub async fn confirm_bulk_upload(
        &self,
        event_id: Uuid,
        confirmations: &HashMap<Uuid, i64>,
    ) -> ServiceResult<()> {
        if confirmations.is_empty() {
            return Ok(());
        }

        let sizes: Vec<(Uuid, i64)> = confirmations
            .iter()
            .map(|(id, size)| (*id, *size))
            .collect();

        if let Some(missing) = self
            .photos
            .confirm_sizes(event_id, &sizes, Utc::now())
            .await?
        {
            return Err(ServiceError::NotFound(format!("photo {} not found", missing)));
        }

        info!(event_id = %event_id, count = sizes.len(), "Confirmed bulk upload");
        Ok(())
    }

    /// Soft-delete several photos of one event, all or nothing
    pub async fn delete_bulk_photos(
        &self,
        event_id: Uuid,
        photo_ids: &[Uuid],
    ) -> ServiceResult<Vec<PhotoDeletion>> {
        let ids = dedup(photo_ids);
        if ids.is_empty() {
            return Err(ServiceError::Validation("no photos requested".to_string()));
        }

        let deleted = self
            .photos
            .soft_delete_many(event_id, &ids, Utc::now())
            .await?
            .ok_or_else(|| {
                ServiceError::Validation(
                    "some photos not found or don't belong to this event".to_string(),
                )
            })?;

        let mut deletions = Vec::with_capacity(deleted.len());
        for photo in &deleted {
            deletions.push(self.deletion_for(photo).await?);
        }

        info!(event_id = %event_id, count = deletions.len(), "Deleted photos");
        Ok(deletions)
    }

    /// Queue an archive of the event's photos for the worker to build
    pub async fn generate_bulk_download_url(&self, event_id: Uuid) -> ServiceResult<Archive> {
        self.require_event(event_id).await?;

        if self.photos.count_by_event(event_id).await? == 0 {
            return Err(ServiceError::NotFound(
                "no photos found for event".to_string(),
            ));
        }

        let archive_id = Uuid::new_v4();
        let archive = self
            .archives
            .insert_pending(
                archive_id,
                event_id,
                &Archive::object_key_for(event_id, archive_id),
                Utc::now(),
            )
            .await?;

        info!(archive_id = %archive.id, event_id = %event_id, "Queued archive");
        Ok(archive)
    }

    /// Current state of an archive, with a download URL once ready
    pub async fn get_bulk_download(
        &self,
        event_id: Uuid,
        archive_id: Uuid,
    ) -> ServiceResult<BulkDownload> {
        let archive = self
            .archives
            .find_for_event(event_id, archive_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("archive not found".to_string()))?;

        if archive.status != ArchiveStatus::Ready {
            return Ok(BulkDownload {
                archive,
                download_url: None,
                expires_at: None,
            });
        }

        let expires_at = expiry(DOWNLOAD_URL_TTL);
        let url = self
            .storage
            .presigned_get(&archive.object_key, DOWNLOAD_URL_TTL)
            .await?;

        Ok(BulkDownload {
            archive,
            download_url: Some(url),
            expires_at: Some(expires_at),
        })
    }

    async fn require_event(&self, event_id: Uuid) -> ServiceResult<Event> {
        self.events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("event not found".to_string()))
    }

    async fn issue_ticket(
        &self,
        event_id: Uuid,
        uploader_name: &str,
        content_type: &str,
    ) -> ServiceResult<(UploadTicket, NewPhoto)> {
        let photo_id = Uuid::new_v4();
        let key = object_key(event_id, photo_id, content_type);

        let expires_at = expiry(UPLOAD_URL_TTL);
        let upload_url = self
            .storage
            .presigned_put(&key, content_type, UPLOAD_URL_TTL)
            .await?;

        let ticket = UploadTicket {
            photo_id,
            object_key: key.clone(),
            upload_url,
            expires_at,
        };
        let photo = NewPhoto {
            id: photo_id,
            event_id,
            uploader_name: uploader_name.to_string(),
            object_key: key,
            mime_type: content_type.to_string(),
        };
        Ok((ticket, photo))
    }

    async fn deletion_for(&self, photo: &Photo) -> ServiceResult<PhotoDeletion> {
        let expires_at = expiry(DELETE_URL_TTL);
        let delete_url = self
            .storage
            .presigned_delete(&photo.object_key, DELETE_URL_TTL)
            .await
            .inspect_err(|e| warn!(photo_id = %photo.id, error = %e, "Failed to presign delete"))?;

        Ok(PhotoDeletion {
            photo_id: photo.id,
            delete_url,
            expires_at,
        })
    }
}

/// File extension for a content type, `.jpg` when unknown
pub fn extension_for(content_type: &str) -> &'static str {
    const EXTENSIONS: [(&str, &str); 6] = [
        ("image/jpeg", ".jpg"),
        ("image/png", ".png"),
        ("image/gif", ".gif"),
        ("image/webp", ".webp"),
        ("image/heic", ".heic"),
        ("image/heif", ".heif"),
    ];

    EXTENSIONS
        .iter()
        .find(|(prefix, _)| content_type.starts_with(prefix))
        .map(|(_, ext)| *ext)
        .unwrap_or(".jpg")
}

/// `events/{eventID}/photos/{photoID}{ext}`
pub fn object_key(event_id: Uuid, photo_id: Uuid, content_type: &str) -> String {
    format!(
        "events/{}/photos/{}{}",
        event_id,
        photo_id,
        extension_for(content_type)
    )
}

fn expiry(ttl: Duration) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::seconds(ttl.as_secs() as i64)
}

fn photo_not_found() -> ServiceError {
    ServiceError::NotFound("photo not found".to_string())
}

fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for("image/jpeg"), ".jpg");
        assert_eq!(extension_for("image/png"), ".png");
        assert_eq!(extension_for("image/gif"), ".gif");
        assert_eq!(extension_for("image/webp"), ".webp");
        assert_eq!(extension_for("image/heic"), ".heic");
        assert_eq!(extension_for("image/heif"), ".heif");
    }

    #[test]
    fn test_extension_uses_prefix_and_defaults_to_jpg() {
        assert_eq!(extension_for("image/png; charset=binary"), ".png");
        assert_eq!(extension_for("image/tiff"), ".jpg");
        assert_eq!(extension_for("application/octet-stream"), ".jpg");
    }

    #[test]
    fn test_object_key_layout() {
        let event_id = Uuid::new_v4();
        let photo_id = Uuid::new_v4();
        assert_eq!(
            object_key(event_id, photo_id, "image/png"),
            format!("events/{event_id}/photos/{photo_id}.png")
        );
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup(&[a, b, a, b, a]), vec![a, b]);
        assert!(dedup(&[]).is_empty());
    }

    #[test]
    fn test_url_expiries() {
        assert_eq!(UPLOAD_URL_TTL.as_secs(), 900);
        assert_eq!(DELETE_URL_TTL.as_secs(), 300);
        assert_eq!(DOWNLOAD_URL_TTL.as_secs(), 3600);
    }

    #[test]
    fn test_photo_listing_serializes_flat() {
        let now = Utc::now();
        let item = PhotoWithUrl {
            photo: Photo {
                id: Uuid::new_v4(),
                event_id: Uuid::new_v4(),
                uploader_name: "Alice".to_string(),
                object_key: "events/e/photos/p.png".to_string(),
                size: 204800,
                mime_type: "image/png".to_string(),
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
            url: "https://cdn.example.com/events/e/photos/p.png".to_string(),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["uploader_name"], "Alice");
        assert_eq!(json["file_size"], 204800);
        assert_eq!(json["url"], "https://cdn.example.com/events/e/photos/p.png");
    }
}
