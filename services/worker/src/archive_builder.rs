//! Builds bulk download archives queued by organizers
//!
//! An archive is claimed, every confirmed photo of its event is streamed
//! from the object store into a ZIP spooled to a temporary file, and the
//! file is uploaded to the archive's key. Memory use stays at one chunk.

use std::io::{Seek, Write};

use chrono::{Duration, Utc};
use common::{
    error::{DatabaseError, StorageError},
    models::{Archive, Photo},
    repositories::{ArchiveRepository, PhotoRepository},
    services::photo::extension_for,
    storage::ObjectStorage,
};
use sqlx::PgPool;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{error, info, warn};
use zip::{CompressionMethod, ZipWriter, result::ZipError, write::FileOptions};

/// How long a claimed archive may go without progress before another
/// worker may take it over
pub const BUILD_LEASE_MINUTES: i64 = 15;

/// Entries from this size on need ZIP64 headers
const ZIP64_THRESHOLD: i64 = u32::MAX as i64;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to write ZIP archive: {0}")]
    Zip(#[from] ZipError),

    #[error("Failed to write ZIP entry: {0}")]
    Io(#[from] std::io::Error),
}

/// Name of a photo inside an archive: `<photoID><ext>`
pub fn entry_name(photo: &Photo) -> String {
    format!("{}{}", photo.id, extension_for(&photo.mime_type))
}

fn entry_options(size: i64) -> FileOptions {
    FileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .unix_permissions(0o644)
        .large_file(size >= ZIP64_THRESHOLD)
}

/// Uncompressed ZIP written entry by entry
///
/// Photos are already compressed, so entries are stored as-is.
pub struct ArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    entries: i32,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            zip: ZipWriter::new(inner),
            entries: 0,
        }
    }

    /// Begin an entry whose data is about `size` bytes
    pub fn start_entry(&mut self, name: &str, size: i64) -> Result<(), ArchiveError> {
        self.zip.start_file(name, entry_options(size))?;
        self.entries += 1;
        Ok(())
    }

    /// Append data to the current entry
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), ArchiveError> {
        self.zip.write_all(data)?;
        Ok(())
    }

    /// Write the central directory, returning the sink and the entry count
    pub fn finish(mut self) -> Result<(W, i32), ArchiveError> {
        let inner = self.zip.finish()?;
        Ok((inner, self.entries))
    }
}

#[derive(Clone)]
pub struct ArchiveBuilder {
    archives: ArchiveRepository,
    photos: PhotoRepository,
    storage: ObjectStorage,
}

impl ArchiveBuilder {
    pub fn new(pool: PgPool, storage: ObjectStorage) -> Self {
        Self {
            archives: ArchiveRepository::new(pool.clone()),
            photos: PhotoRepository::new(pool),
            storage,
        }
    }

    /// Build claimable archives until none is left, returning how many were handled
    ///
    /// An archive left `building` by a crashed run is claimed again once its
    /// lease lapses.
    pub async fn run_pending(&self) -> Result<usize, ArchiveError> {
        let lease = Duration::minutes(BUILD_LEASE_MINUTES);
        let mut handled = 0;

        while let Some(archive) = self.archives.claim_pending(Utc::now(), lease).await? {
            handled += 1;
            match self.build(&archive).await {
                Ok((photo_count, size)) => {
                    self.archives
                        .mark_ready(archive.id, photo_count, size, Utc::now())
                        .await?;
                    info!(
                        archive_id = %archive.id,
                        event_id = %archive.event_id,
                        photo_count,
                        size,
                        "Archive ready"
                    );
                }
                Err(e) => {
                    error!(archive_id = %archive.id, error = %e, "Archive build failed");
                    self.archives
                        .mark_failed(archive.id, &e.to_string(), Utc::now())
                        .await?;
                }
            }
        }

        Ok(handled)
    }

    async fn build(&self, archive: &Archive) -> Result<(i32, i64), ArchiveError> {
        let photos = self.photos.list_confirmed_by_event(archive.event_id).await?;

        let spool = NamedTempFile::new()?;
        let mut writer = ArchiveWriter::new(spool.reopen()?);

        for photo in photos.iter().filter(|photo| photo.is_confirmed()) {
            let mut body = match self.storage.get_object(&photo.object_key).await {
                Ok(body) => body,
                Err(StorageError::NotFound(key)) => {
                    warn!(archive_id = %archive.id, key = %key, "Photo missing from store, skipping");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            writer.start_entry(&entry_name(photo), photo.size)?;
            while let Some(chunk) = body.next_chunk().await? {
                writer.write_chunk(&chunk)?;
            }

            self.archives.renew(archive.id, Utc::now()).await?;
        }

        let (file, photo_count) = writer.finish()?;
        let size = file.metadata()?.len() as i64;
        drop(file);

        self.storage
            .put_file(&archive.object_key, spool.path(), "application/zip")
            .await?;

        Ok((photo_count, size))
    }
}
