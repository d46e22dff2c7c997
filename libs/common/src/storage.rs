//! S3-compatible object store client (Cloudflare R2 or MinIO)
//!
//! Presigning is local signing work and never talks to the store. Only
//! [`ObjectStorage::get_object`] and [`ObjectStorage::put_file`] issue
//! requests, and only the worker calls them.

use std::path::Path;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    Client,
    config::{Builder as S3ConfigBuilder, Credentials},
    error::DisplayErrorContext,
    presigning::PresigningConfig,
    primitives::ByteStream,
};
use bytes::Bytes;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{StorageError, StorageResult};

/// Connection settings for the object store
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub account_id: String,
    pub access_key: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub public_domain: String,
    /// Endpoint for server-side requests
    pub endpoint: String,
    /// Endpoint baked into presigned URLs handed to browsers
    pub presign_endpoint: String,
}

impl From<&AppConfig> for StorageConfig {
    fn from(config: &AppConfig) -> Self {
        let endpoint = config
            .r2_endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| format!("https://{}.r2.cloudflarestorage.com", config.r2_account_id));
        let presign_endpoint = config
            .r2_presign_endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| endpoint.clone());

        Self {
            account_id: config.r2_account_id.clone(),
            access_key: config.r2_access_key.clone(),
            secret_access_key: config.r2_secret_access_key.clone(),
            bucket: config.r2_bucket_name.clone(),
            public_domain: config.r2_public_domain.clone(),
            endpoint,
            presign_endpoint,
        }
    }
}

/// Object store handle shared by the services
#[derive(Clone)]
pub struct ObjectStorage {
    client: Client,
    presign_client: Client,
    bucket: String,
    public_domain: String,
}

impl ObjectStorage {
    /// Build the server-side and presigning clients
    pub async fn new(config: &StorageConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_access_key,
            None,
            None,
            "static",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new("auto"))
            .credentials_provider(credentials)
            .load()
            .await;

        let client = Client::from_conf(
            S3ConfigBuilder::from(&sdk_config)
                .endpoint_url(&config.endpoint)
                .force_path_style(true)
                .build(),
        );
        let presign_client = Client::from_conf(
            S3ConfigBuilder::from(&sdk_config)
                .endpoint_url(&config.presign_endpoint)
                .force_path_style(true)
                .build(),
        );

        info!(
            bucket = %config.bucket,
            endpoint = %config.endpoint,
            presign_endpoint = %config.presign_endpoint,
            "Object storage initialized"
        );

        Self {
            client,
            presign_client,
            bucket: config.bucket.clone(),
            public_domain: config.public_domain.clone(),
        }
    }

    /// Presigned PUT bound to `content_type`
    pub async fn presigned_put(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> StorageResult<String> {
        let request = self
            .presign_client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning_config("PUT", key, ttl)?)
            .await
            .map_err(|e| presign_error("PUT", key, e))?;

        Ok(request.uri().to_string())
    }

    pub async fn presigned_get(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        let request = self
            .presign_client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_config("GET", key, ttl)?)
            .await
            .map_err(|e| presign_error("GET", key, e))?;

        Ok(request.uri().to_string())
    }

    pub async fn presigned_delete(&self, key: &str, ttl: Duration) -> StorageResult<String> {
        let request = self
            .presign_client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_config("DELETE", key, ttl)?)
            .await
            .map_err(|e| presign_error("DELETE", key, e))?;

        Ok(request.uri().to_string())
    }

    /// Public, unsigned URL of an object
    pub fn public_url(&self, key: &str) -> String {
        public_url(&self.public_domain, key)
    }

    /// Open an object for streaming reads
    pub async fn get_object(&self, key: &str) -> StorageResult<ObjectBody> {
        debug!(key = %key, "Fetching object");

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Request {
                        key: key.to_string(),
                        message: DisplayErrorContext(&service_error).to_string(),
                    }
                }
            })?;

        Ok(ObjectBody {
            key: key.to_string(),
            stream: output.body,
        })
    }

    /// Upload a local file, streaming it from disk
    pub async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::Body {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Request {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        info!(key = %key, "Uploaded object");
        Ok(())
    }
}

/// Body of a fetched object, read chunk by chunk
pub struct ObjectBody {
    key: String,
    stream: ByteStream,
}

impl ObjectBody {
    /// Next chunk of the body, `None` once it is exhausted
    pub async fn next_chunk(&mut self) -> StorageResult<Option<Bytes>> {
        self.stream
            .next()
            .await
            .transpose()
            .map_err(|e| StorageError::Body {
                key: self.key.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })
    }
}

fn presigning_config(
    operation: &'static str,
    key: &str,
    ttl: Duration,
) -> StorageResult<PresigningConfig> {
    PresigningConfig::expires_in(ttl).map_err(|e| StorageError::Presign {
        operation,
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn presign_error<E>(operation: &'static str, key: &str, err: E) -> StorageError
where
    E: std::error::Error,
{
    StorageError::Presign {
        operation,
        key: key.to_string(),
        message: DisplayErrorContext(&err).to_string(),
    }
}

fn public_url(domain: &str, key: &str) -> String {
    format!(
        "{}/{}",
        domain.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}
