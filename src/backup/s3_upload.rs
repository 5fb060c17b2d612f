// backuptool/src/backup/s3_upload.rs
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::config::Region;
use s3::primitives::ByteStream;
use s3::types::ObjectCannedAcl;
use std::path::Path;

use crate::config::SpacesConfig;
use crate::errors::{BackupError, Result};

/// Destination for the final bundle. One call per run; no retry.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_file(&self, key: &str, file_path: &Path) -> Result<()>;
}

/// S3-compatible object storage (DigitalOcean Spaces, MinIO, AWS S3).
pub struct SpacesStore {
    config: SpacesConfig,
}

impl SpacesStore {
    pub fn new(config: SpacesConfig) -> Self {
        SpacesStore { config }
    }

    async fn client(&self) -> s3::Client {
        let sdk_config = aws_config::defaults(s3::config::BehaviorVersion::latest())
            .endpoint_url(&self.config.endpoint_url)
            .region(Region::new(self.config.region.clone()))
            .credentials_provider(s3::config::Credentials::new(
                &self.config.access_key_id,
                &self.config.secret_access_key,
                None,     // session_token
                None,     // expiry
                "Static", // provider_name
            ))
            .load()
            .await;
        s3::Client::new(&sdk_config)
    }
}

#[async_trait]
impl ObjectStore for SpacesStore {
    async fn put_file(&self, key: &str, file_path: &Path) -> Result<()> {
        println!(
            "⬆️ Uploading {} to bucket {} with key {}",
            file_path.display(),
            self.config.bucket_name,
            key
        );

        let client = self.client().await;

        // ByteStream streams from disk; the bundle is never read into
        // memory as a whole.
        let body = ByteStream::from_path(file_path).await.map_err(|e| {
            BackupError::Upload(format!(
                "Failed to open {} for upload: {}",
                file_path.display(),
                e
            ))
        })?;

        client
            .put_object()
            .bucket(&self.config.bucket_name)
            .key(key)
            .acl(ObjectCannedAcl::Private)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                BackupError::Upload(format!(
                    "Failed to upload {} to bucket {} with key {}: {}",
                    file_path.display(),
                    self.config.bucket_name,
                    key,
                    s3::error::DisplayErrorContext(e)
                ))
            })?;

        println!(
            "✅ Uploaded {} to bucket {}",
            file_path.display(),
            self.config.bucket_name
        );
        Ok(())
    }
}
