//! Object storage for board, spec and profile photos.
//!
//! Thin wrapper over an S3-compatible bucket. Uploads return the object key
//! that gets persisted on the photo row; deletes take that key back. No
//! retries: a storage failure surfaces as a request-level error.

use anyhow::{Context, Result};
use s3::creds::Credentials;
use s3::region::Region;
use s3::Bucket;
use tracing::debug;

use crate::config::Config;
use crate::kst;

#[derive(Clone)]
pub struct StorageClient {
    bucket: Box<Bucket>,
    prefix: String,
}

impl StorageClient {
    /// Create a new storage client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing or the bucket handle
    /// cannot be built.
    pub async fn new(config: &Config) -> Result<Self> {
        let access_key = std::env::var("AWS_ACCESS_KEY_ID").context("AWS_ACCESS_KEY_ID not set")?;
        let secret_key =
            std::env::var("AWS_SECRET_ACCESS_KEY").context("AWS_SECRET_ACCESS_KEY not set")?;

        let credentials = Credentials::new(Some(&access_key), Some(&secret_key), None, None, None)
            .context("Failed to create S3 credentials")?;

        let region = if let Some(ref endpoint) = config.s3_endpoint {
            Region::Custom {
                region: config.s3_region.clone(),
                endpoint: endpoint.clone(),
            }
        } else {
            config.s3_region.parse().unwrap_or(Region::ApNortheast2)
        };

        let bucket = Bucket::new(&config.s3_bucket, region, credentials)
            .context("Failed to create S3 bucket")?;

        // Use path-style for custom endpoints (MinIO, R2, etc.)
        let bucket = if config.s3_endpoint.is_some() {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(Self {
            bucket,
            prefix: config.s3_prefix.clone(),
        })
    }

    /// Upload one photo into a folder and return its object key.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails.
    pub async fn upload(&self, folder: &str, file_name: &str, data: &[u8]) -> Result<String> {
        let key = self.object_key(folder, file_name);

        let content_type = mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string();

        debug!(key = %key, content_type = %content_type, size = data.len(), "Uploading photo");

        self.bucket
            .put_object_with_content_type(&key, data, &content_type)
            .await
            .context("Failed to upload photo")?;

        Ok(key)
    }

    /// Delete an object by the key a previous upload returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete(&self, key: &str) -> Result<()> {
        debug!(key = %key, "Deleting photo");

        self.bucket
            .delete_object(key)
            .await
            .context("Failed to delete photo")?;

        Ok(())
    }

    /// Public URL for a stored object.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("https://{}.s3.amazonaws.com/{}", self.bucket.name(), key)
    }

    /// Keys are prefixed, foldered and timestamped; spaces never survive into
    /// object names.
    fn object_key(&self, folder: &str, file_name: &str) -> String {
        let millis = kst::now().timestamp_millis();
        let base = file_name.replace(' ', "");
        format!("{}{folder}/{millis}_{base}", self.prefix)
    }
}
