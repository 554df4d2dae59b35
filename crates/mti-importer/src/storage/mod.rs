//! Object storage access
//!
//! The pipeline only needs to open an object as a byte stream, which is what
//! [`ObjectStore`] exposes. [`S3Storage`] implements it for any
//! S3-compatible endpoint.

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};
use mti_common::{ImportError, Result};
use std::path::Path;
use std::pin::Pin;
use tokio::io::AsyncRead;
use tracing::{debug, info, instrument};

pub mod config;

pub use config::StorageConfig;

/// Readable byte stream over an opened object
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// Read access to objects in named buckets
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Open `bucket/key` for streaming reads.
    ///
    /// Fails with [`ImportError::NotFound`] when the object does not exist and
    /// [`ImportError::Storage`] for any other failure.
    async fn open_read_stream(&self, bucket: &str, key: &str) -> Result<ObjectReader>;
}

#[derive(Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub async fn new(config: &StorageConfig) -> Self {
        debug!("Initializing storage with config: {:?}", config);

        let mut builder = match (&config.access_key, &config.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials =
                    Credentials::new(access_key, secret_key, None, None, "mti-storage");
                aws_sdk_s3::Config::builder()
                    .behavior_version_latest()
                    .credentials_provider(credentials)
            }
            _ => {
                let shared = aws_config::load_from_env().await;
                aws_sdk_s3::config::Builder::from(&shared)
            }
        };

        builder = builder
            .region(Region::new(config.region.clone()))
            .force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        info!(region = %config.region, endpoint = ?config.endpoint, "Storage client initialized");

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Stream a local file into `bucket/key`.
    #[instrument(skip(self))]
    pub async fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> Result<u64> {
        if !tokio::fs::try_exists(path).await? {
            return Err(ImportError::not_found(format!(
                "File does not exist: '{}'",
                path.display()
            )));
        }

        let size = tokio::fs::metadata(path).await?.len();
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| ImportError::storage(format!("Failed to read {}: {}", path.display(), e)))?;

        debug!("Uploading {} bytes to s3://{}/{}", size, bucket, key);

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_length(size as i64)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                ImportError::storage(format!(
                    "Failed to upload to s3://{}/{}: {}",
                    bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        info!("Successfully uploaded to s3://{}/{}", bucket, key);

        Ok(size)
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    #[instrument(skip(self))]
    async fn open_read_stream(&self, bucket: &str, key: &str) -> Result<ObjectReader> {
        debug!("Getting stream from s3://{}/{}", bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .map(|service| service.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    ImportError::not_found(format!("Object does not exist: s3://{}/{}", bucket, key))
                } else {
                    ImportError::storage(format!(
                        "Failed to open s3://{}/{}: {}",
                        bucket,
                        key,
                        DisplayErrorContext(&e)
                    ))
                }
            })?;

        Ok(Box::pin(response.body.into_async_read()))
    }
}
