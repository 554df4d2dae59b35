//! `mti-importer upload` command implementation
//!
//! Copies a local terminology file into the private bucket so that later
//! imports can read it with `--source-type bucket`.

use anyhow::Context as _;
use tracing::info;

use crate::cli::UploadArgs;
use crate::config::ImporterConfig;
use crate::storage::S3Storage;

/// Upload `args.file` and return the object key it was stored under.
pub async fn run(args: UploadArgs, config: &ImporterConfig) -> anyhow::Result<String> {
    let bucket = config
        .storage
        .bucket
        .as_deref()
        .context("BUCKET_NAME_PRIVATE must be set to upload files")?;
    let key = config.storage.object_key(&args.key);

    let storage = S3Storage::new(&config.storage).await;
    let size = storage
        .upload_file(bucket, &key, &args.file)
        .await
        .with_context(|| format!("Failed to upload {}", args.file.display()))?;

    info!(bucket, key = %key, size, "Upload finished");
    Ok(key)
}
