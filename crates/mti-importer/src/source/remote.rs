use mti_common::Result;
use tracing::info;

use crate::storage::{ObjectReader, ObjectStore};

/// Open an object through the configured store.
pub(super) async fn open(store: &dyn ObjectStore, bucket: &str, key: &str) -> Result<ObjectReader> {
    let reader = store.open_read_stream(bucket, key).await?;
    info!(bucket, key, "Connected to bucket object");
    Ok(reader)
}
