use mti_common::{ImportError, Result};
use std::path::Path;
use tokio::fs::File;

use crate::storage::ObjectReader;

/// Open a file on local disk.
///
/// A missing path is reported as [`ImportError::NotFound`] before any open
/// is attempted; every other failure is [`ImportError::Io`].
pub(super) async fn open(path: &Path) -> Result<ObjectReader> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(ImportError::not_found(format!(
            "File does not exist: '{}'",
            path.display()
        )));
    }

    let file = File::open(path).await?;
    Ok(Box::pin(file))
}
