//! Search index clients
//!
//! The pipeline treats the index as an opaque bulk-write endpoint.

use async_trait::async_trait;
use mti_common::{Document, Result};

pub mod meilisearch;

pub use meilisearch::{MeiliClient, MeiliConfig};

/// Bulk write access to a named index
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Write `documents` to `index` in one call.
    ///
    /// Any failure is an [`mti_common::ImportError::Index`], which the
    /// submission workers retry.
    async fn add_documents(&self, index: &str, documents: &[Document]) -> Result<()>;
}
